use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use crate::object::Object;
use crate::relation::SignalArgs;

// -----------------------------------------------------------------------------
// SlotInvoke

/// Calls a slot on a type-erased receiver.
pub trait SlotInvoke<A>: Send + Sync {
    /// Returns `false` if `receiver` is not an instance of the slot's class.
    fn invoke(&self, receiver: &mut dyn Any, args: A) -> bool;

    /// The class declaring the slot.
    fn class(&self) -> TypeId;
}

struct MethodSlot<T, A> {
    method: fn(&mut T, A),
}

impl<T: Object, A: SignalArgs> SlotInvoke<A> for MethodSlot<T, A> {
    fn invoke(&self, receiver: &mut dyn Any, args: A) -> bool {
        match receiver.downcast_mut::<T>() {
            Some(receiver) => {
                (self.method)(receiver, args);
                true
            }
            None => false,
        }
    }

    #[inline]
    fn class(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

// -----------------------------------------------------------------------------
// SlotAttribute

/// A named method of a class that signals can be connected to.
pub struct SlotAttribute {
    name: String,
    description: String,
    signature: TypeId,
    signature_name: String,
    // An `Arc<dyn SlotInvoke<A>>` for the signature `A`.
    invoker: Box<dyn Any + Send + Sync>,
}

impl SlotAttribute {
    pub(crate) fn new<T: Object, A: SignalArgs>(
        name: &str,
        description: &str,
        method: fn(&mut T, A),
    ) -> Self {
        let invoker: Arc<dyn SlotInvoke<A>> = Arc::new(MethodSlot { method });
        Self {
            name: name.into(),
            description: description.into(),
            signature: TypeId::of::<A>(),
            signature_name: A::signature(),
            invoker: Box::new(invoker),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Argument types, comma separated, as in `"int32, string"`.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature_name
    }

    #[inline]
    pub fn accepts(&self, signature: TypeId) -> bool {
        self.signature == signature
    }

    /// The typed invoker, `None` if the slot takes other arguments than `A`.
    pub fn invoker<A: SignalArgs>(&self) -> Option<Arc<dyn SlotInvoke<A>>> {
        self.invoker
            .downcast_ref::<Arc<dyn SlotInvoke<A>>>()
            .cloned()
    }
}

impl fmt::Debug for SlotAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotAttribute")
            .field("name", &self.name)
            .field("signature", &self.signature_name)
            .finish_non_exhaustive()
    }
}
