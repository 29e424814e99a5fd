use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use vc_archive::NodeId;

use crate::object::{SlotAttribute, SlotInvoke};
use crate::serde::{DeserializeContext, ResolveContext, SerializeContext, Ticket};
use crate::types::Value;
use crate::universe::{ObjectId, Universe};

// -----------------------------------------------------------------------------
// SignalArgs

/// The argument list a signal passes to its slots.
///
/// Implemented for `()`, for every leaf value type, and for pairs and
/// triples of them.
pub trait SignalArgs: Clone + 'static {
    /// Argument type names, comma separated.
    fn signature() -> String;
}

impl SignalArgs for () {
    #[inline]
    fn signature() -> String {
        String::new()
    }
}

macro_rules! impl_signal_args {
    ($($ty:ty),*) => {
        $(
            impl SignalArgs for $ty {
                #[inline]
                fn signature() -> String {
                    <$ty as Value>::type_name().into_owned()
                }
            }
        )*
    };
}

impl_signal_args!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String);

impl<A, B> SignalArgs for (A, B)
where
    A: Value + Clone,
    B: Value + Clone,
{
    fn signature() -> String {
        format!("{}, {}", A::type_name(), B::type_name())
    }
}

impl<A, B, C> SignalArgs for (A, B, C)
where
    A: Value + Clone,
    B: Value + Clone,
    C: Value + Clone,
{
    fn signature() -> String {
        format!("{}, {}, {}", A::type_name(), B::type_name(), C::type_name())
    }
}

// -----------------------------------------------------------------------------
// Connection

enum Target<A> {
    Slot {
        receiver: ObjectId,
        slot: Arc<SlotAttribute>,
        invoker: Arc<dyn SlotInvoke<A>>,
    },
    Function(Arc<dyn Fn(A) + Send + Sync>),
}

/// One receiver of a [`Signal`]: a slot of an object, or a plain function.
///
/// Only slot connections are archived.
pub struct Connection<A> {
    target: Target<A>,
}

impl<A: SignalArgs> Connection<A> {
    /// Connects to `slot` of `receiver`. `None` if the slot takes other
    /// arguments than `A`.
    pub fn to_slot(receiver: ObjectId, slot: Arc<SlotAttribute>) -> Option<Self> {
        let invoker = slot.invoker::<A>()?;
        Some(Self {
            target: Target::Slot {
                receiver,
                slot,
                invoker,
            },
        })
    }

    pub fn to_fn(f: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            target: Target::Function(Arc::new(f)),
        }
    }

    pub fn receiver(&self) -> Option<ObjectId> {
        match &self.target {
            Target::Slot { receiver, .. } => Some(*receiver),
            Target::Function(_) => None,
        }
    }

    pub fn slot(&self) -> Option<&SlotAttribute> {
        match &self.target {
            Target::Slot { slot, .. } => Some(&**slot),
            Target::Function(_) => None,
        }
    }

    /// Delivers `args`. Returns `false` if the receiver no longer exists.
    pub fn dispatch(&self, universe: &mut Universe, args: A) -> bool {
        match &self.target {
            Target::Slot {
                receiver, invoker, ..
            } => match universe.class_value_mut(*receiver, invoker.class()) {
                Some(value) => invoker.invoke(value, args),
                None => false,
            },
            Target::Function(f) => {
                f(args);
                true
            }
        }
    }
}

impl<A> Clone for Connection<A> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Slot {
                receiver,
                slot,
                invoker,
            } => Target::Slot {
                receiver: *receiver,
                slot: slot.clone(),
                invoker: invoker.clone(),
            },
            Target::Function(f) => Target::Function(f.clone()),
        };
        Self { target }
    }
}

impl<A> fmt::Debug for Connection<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Slot { receiver, slot, .. } => f
                .debug_struct("Connection")
                .field("receiver", receiver)
                .field("slot", &slot.name())
                .finish(),
            Target::Function(_) => f.write_str("Connection(fn)"),
        }
    }
}

// -----------------------------------------------------------------------------
// Signal

/// An ordered list of connections to slots.
///
/// Emit a signal stored in an object through
/// [`Universe::emit`](crate::universe::Universe::emit).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// use vc_object::relation::{Connection, Signal};
/// use vc_object::universe::Universe;
///
/// let total = Arc::new(AtomicI32::new(0));
/// let mut signal = Signal::<i32>::new();
/// let sink = total.clone();
/// signal.connect(Connection::to_fn(move |n| {
///     sink.fetch_add(n, Ordering::Relaxed);
/// }));
///
/// let mut universe = Universe::new();
/// assert_eq!(signal.emit(&mut universe, 5), 1);
/// assert_eq!(total.load(Ordering::Relaxed), 5);
/// ```
pub struct Signal<A> {
    connections: Vec<Connection<A>>,
    pending: Vec<Ticket>,
}

impl<A: SignalArgs> Signal<A> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            connections: Vec::new(),
            pending: Vec::new(),
        }
    }

    #[inline]
    pub fn connect(&mut self, connection: Connection<A>) {
        self.connections.push(connection);
    }

    #[inline]
    pub fn connect_fn(&mut self, f: impl Fn(A) + Send + Sync + 'static) {
        self.connect(Connection::to_fn(f));
    }

    /// Removes every connection to `receiver`, returning how many there were.
    pub fn disconnect(&mut self, receiver: ObjectId) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|connection| connection.receiver() != Some(receiver));
        before - self.connections.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.connections.clear();
    }

    #[inline]
    pub fn connections(&self) -> &[Connection<A>] {
        &self.connections
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Delivers `args` to every live connection, in connection order.
    /// Returns the number of deliveries.
    pub fn emit(&self, universe: &mut Universe, args: A) -> usize {
        dispatch_all(&self.connections, universe, args)
    }
}

pub(crate) fn dispatch_all<A: SignalArgs>(
    connections: &[Connection<A>],
    universe: &mut Universe,
    args: A,
) -> usize {
    connections
        .iter()
        .filter(|connection| connection.dispatch(universe, args.clone()))
        .count()
}

impl<A: SignalArgs> Default for Signal<A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Signal<A> {
    fn clone(&self) -> Self {
        Self {
            connections: self.connections.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.connections).finish()
    }
}

impl<A: SignalArgs> Value for Signal<A> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Signal<{}>", A::signature()))
    }

    fn serialize(&self, node: NodeId, cx: &mut SerializeContext<'_>) {
        cx.tree_mut().set_array(node);
        for connection in &self.connections {
            let Target::Slot { receiver, slot, .. } = &connection.target else {
                continue;
            };
            let item = cx.tree_mut().push(node);
            let receiver_node = cx.tree_mut().key_mut(item, "receiver");
            cx.defer_reference(receiver_node, Some(*receiver));
            let slot_node = cx.tree_mut().key_mut(item, "slot");
            cx.tree_mut().set(slot_node, slot.name());
        }
    }

    fn deserialize(&mut self, node: NodeId, cx: &mut DeserializeContext<'_>) {
        let tree = cx.tree();
        if !tree.is_array(node) {
            if !tree.is_empty(node) {
                log::warn!("expected an array of connections, found {}", tree.kind(node));
            }
            return;
        }
        self.connections.clear();
        self.pending.clear();
        for &item in tree.elements(node) {
            let receiver = tree.get_str(tree.key(item, "receiver"));
            let slot = tree.get_str(tree.key(item, "slot"));
            match (receiver, slot) {
                (Some(receiver), Some(slot)) => {
                    let ticket = cx.defer_connection::<A>(receiver, slot);
                    self.pending.push(ticket);
                }
                _ => log::warn!(
                    "skipping a `{}` connection without receiver or slot",
                    Self::type_name()
                ),
            }
        }
    }

    fn resolve(&mut self, cx: &ResolveContext<'_>) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        for ticket in mem::take(&mut self.pending) {
            if let Some((receiver, slot)) = cx.connection(ticket)
                && let Some(connection) = Connection::to_slot(receiver, slot.clone())
            {
                self.connections.push(connection);
            }
        }
        true
    }
}
