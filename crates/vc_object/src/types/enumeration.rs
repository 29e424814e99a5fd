use vc_archive::NodeId;

use crate::serde::{DeserializeContext, SerializeContext};
use crate::types::Type;

// -----------------------------------------------------------------------------
// EnumEntry

/// One named value of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: &'static str,
    pub value: i64,
    pub description: &'static str,
}

impl EnumEntry {
    #[inline]
    pub const fn new(name: &'static str, value: i64, description: &'static str) -> Self {
        Self {
            name,
            value,
            description,
        }
    }
}

// -----------------------------------------------------------------------------
// EnumValue

/// A native enum exposed as a value type.
///
/// Enumerations are archived by entry name. Pair an implementation of this
/// trait with [`impl_enum_value!`](crate::impl_enum_value) to make the enum
/// usable as an attribute.
///
/// # Examples
///
/// ```
/// use vc_object::impl_enum_value;
/// use vc_object::types::{EnumEntry, EnumType, EnumValue, Type};
///
/// #[derive(Debug, Clone, Copy, Default, PartialEq)]
/// enum Shade {
///     #[default]
///     Light,
///     Dark,
/// }
///
/// impl EnumValue for Shade {
///     const NAME: &'static str = "Shade";
///     const ENTRIES: &'static [EnumEntry] = &[
///         EnumEntry::new("Light", 0, "Bright surfaces"),
///         EnumEntry::new("Dark", 1, "Dim surfaces"),
///     ];
///
///     fn to_raw(self) -> i64 {
///         self as i64
///     }
///
///     fn from_raw(raw: i64) -> Option<Self> {
///         match raw {
///             0 => Some(Shade::Light),
///             1 => Some(Shade::Dark),
///             _ => None,
///         }
///     }
/// }
///
/// impl_enum_value!(Shade);
///
/// let ty = EnumType::of::<Shade>();
/// assert_eq!(ty.name(), "Shade");
/// assert_eq!(ty.value_for_name("Dark"), Some(1));
/// assert_eq!(ty.name_for_value(0), Some("Light"));
/// ```
pub trait EnumValue: Copy + Default + 'static {
    const NAME: &'static str;
    const ENTRIES: &'static [EnumEntry];

    /// Width in bytes of the underlying integer.
    const WIDTH: usize = size_of::<Self>();
    const SIGNED: bool = true;

    fn to_raw(self) -> i64;

    fn from_raw(raw: i64) -> Option<Self>;
}

// -----------------------------------------------------------------------------
// EnumType

/// Metadata of an enumeration: its ordered entries and its integer layout.
#[derive(Debug, Clone, Copy)]
pub struct EnumType {
    name: &'static str,
    entries: &'static [EnumEntry],
    width: usize,
    signed: bool,
}

impl EnumType {
    #[inline]
    pub const fn of<E: EnumValue>() -> Self {
        Self {
            name: E::NAME,
            entries: E::ENTRIES,
            width: E::WIDTH,
            signed: E::SIGNED,
        }
    }

    #[inline]
    pub const fn entries(&self) -> &'static [EnumEntry] {
        self.entries
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Smallest entry value, `None` for an enumeration without entries.
    pub fn min(&self) -> Option<i64> {
        self.entries.iter().map(|entry| entry.value).min()
    }

    pub fn max(&self) -> Option<i64> {
        self.entries.iter().map(|entry| entry.value).max()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.entries.iter().any(|entry| entry.value == value)
    }

    /// First entry carrying `value`.
    pub fn name_for_value(&self, value: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.name)
    }

    pub fn value_for_name(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }
}

impl Type for EnumType {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn size(&self) -> usize {
        self.width
    }
}

// -----------------------------------------------------------------------------
// Value support

#[doc(hidden)]
pub fn serialize_enum<E: EnumValue>(value: E, node: NodeId, cx: &mut SerializeContext<'_>) {
    let raw = value.to_raw();
    match EnumType::of::<E>().name_for_value(raw) {
        Some(name) => cx.tree_mut().set(node, name),
        None => {
            log::warn!("value {raw} is not an entry of `{}`", E::NAME);
            cx.tree_mut().clear(node);
        }
    }
}

#[doc(hidden)]
pub fn deserialize_enum<E: EnumValue>(value: &mut E, node: NodeId, cx: &mut DeserializeContext<'_>) {
    let Some(name) = cx.tree().get_str(node) else {
        log::warn!("expected an entry name of `{}`", E::NAME);
        return;
    };
    match EnumType::of::<E>()
        .value_for_name(name)
        .and_then(E::from_raw)
    {
        Some(parsed) => *value = parsed,
        None => log::warn!("`{name}` is not an entry of `{}`", E::NAME),
    }
}

/// Implements [`Value`](crate::types::Value) for a type implementing
/// [`EnumValue`].
#[macro_export]
macro_rules! impl_enum_value {
    ($ty:ty) => {
        impl $crate::types::Value for $ty {
            fn type_name() -> $crate::__macro_exports::Cow<'static, str> {
                $crate::__macro_exports::Cow::Borrowed(
                    <$ty as $crate::types::EnumValue>::NAME,
                )
            }

            fn serialize(
                &self,
                node: $crate::__macro_exports::NodeId,
                cx: &mut $crate::serde::SerializeContext<'_>,
            ) {
                $crate::types::serialize_enum(*self, node, cx);
            }

            fn deserialize(
                &mut self,
                node: $crate::__macro_exports::NodeId,
                cx: &mut $crate::serde::DeserializeContext<'_>,
            ) {
                $crate::types::deserialize_enum(self, node, cx);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::{EnumEntry, EnumType, EnumValue};
    use crate::types::Type;

    #[derive(Clone, Copy, Default)]
    struct Level(i8);

    impl EnumValue for Level {
        const NAME: &'static str = "Level";
        const ENTRIES: &'static [EnumEntry] = &[
            EnumEntry::new("Low", -1, ""),
            EnumEntry::new("Mid", 0, ""),
            EnumEntry::new("Alias", 0, "Same value as Mid"),
            EnumEntry::new("High", 1, ""),
        ];

        fn to_raw(self) -> i64 {
            i64::from(self.0)
        }

        fn from_raw(raw: i64) -> Option<Self> {
            i8::try_from(raw).ok().map(Level)
        }
    }

    #[test]
    fn entries_and_range() {
        let ty = EnumType::of::<Level>();
        assert_eq!(ty.name(), "Level");
        assert_eq!(ty.size(), 1);
        assert!(ty.is_signed());
        assert_eq!(ty.min(), Some(-1));
        assert_eq!(ty.max(), Some(1));
        assert!(ty.contains(0));
        assert!(!ty.contains(2));
        assert_eq!(ty.name_for_value(0), Some("Mid"));
        assert_eq!(ty.value_for_name("Alias"), Some(0));
        assert_eq!(ty.value_for_name("low"), None);
    }
}
