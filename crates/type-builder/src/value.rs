//! Terminal values and how they move in and out of the store.

use std::fmt;

use crate::error::StoreError;
use crate::path::FieldPath;
use crate::slot::ValueSlot;

/// Marker for types stored as a single terminal value.
///
/// Implemented for the std scalars and `String`; use [`leaf!`](crate::leaf!)
/// to add more.
pub trait Leaf: Clone + fmt::Debug + 'static {}

/// Types that can be written to and read back from a single slot.
pub trait Assign: Sized + 'static {
    fn into_slot(self) -> ValueSlot;

    fn from_slot(slot: &ValueSlot, path: &FieldPath) -> Result<Self, StoreError>;
}

/// Implements [`Leaf`], [`Assign`], [`Construct`](crate::Construct) and
/// [`Node`](crate::Node) for terminal value types.
///
/// ```
/// use type_builder::leaf;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Celsius(f64);
///
/// leaf!(Celsius);
/// ```
#[macro_export]
macro_rules! leaf {
    ($($t:ty),+ $(,)?) => {$(
        impl $crate::Leaf for $t {}

        impl $crate::Assign for $t {
            fn into_slot(self) -> $crate::ValueSlot {
                $crate::ValueSlot::present(self)
            }

            fn from_slot(
                slot: &$crate::ValueSlot,
                path: &$crate::FieldPath,
            ) -> ::core::result::Result<Self, $crate::StoreError> {
                slot.typed::<Self>(path)
            }
        }

        impl $crate::Construct for $t {
            fn construct<D: $crate::Decoder>(
                decoder: &mut D,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                decoder.decode_value::<Self>()
            }
        }

        impl $crate::Node for $t {
            type View<'b> = $crate::Accessor<'b, $t>;

            fn view<'b>(
                store: &'b ::core::cell::RefCell<$crate::BuilderStore>,
                path: $crate::FieldPath,
            ) -> $crate::Accessor<'b, $t> {
                $crate::Accessor::new(store, path)
            }
        }
    )+};
}

crate::leaf!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    (),
);

#[cfg(feature = "uuid")]
crate::leaf!(uuid::Uuid);

/// `None` is stored as `Null`. Reading `Null` or `Unset` yields `None`.
impl<V: Leaf> Assign for Option<V> {
    fn into_slot(self) -> ValueSlot {
        match self {
            Some(value) => ValueSlot::present(value),
            None => ValueSlot::Null,
        }
    }

    fn from_slot(slot: &ValueSlot, path: &FieldPath) -> Result<Self, StoreError> {
        match slot {
            ValueSlot::Present(_) => slot.typed::<V>(path).map(Some),
            ValueSlot::Null | ValueSlot::Unset => Ok(None),
        }
    }
}

/// Sequences are stored whole.
impl<V: Leaf> Assign for Vec<V> {
    fn into_slot(self) -> ValueSlot {
        ValueSlot::present(self)
    }

    fn from_slot(slot: &ValueSlot, path: &FieldPath) -> Result<Self, StoreError> {
        slot.typed::<Self>(path)
    }
}
