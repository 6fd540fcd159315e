//! Tri-state value slots and type-erased stored values.

use std::any::{Any, type_name};
use std::fmt;

use crate::error::StoreError;
use crate::path::FieldPath;

/// Object-safe view of a stored value.
trait StoredValue: Any + fmt::Debug {
    fn clone_boxed(&self) -> Box<dyn StoredValue>;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Clone + fmt::Debug> StoredValue for T {
    fn clone_boxed(&self) -> Box<dyn StoredValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A value of any cloneable type, tagged with its runtime type.
///
/// Writes accept any type; reads downcast and report the stored type name on
/// mismatch.
pub struct AnyValue(Box<dyn StoredValue>);

impl AnyValue {
    /// Boxes a value.
    pub fn new<T: Any + Clone + fmt::Debug>(value: T) -> Self {
        AnyValue(Box::new(value))
    }

    /// Returns the stored value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns true if the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Returns the type name of the stored value.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl Clone for AnyValue {
    fn clone(&self) -> Self {
        AnyValue(self.0.clone_boxed())
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Storage cell for one field path.
#[derive(Debug, Clone, Default)]
pub enum ValueSlot {
    /// Never assigned, or cleared.
    #[default]
    Unset,
    /// Explicitly empty. Only meaningful for optional fields.
    Null,
    /// A concrete value.
    Present(AnyValue),
}

impl ValueSlot {
    /// Creates a `Present` slot holding `value`.
    pub fn present<T: Any + Clone + fmt::Debug>(value: T) -> Self {
        ValueSlot::Present(AnyValue::new(value))
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ValueSlot::Present(_))
    }

    /// True for both `Unset` and `Null`.
    pub fn is_null(&self) -> bool {
        !self.is_present()
    }

    /// Returns a clone of the stored value as a `T`.
    ///
    /// `Unset` reads as [`StoreError::FieldUnset`]; `Null` and values of
    /// another type read as [`StoreError::TypeMismatch`].
    pub fn typed<T: Any + Clone>(&self, path: &FieldPath) -> Result<T, StoreError> {
        match self {
            ValueSlot::Present(value) => value.downcast_ref::<T>().cloned().ok_or_else(|| {
                StoreError::TypeMismatch {
                    path: path.clone(),
                    expected: type_name::<T>(),
                    found: value.type_name(),
                }
            }),
            ValueSlot::Null => Err(StoreError::TypeMismatch {
                path: path.clone(),
                expected: type_name::<T>(),
                found: "null",
            }),
            ValueSlot::Unset => Err(StoreError::FieldUnset { path: path.clone() }),
        }
    }
}
