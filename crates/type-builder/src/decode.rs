//! The construction contract and the bridge that satisfies it from a store.
//!
//! A target type describes how it is assembled by implementing [`Construct`]
//! against the pull-based [`Decoder`] protocol. [`DecodeBridge`] answers
//! every pull by looking up the store at its current cursor, so the type's
//! own construction logic (defaults, validation, nested construction) runs
//! unmodified over builder-supplied data.
//!
//! # Cursor discipline
//!
//! Every field access pushes exactly one segment and pops it again on every
//! exit path. The pop is performed by a drop guard, so an error returned from
//! nested construction cannot leave the cursor pointing at the failed field.

use std::any::Any;
use std::ops::{Deref, DerefMut};

use log::trace;

use crate::builder::BuildOptions;
use crate::error::DecodeError;
use crate::path::FieldPath;
use crate::store::BuilderStore;

/// A type that can assemble itself from a [`Decoder`].
pub trait Construct: Sized + 'static {
    fn construct<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError>;
}

/// Pull protocol a [`Construct`] impl drives.
///
/// Field operations are relative to the decoder's current coding path.
pub trait Decoder {
    /// Path of the value currently being constructed.
    fn coding_path(&self) -> &FieldPath;

    /// Returns true if field `name` holds a value. Probe failures read as
    /// false.
    fn field_exists(&mut self, name: &'static str) -> bool;

    /// Returns true if field `name` is null or cleared.
    ///
    /// Fails with [`DecodeError::KeyNotFound`] if the field was never
    /// targeted at all.
    fn field_is_null(&mut self, name: &'static str) -> Result<bool, DecodeError>;

    /// Constructs field `name` as a `T`.
    fn decode_field<T: Construct>(&mut self, name: &'static str) -> Result<T, DecodeError>;

    /// Constructs field `name` if it holds a value, `None` otherwise.
    fn decode_field_if_present<T: Construct>(
        &mut self,
        name: &'static str,
    ) -> Result<Option<T>, DecodeError> {
        if !self.field_exists(name) || self.field_is_null(name)? {
            return Ok(None);
        }
        self.decode_field(name).map(Some)
    }

    /// Returns true if the current value is null. Probe failures read as
    /// false.
    fn decode_nil(&mut self) -> bool;

    /// Extracts the current value as a single `T`.
    fn decode_value<T: Any + Clone>(&mut self) -> Result<T, DecodeError>;

    /// Constructs the current value as a sequence.
    fn decode_sequence<T: Construct>(&mut self) -> Result<Vec<T>, DecodeError>;
}

impl<T: Construct> Construct for Option<T> {
    fn construct<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        if decoder.decode_nil() {
            return Ok(None);
        }
        T::construct(decoder).map(Some)
    }
}

impl<T: Construct> Construct for Box<T> {
    fn construct<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        T::construct(decoder).map(Box::new)
    }
}

impl<T: Construct> Construct for Vec<T> {
    fn construct<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        decoder.decode_sequence()
    }
}

/// [`Decoder`] backed by a [`BuilderStore`].
#[derive(Debug)]
pub struct DecodeBridge<'s> {
    store: &'s BuilderStore,
    cursor: FieldPath,
    max_depth: usize,
}

impl<'s> DecodeBridge<'s> {
    /// Creates a bridge rooted at the empty path.
    pub fn new(store: &'s BuilderStore) -> Self {
        Self::with_options(store, BuildOptions::default())
    }

    pub fn with_options(store: &'s BuilderStore, options: BuildOptions) -> Self {
        Self {
            store,
            cursor: FieldPath::new(),
            max_depth: options.max_depth,
        }
    }

    #[cfg_attr(not(feature = "serde"), allow(dead_code))]
    pub(crate) fn store(&self) -> &'s BuilderStore {
        self.store
    }

    /// Pushes `name` onto the cursor until the returned guard is dropped.
    pub(crate) fn enter(&mut self, name: &'static str) -> Result<CursorGuard<'_, 's>, DecodeError> {
        let depth = self.cursor.len() + 1;
        if depth > self.max_depth {
            return Err(DecodeError::DepthExceeded {
                path: self.cursor.join(&[name]),
                depth,
                max: self.max_depth,
            });
        }
        self.cursor.push(name);
        trace!("decode: enter `{}`", self.cursor);
        Ok(CursorGuard { bridge: self })
    }
}

/// Pops the segment its creator pushed.
pub(crate) struct CursorGuard<'g, 's> {
    bridge: &'g mut DecodeBridge<'s>,
}

impl<'s> Deref for CursorGuard<'_, 's> {
    type Target = DecodeBridge<'s>;

    fn deref(&self) -> &DecodeBridge<'s> {
        self.bridge
    }
}

impl<'s> DerefMut for CursorGuard<'_, 's> {
    fn deref_mut(&mut self) -> &mut DecodeBridge<'s> {
        self.bridge
    }
}

impl Drop for CursorGuard<'_, '_> {
    fn drop(&mut self) {
        trace!("decode: leave `{}`", self.bridge.cursor);
        self.bridge.cursor.pop();
    }
}

impl Decoder for DecodeBridge<'_> {
    fn coding_path(&self) -> &FieldPath {
        &self.cursor
    }

    fn field_exists(&mut self, name: &'static str) -> bool {
        match self.enter(name) {
            Ok(scope) => scope.store.contains(&scope.cursor),
            Err(_) => false,
        }
    }

    fn field_is_null(&mut self, name: &'static str) -> Result<bool, DecodeError> {
        let scope = self.enter(name)?;
        scope
            .store
            .is_null(&scope.cursor)
            .map_err(|err| DecodeError::KeyNotFound {
                field: name,
                path: err.path().clone(),
            })
    }

    fn decode_field<T: Construct>(&mut self, name: &'static str) -> Result<T, DecodeError> {
        let mut scope = self.enter(name)?;
        T::construct(&mut *scope)
    }

    fn decode_nil(&mut self) -> bool {
        self.store.is_null(&self.cursor).unwrap_or(false)
    }

    fn decode_value<T: Any + Clone>(&mut self) -> Result<T, DecodeError> {
        Ok(self.store.get_typed::<T>(&self.cursor)?)
    }

    fn decode_sequence<T: Construct>(&mut self) -> Result<Vec<T>, DecodeError> {
        unimplemented!(
            "sequence field `{}` cannot be built field by field",
            self.cursor
        )
    }
}

/// Implements [`reflect!`](crate::reflect!) plus a field-by-field
/// [`Construct`] impl.
///
/// Fields are decoded in declaration order: `leaf` fields are required,
/// `optional` fields decode to `None` when never written or null, `nested`
/// fields recurse into the nested type's own `Construct` impl and
/// `sequence` fields are unsupported (building panics).
///
/// ```
/// use type_builder::{buildable, Builder};
///
/// #[derive(Debug, PartialEq)]
/// struct Coords { lat: f64, lon: f64 }
///
/// buildable! {
///     Coords => CoordsFields {
///         leaf lat: f64,
///         leaf lon: f64,
///     }
/// }
///
/// let builder = Builder::<Coords>::new();
/// builder.at(&Coords::FIELDS.lat).set(51.5);
/// assert!(builder.build().is_err());
///
/// builder.at(&Coords::FIELDS.lon).set(-0.12);
/// assert_eq!(builder.build(), Ok(Coords { lat: 51.5, lon: -0.12 }));
/// ```
#[macro_export]
macro_rules! buildable {
    (@decode $decoder:ident, leaf, $name:ident, $t:ty) => {
        $decoder.decode_field::<$t>(::core::stringify!($name))?
    };
    (@decode $decoder:ident, optional, $name:ident, $t:ty) => {
        $decoder.decode_field_if_present::<$t>(::core::stringify!($name))?
    };
    (@decode $decoder:ident, nested, $name:ident, $t:ty) => {
        $decoder.decode_field::<$t>(::core::stringify!($name))?
    };
    (@decode $decoder:ident, sequence, $name:ident, $t:ty) => {
        $decoder.decode_field::<::std::vec::Vec<$t>>(::core::stringify!($name))?
    };

    (
        $vis:vis $ty:ident => $fields:ident {
            $( $kind:ident $name:ident : $fty:ty ),* $(,)?
        }
    ) => {
        $crate::reflect! {
            $vis $ty => $fields {
                $( $kind $name : $fty ),*
            }
        }

        impl $crate::Construct for $ty {
            #[allow(unused_variables)]
            fn construct<D: $crate::Decoder>(
                decoder: &mut D,
            ) -> ::core::result::Result<Self, $crate::DecodeError> {
                ::core::result::Result::Ok(Self {
                    $( $name: $crate::buildable!(@decode decoder, $kind, $name, $fty), )*
                })
            }
        }
    };
}
