//! The public builder facade.
//!
//! A [`Builder`] owns the store for one target type and exposes three
//! layers over it:
//!
//! - a checked layer (`set`, `value`, `contains`, ...) taking typed
//!   [`Field`] accessors and returning `Result`
//! - a path layer (`value_at`, ...) addressed by raw [`FieldPath`]s, the
//!   same paths the decode bridge uses
//! - an unchecked, chainable layer (`at`, `lens`) that panics on failure
//!
//! # Example
//!
//! ```rust
//! use type_builder::{buildable, Builder};
//!
//! #[derive(Debug, PartialEq)]
//! struct Settings { retries: u8, label: Option<String> }
//!
//! buildable! {
//!     Settings => SettingsFields {
//!         leaf retries: u8,
//!         optional label: String,
//!     }
//! }
//!
//! let builder = Builder::<Settings>::new();
//! builder.set(&Settings::FIELDS.retries, 3)?;
//! builder.set(&Settings::FIELDS.label, Some("primary".to_string()))?;
//! assert_eq!(builder.value(&Settings::FIELDS.retries)?, 3);
//!
//! let settings = builder.build()?;
//! assert_eq!(settings.label.as_deref(), Some("primary"));
//! # Ok::<(), type_builder::BuildError>(())
//! ```

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::marker::PhantomData;

use log::debug;

use crate::decode::{Construct, DecodeBridge, Decoder};
use crate::error::{BuildError, ReflectError, StoreError};
use crate::lens::{Lens, Node};
use crate::limits::MAX_DEPTH;
use crate::path::{Field, FieldPath};
use crate::reflect::Reflect;
use crate::store::BuilderStore;
use crate::value::Assign;

/// Options for building.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Maximum field nesting depth followed while constructing.
    pub max_depth: usize,
}

impl BuildOptions {
    /// Creates default build options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// Incrementally assembles a `T`, field by field.
///
/// All operations take `&self`, so lenses and accessors obtained from the
/// builder can coexist. A builder is not `Sync`.
pub struct Builder<T> {
    store: RefCell<BuilderStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Builder<T> {
    /// Read-only view of the accumulated values.
    ///
    /// While the view is alive, checked writes fail with
    /// [`BuildError::StoreBorrowed`] and writes through an
    /// [`Accessor`](crate::Accessor) panic.
    ///
    /// # Panics
    ///
    /// If a write is in progress, which cannot happen outside the builder's
    /// own methods.
    pub fn store(&self) -> Ref<'_, BuilderStore> {
        self.store.borrow()
    }

    fn store_mut(&self) -> Result<RefMut<'_, BuilderStore>, BuildError> {
        self.store
            .try_borrow_mut()
            .map_err(|_| BuildError::StoreBorrowed)
    }

    // =========================================================================
    // Path access
    // =========================================================================

    /// Reads the value stored at `path`.
    pub fn value_at<V: Any + Clone>(&self, path: &FieldPath) -> Result<V, StoreError> {
        self.store.borrow().get_typed(path)
    }

    /// Returns true if `path` holds a value.
    pub fn contains_path(&self, path: &FieldPath) -> bool {
        self.store.borrow().contains(path)
    }

    /// Returns true if `path` is null or cleared.
    pub fn is_nil_at(&self, path: &FieldPath) -> Result<bool, StoreError> {
        self.store.borrow().is_null(path)
    }
}

impl<T: Reflect> Builder<T> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            store: RefCell::new(BuilderStore::new()),
            _marker: PhantomData,
        }
    }

    /// Resolves `field` to a path. Paths written before skip reflection.
    fn resolve<V>(&self, field: &Field<T, V>) -> Result<FieldPath, ReflectError> {
        let path = field.path();
        if self.store.borrow().is_registered(&path) {
            return Ok(path);
        }
        T::shape().resolve(field.segments())
    }

    // =========================================================================
    // Checked access
    // =========================================================================

    /// Writes `value` to `field`, replacing any previous value.
    ///
    /// For an `Option` field, `None` records an explicit null.
    pub fn set<V: Assign>(&self, field: &Field<T, V>, value: V) -> Result<(), BuildError> {
        let path = self.resolve(field)?;
        self.store_mut()?.set_slot(&path, value.into_slot());
        Ok(())
    }

    /// Marks the optional `field` as explicitly empty.
    pub fn set_null<V>(&self, field: &Field<T, Option<V>>) -> Result<(), BuildError> {
        let path = self.resolve(field)?;
        self.store_mut()?.set_null(&path);
        Ok(())
    }

    /// Resets `field` to unset.
    pub fn clear<V>(&self, field: &Field<T, V>) -> Result<(), BuildError> {
        let path = self.resolve(field)?;
        self.store_mut()?.clear(&path);
        Ok(())
    }

    /// Reads the current value of `field`.
    pub fn value<V: Assign>(&self, field: &Field<T, V>) -> Result<V, BuildError> {
        let path = self.resolve(field)?;
        let store = self.store.borrow();
        Ok(V::from_slot(store.slot(&path)?, &path)?)
    }

    /// Returns true if `field` holds a value.
    pub fn contains<V>(&self, field: &Field<T, V>) -> Result<bool, BuildError> {
        let path = self.resolve(field)?;
        Ok(self.store.borrow().contains(&path))
    }

    /// Returns true if `field` is null or cleared. Fails if it was never
    /// written.
    pub fn is_nil<V>(&self, field: &Field<T, V>) -> Result<bool, BuildError> {
        let path = self.resolve(field)?;
        Ok(self.store.borrow().is_null(&path)?)
    }

    // =========================================================================
    // Unchecked access
    // =========================================================================

    /// Root lens over the target type.
    pub fn lens(&self) -> Lens<'_, T> {
        Lens::new(&self.store, FieldPath::new())
    }

    /// Navigates to `field`: a [`Lens`] for structured fields, an
    /// [`Accessor`](crate::Accessor) for terminal ones.
    ///
    /// # Panics
    ///
    /// If `field` is not a stored field of `T`.
    pub fn at<V: Node>(&self, field: &Field<T, V>) -> V::View<'_> {
        self.lens().at(field)
    }

    /// Checked form of [`at`](Builder::at).
    pub fn try_at<V: Node>(&self, field: &Field<T, V>) -> Result<V::View<'_>, ReflectError> {
        self.lens().try_at(field)
    }
}

impl<T: Reflect + Construct> Builder<T> {
    /// Runs `T`'s construction logic over the current values.
    ///
    /// Building does not modify the builder; every call yields a new,
    /// independent value.
    ///
    /// # Panics
    ///
    /// If `T` contains a sequence field, which cannot be built field by
    /// field.
    pub fn build(&self) -> Result<T, BuildError> {
        self.build_with_options(BuildOptions::default())
    }

    /// Builds with the given options.
    pub fn build_with_options(&self, options: BuildOptions) -> Result<T, BuildError> {
        let store = self.store.borrow();
        let type_name = T::shape().type_name;
        debug!("building {type_name} from {} registered paths", store.len());

        let mut bridge = DecodeBridge::with_options(&store, options);
        let result = T::construct(&mut bridge);
        debug_assert!(bridge.coding_path().is_empty());

        result.map_err(|source| {
            debug!("building {type_name} failed: {source}");
            BuildError::Decode { type_name, source }
        })
    }
}

#[cfg(feature = "serde")]
impl<T: Reflect + serde::de::DeserializeOwned> Builder<T> {
    /// Runs `T`'s `Deserialize` impl over the current values.
    ///
    /// # Panics
    ///
    /// If `T` contains a sequence field, written or not, matching
    /// [`build`](Builder::build).
    pub fn deserialize(&self) -> Result<T, BuildError> {
        self.deserialize_with_options(BuildOptions::default())
    }

    pub fn deserialize_with_options(&self, options: BuildOptions) -> Result<T, BuildError> {
        let shape = T::shape();
        if let Some(path) = shape.sequence_path() {
            unimplemented!("sequence field `{path}` cannot be built field by field");
        }

        let store = self.store.borrow();
        let type_name = shape.type_name;
        debug!("deserializing {type_name} from {} registered paths", store.len());

        let mut bridge = DecodeBridge::with_options(&store, options);
        serde::Deserialize::deserialize(&mut bridge)
            .map_err(|source| BuildError::Decode { type_name, source })
    }
}

impl<T: Reflect> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Builder<T> {
    fn clone(&self) -> Self {
        Self {
            store: RefCell::new(self.store.borrow().clone()),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Builder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("target", &std::any::type_name::<T>())
            .field("store", &*self.store.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[derive(Debug, Clone, PartialEq)]
    struct Nested {
        int: i64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        text: String,
        int: i32,
        optional: Option<String>,
        nested: Nested,
    }

    crate::buildable! {
        Nested => NestedFields {
            leaf int: i64,
        }
    }

    crate::buildable! {
        Record => RecordFields {
            leaf text: String,
            leaf int: i32,
            optional optional: String,
            nested nested: Nested,
        }
    }

    fn filled() -> Builder<Record> {
        let builder = Builder::<Record>::new();
        builder.set(&Record::FIELDS.text, String::from("S")).unwrap();
        builder.set(&Record::FIELDS.int, 42).unwrap();
        builder
            .set(&Record::FIELDS.nested.then(&Nested::FIELDS.int), 7)
            .unwrap();
        builder
    }

    #[test]
    fn test_build_with_optional_unset() {
        let record = filled().build().unwrap();
        assert_eq!(
            record,
            Record {
                text: String::from("S"),
                int: 42,
                optional: None,
                nested: Nested { int: 7 },
            }
        );
    }

    #[test]
    fn test_build_missing_required() {
        let builder = Builder::<Record>::new();
        builder.set(&Record::FIELDS.text, String::from("S")).unwrap();

        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            BuildError::Decode {
                type_name: "Record",
                source: DecodeError::MissingValue {
                    path: FieldPath::from(["int"]),
                },
            }
        );
    }

    #[test]
    fn test_set_then_null() {
        let builder = filled();
        builder
            .set(&Record::FIELDS.optional, Some(String::from("X")))
            .unwrap();
        assert_eq!(builder.build().unwrap().optional.as_deref(), Some("X"));

        builder.set_null(&Record::FIELDS.optional).unwrap();
        assert_eq!(builder.contains(&Record::FIELDS.optional), Ok(false));
        assert_eq!(builder.is_nil(&Record::FIELDS.optional), Ok(true));
        assert_eq!(builder.value(&Record::FIELDS.optional), Ok(None));
        assert_eq!(builder.build().unwrap().optional, None);
    }

    #[test]
    fn test_unwritten_field_queries() {
        let builder = Builder::<Record>::new();
        assert_eq!(builder.contains(&Record::FIELDS.text), Ok(false));
        assert_eq!(
            builder.is_nil(&Record::FIELDS.text),
            Err(BuildError::Store(StoreError::UnknownPath {
                path: FieldPath::from(["text"]),
            }))
        );
        assert_eq!(
            builder.value(&Record::FIELDS.text),
            Err(BuildError::Store(StoreError::MissingPath {
                path: FieldPath::from(["text"]),
            }))
        );
    }

    #[test]
    fn test_clear_keeps_registration() {
        let builder = filled();
        builder.clear(&Record::FIELDS.text).unwrap();

        assert!(builder.store().is_registered(&FieldPath::from(["text"])));
        assert_eq!(
            builder.value(&Record::FIELDS.text),
            Err(BuildError::Store(StoreError::FieldUnset {
                path: FieldPath::from(["text"]),
            }))
        );
        assert!(matches!(
            builder.build().unwrap_err().as_decode(),
            Some(DecodeError::MissingValue { .. })
        ));
    }

    #[test]
    fn test_non_reflectable_field() {
        let builder = Builder::<Record>::new();
        let computed: Field<Record, usize> = Field::new(&["text_len"]);

        assert_eq!(
            builder.set(&computed, 4),
            Err(BuildError::Reflect(ReflectError::NonReflectableField {
                type_name: "Record",
                path: String::from("text_len"),
            }))
        );
        assert!(builder.store().is_empty());
    }

    #[test]
    fn test_path_layer() {
        let builder = filled();
        let path = FieldPath::from(["nested", "int"]);
        assert_eq!(builder.value_at::<i64>(&path), Ok(7));
        assert!(builder.contains_path(&path));
        assert_eq!(builder.is_nil_at(&path), Ok(false));
        assert!(!builder.contains_path(&FieldPath::from(["nested"])));
    }

    #[test]
    fn test_rebuild_is_independent() {
        let builder = filled();
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);

        builder.set(&Record::FIELDS.int, 43).unwrap();
        let third = builder.build().unwrap();
        assert_eq!(first.int, 42);
        assert_eq!(third.int, 43);
    }

    #[test]
    fn test_clone_snapshots_store() {
        let builder = filled();
        let snapshot = builder.clone();
        builder.set(&Record::FIELDS.int, 1).unwrap();

        assert_eq!(snapshot.value(&Record::FIELDS.int), Ok(42));
        assert_eq!(builder.value(&Record::FIELDS.int), Ok(1));
    }

    #[test]
    fn test_checked_write_while_store_is_viewed() {
        let builder = filled();
        let view = builder.store();

        assert_eq!(
            builder.set(&Record::FIELDS.int, 1),
            Err(BuildError::StoreBorrowed)
        );
        assert_eq!(
            builder.clear(&Record::FIELDS.text),
            Err(BuildError::StoreBorrowed)
        );
        assert_eq!(view.get_typed::<i32>(&FieldPath::from(["int"])), Ok(42));
        drop(view);

        builder.set(&Record::FIELDS.int, 1).unwrap();
        assert_eq!(builder.value(&Record::FIELDS.int), Ok(1));
    }

    #[test]
    fn test_build_options_depth() {
        let options = BuildOptions::new().max_depth(1);
        let err = filled().build_with_options(options).unwrap_err();
        assert!(matches!(
            err.as_decode(),
            Some(DecodeError::DepthExceeded { depth: 2, max: 1, .. })
        ));
    }
}
