//! Unchecked, chainable views into a builder.
//!
//! A [`Lens`] stands for a structured (sub)value of the target type and
//! navigates to its fields; an [`Accessor`] stands for a single terminal
//! field and reads or writes it. Which one a step yields is decided at
//! compile time by the field's declared type, through [`Node`].
//!
//! Failures on this surface panic. The checked equivalents live on
//! [`Builder`](crate::Builder).

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

use log::{debug, trace};

use crate::error::{ReflectError, StoreError};
use crate::path::{Field, FieldPath};
use crate::reflect::Reflect;
use crate::store::BuilderStore;
use crate::value::{Assign, Leaf};

/// A field type together with the view navigation yields for it.
pub trait Node: Sized + 'static {
    type View<'b>;

    fn view<'b>(store: &'b RefCell<BuilderStore>, path: FieldPath) -> Self::View<'b>;
}

impl<V: Leaf> Node for Option<V> {
    type View<'b> = Accessor<'b, Option<V>>;

    fn view<'b>(store: &'b RefCell<BuilderStore>, path: FieldPath) -> Accessor<'b, Option<V>> {
        Accessor::new(store, path)
    }
}

impl<V: Leaf> Node for Vec<V> {
    type View<'b> = Accessor<'b, Vec<V>>;

    fn view<'b>(store: &'b RefCell<BuilderStore>, path: FieldPath) -> Accessor<'b, Vec<V>> {
        Accessor::new(store, path)
    }
}

/// View of a structured value of type `T` at a path prefix.
pub struct Lens<'b, T> {
    store: &'b RefCell<BuilderStore>,
    prefix: FieldPath,
    _marker: PhantomData<fn() -> T>,
}

impl<'b, T> Lens<'b, T> {
    pub fn new(store: &'b RefCell<BuilderStore>, prefix: FieldPath) -> Self {
        Self {
            store,
            prefix,
            _marker: PhantomData,
        }
    }

    /// Path of the value this lens stands for. Empty at the root.
    pub fn path(&self) -> &FieldPath {
        &self.prefix
    }
}

impl<'b, T: Reflect> Lens<'b, T> {
    /// Navigates to `field`, failing if it is not a stored field of `T`.
    ///
    /// Reflection is only consulted when the full path has never been
    /// written.
    pub fn try_at<V: Node>(&self, field: &Field<T, V>) -> Result<V::View<'b>, ReflectError> {
        let full = self.prefix.join(field.segments());
        if self.store.borrow().is_registered(&full) {
            return Ok(V::view(self.store, full));
        }

        let resolved = T::shape().resolve(field.segments())?;
        Ok(V::view(self.store, self.prefix.join(resolved.segments())))
    }

    /// Navigates to `field`.
    ///
    /// # Panics
    ///
    /// If `field` is not a stored field of `T`.
    pub fn at<V: Node>(&self, field: &Field<T, V>) -> V::View<'b> {
        match self.try_at(field) {
            Ok(view) => view,
            Err(err) => panic!("{err}"),
        }
    }

    /// Wholesale assignment of a structured value is not supported; values
    /// are only ever written field by field. This call does nothing.
    pub fn replace(&self, _other: &Lens<'_, T>) {
        debug!(
            "ignoring wholesale assignment to `{}` ({})",
            self.prefix,
            T::shape().type_name
        );
    }
}

impl<T> Clone for Lens<'_, T> {
    fn clone(&self) -> Self {
        Self::new(self.store, self.prefix.clone())
    }
}

impl<T> fmt::Debug for Lens<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens").field("prefix", &self.prefix).finish()
    }
}

/// View of a single terminal field whose declared type is `V`.
pub struct Accessor<'b, V> {
    store: &'b RefCell<BuilderStore>,
    path: FieldPath,
    _marker: PhantomData<fn() -> V>,
}

impl<'b, V> Accessor<'b, V> {
    pub fn new(store: &'b RefCell<BuilderStore>, path: FieldPath) -> Self {
        Self {
            store,
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns true if the field holds a value.
    pub fn contains(&self) -> bool {
        self.store.borrow().contains(&self.path)
    }

    /// Returns true if the field is null or cleared.
    pub fn is_nil(&self) -> Result<bool, StoreError> {
        self.store.borrow().is_null(&self.path)
    }

    /// Resets the field to unset.
    pub fn clear(&self) {
        self.store.borrow_mut().clear(&self.path);
    }
}

impl<V: Assign> Accessor<'_, V> {
    /// Reads the field's current value.
    pub fn try_get(&self) -> Result<V, StoreError> {
        let store = self.store.borrow();
        V::from_slot(store.slot(&self.path)?, &self.path)
    }

    /// Reads the field's current value.
    ///
    /// # Panics
    ///
    /// If the field was never written, was cleared, or holds another type.
    pub fn get(&self) -> V {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Writes the field, replacing any previous value.
    pub fn set(&self, value: V) {
        trace!("lens: set `{}`", self.path);
        self.store.borrow_mut().set_slot(&self.path, value.into_slot());
    }
}

impl<V: Leaf> Accessor<'_, Option<V>> {
    /// Marks the optional field as explicitly empty.
    pub fn set_null(&self) {
        self.store.borrow_mut().set_null(&self.path);
    }
}

impl<V> fmt::Debug for Accessor<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").field("path", &self.path).finish()
    }
}
