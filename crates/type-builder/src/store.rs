//! Path-keyed storage for the values a builder has accumulated.
//!
//! The store never needs to know the target type's full field set: a path is
//! registered the first time it is written (or cleared) and stays registered
//! for the lifetime of the store. Paths are compared segment by segment, never
//! by their dotted rendering. Probes against unregistered paths are how
//! the decode bridge tells "never targeted" apart from "explicitly null".

use std::any::Any;
use std::fmt;

use log::trace;
use rustc_hash::FxHashMap;

use crate::error::StoreError;
use crate::path::FieldPath;
use crate::slot::ValueSlot;

/// Mapping from field paths to value slots. A path is registered once it
/// has a slot, and keeps it for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct BuilderStore {
    slots: FxHashMap<FieldPath, ValueSlot>,
}

impl BuilderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `Present(value)` at `path`.
    pub fn set_present<T: Any + Clone + fmt::Debug>(&mut self, path: &FieldPath, value: T) {
        self.set_slot(path, ValueSlot::present(value));
    }

    /// Records `Null` at `path`.
    ///
    /// No optionality check happens here; nulling a required field surfaces
    /// later as a type mismatch.
    pub fn set_null(&mut self, path: &FieldPath) {
        self.set_slot(path, ValueSlot::Null);
    }

    /// Resets the slot at `path` to `Unset`, keeping its registration.
    pub fn clear(&mut self, path: &FieldPath) {
        self.set_slot(path, ValueSlot::Unset);
    }

    /// Overwrites the slot at `path`, registering the path if needed.
    pub fn set_slot(&mut self, path: &FieldPath, slot: ValueSlot) {
        trace!("store: {path} <- {slot:?}");
        if self.slots.insert(path.clone(), slot).is_none() {
            trace!("store: registered `{path}`");
        }
    }

    /// Returns true if `path` has been written at least once.
    pub fn is_registered(&self, path: &FieldPath) -> bool {
        self.slots.contains_key(path)
    }

    /// Returns the slot at `path`, failing with `MissingPath` if unregistered.
    pub fn slot(&self, path: &FieldPath) -> Result<&ValueSlot, StoreError> {
        self.slots
            .get(path)
            .ok_or_else(|| StoreError::MissingPath { path: path.clone() })
    }

    /// Returns a clone of the value at `path` as a `T`.
    pub fn get_typed<T: Any + Clone>(&self, path: &FieldPath) -> Result<T, StoreError> {
        self.slot(path)?.typed(path)
    }

    /// Returns true if the slot at `path` is `Unset` or `Null`.
    ///
    /// Fails with `UnknownPath` if the path was never registered.
    pub fn is_null(&self, path: &FieldPath) -> Result<bool, StoreError> {
        self.slots
            .get(path)
            .map(ValueSlot::is_null)
            .ok_or_else(|| StoreError::UnknownPath { path: path.clone() })
    }

    /// Returns true if `path` is registered and holds a value.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.slots.get(path).is_some_and(ValueSlot::is_present)
    }

    /// Returns true if some registered path lies strictly below `path`.
    pub fn has_descendants(&self, path: &FieldPath) -> bool {
        self.slots
            .keys()
            .any(|registered| registered.len() > path.len() && registered.starts_with(path))
    }

    /// Iterates over every registered path, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.slots.keys()
    }

    /// Returns the number of registered paths.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&'static str]) -> FieldPath {
        FieldPath::from_segments(segments)
    }

    #[test]
    fn test_unwritten_path() {
        let store = BuilderStore::new();
        let text = path(&["text"]);

        assert!(!store.contains(&text));
        assert_eq!(
            store.is_null(&text),
            Err(StoreError::UnknownPath { path: text.clone() })
        );
        assert_eq!(
            store.get_typed::<String>(&text),
            Err(StoreError::MissingPath { path: text })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = BuilderStore::new();
        let text = path(&["text"]);
        store.set_present(&text, String::from("Hello"));

        assert!(store.contains(&text));
        assert_eq!(store.is_null(&text), Ok(false));
        assert_eq!(store.get_typed::<String>(&text), Ok(String::from("Hello")));
    }

    #[test]
    fn test_overwrite() {
        let mut store = BuilderStore::new();
        let number = path(&["number"]);
        store.set_present(&number, 1i32);
        store.set_present(&number, 2i32);

        assert_eq!(store.get_typed::<i32>(&number), Ok(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_type_mismatch_on_read() {
        let mut store = BuilderStore::new();
        let number = path(&["number"]);
        store.set_present(&number, 42i32);

        assert!(matches!(
            store.get_typed::<String>(&number),
            Err(StoreError::TypeMismatch { expected: "alloc::string::String", found: "i32", .. })
        ));
    }

    #[test]
    fn test_null_then_clear_keeps_registration() {
        let mut store = BuilderStore::new();
        let text = path(&["text"]);

        store.set_null(&text);
        assert!(store.is_registered(&text));
        assert!(!store.contains(&text));
        assert_eq!(store.is_null(&text), Ok(true));

        store.set_present(&text, String::from("x"));
        store.clear(&text);
        assert!(store.is_registered(&text));
        assert!(!store.contains(&text));
        assert_eq!(store.is_null(&text), Ok(true));
        assert_eq!(
            store.get_typed::<String>(&text),
            Err(StoreError::FieldUnset { path: text })
        );
    }

    #[test]
    fn test_nested_paths_are_independent() {
        let mut store = BuilderStore::new();
        let leaf = path(&["nested", "int"]);
        store.set_present(&leaf, 7i64);

        assert!(store.contains(&leaf));
        assert!(!store.is_registered(&path(&["nested"])));
        assert!(store.has_descendants(&path(&["nested"])));
        assert!(store.has_descendants(&FieldPath::new()));
        assert!(!store.has_descendants(&leaf));
        assert!(!store.has_descendants(&path(&["other"])));
    }

    #[test]
    fn test_paths_compare_by_segments() {
        let mut store = BuilderStore::new();
        let split = path(&["a", "b"]);
        let joined = path(&["a.b"]);
        store.set_present(&split, 1i32);
        store.set_present(&joined, 2i32);

        // Same dotted rendering, different paths.
        assert_eq!(split.to_string(), joined.to_string());
        assert_eq!(store.get_typed::<i32>(&split), Ok(1));
        assert_eq!(store.get_typed::<i32>(&joined), Ok(2));
        assert_eq!(store.len(), 2);

        let mut store = BuilderStore::new();
        store.set_present(&path(&["x.y"]), 5i32);
        assert!(!store.is_registered(&path(&["x", "y"])));
        assert_eq!(
            store.get_typed::<i32>(&path(&["x", "y"])),
            Err(StoreError::MissingPath { path: path(&["x", "y"]) })
        );
    }
}
