//! Field paths and typed field accessors.
//!
//! A [`FieldPath`] is the only addressing mechanism into the builder store:
//! an ordered list of field-name segments (`nested.int`). A [`Field`] is the
//! strongly-typed counterpart, carrying the root type it starts from and the
//! declared type of the field it ends at.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Ordered sequence of field-name segments addressing a (possibly nested) field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<&'static str>,
}

impl FieldPath {
    /// Creates an empty path (the root of the target type).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path from a slice of segments.
    pub fn from_segments(segments: &[&'static str]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment, if any.
    pub fn last(&self) -> Option<&'static str> {
        self.segments.last().copied()
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: &'static str) {
        self.segments.push(segment);
    }

    /// Removes and returns the last segment.
    pub fn pop(&mut self) -> Option<&'static str> {
        self.segments.pop()
    }

    /// Returns a new path with `tail` appended to this one.
    pub fn join(&self, tail: &[&'static str]) -> FieldPath {
        let mut segments = Vec::with_capacity(self.segments.len() + tail.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(tail);
        FieldPath { segments }
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns the dotted form, for display.
    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.to_dotted())
    }
}

impl From<&[&'static str]> for FieldPath {
    fn from(segments: &[&'static str]) -> Self {
        Self::from_segments(segments)
    }
}

impl<const N: usize> From<[&'static str; N]> for FieldPath {
    fn from(segments: [&'static str; N]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }
}

impl FromIterator<&'static str> for FieldPath {
    fn from_iter<I: IntoIterator<Item = &'static str>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// A typed accessor for a field of `Root` whose declared type is `V`.
///
/// Fields are usually generated by [`reflect!`](crate::reflect!) as
/// associated constants (`Person::FIELDS.name`) and composed with
/// [`then`](Field::then) to reach nested fields.
pub struct Field<Root, V> {
    segments: Cow<'static, [&'static str]>,
    _marker: PhantomData<fn(&Root) -> &V>,
}

impl<Root, V> Field<Root, V> {
    /// Creates a field accessor from its path segments.
    pub const fn new(segments: &'static [&'static str]) -> Self {
        Self {
            segments: Cow::Borrowed(segments),
            _marker: PhantomData,
        }
    }

    /// Composes this field with a field of its value type.
    pub fn then<W>(&self, next: &Field<V, W>) -> Field<Root, W> {
        let mut segments = self.segments.to_vec();
        segments.extend_from_slice(&next.segments);
        Field {
            segments: Cow::Owned(segments),
            _marker: PhantomData,
        }
    }

    /// Returns the accessor's segments, as written.
    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    /// Returns the accessor's segments as a [`FieldPath`].
    pub fn path(&self) -> FieldPath {
        FieldPath::from_segments(&self.segments)
    }
}

impl<Root, V> Clone for Field<Root, V> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            _marker: PhantomData,
        }
    }
}

impl<Root, V> fmt::Debug for Field<Root, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.segments.join(".")).finish()
    }
}
