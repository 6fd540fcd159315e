//! Structural descriptions of target types.
//!
//! The builder relies on a type's [`Shape`] to turn a field accessor into a
//! [`FieldPath`] and to reject accessors that do not correspond to a stored
//! field. Shapes are plain static data, normally generated by the
//! [`reflect!`](crate::reflect!) macro.

use crate::error::ReflectError;
use crate::path::FieldPath;

/// How a declared field participates in building.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Terminal value, set directly.
    Leaf,
    /// `Option` of a value; may be set to null.
    Optional,
    /// Structured value assembled from its own fields.
    Nested(fn() -> &'static Shape),
    /// Collection. Storable, but never decodable.
    Sequence,
}

/// One declared field of a [`Shape`].
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Declared stored fields of a structured type.
#[derive(Debug)]
pub struct Shape {
    pub type_name: &'static str,
    pub fields: &'static [FieldShape],
}

impl Shape {
    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldShape> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Resolves accessor segments to a structural path.
    ///
    /// Every segment but the last must name a nested field.
    pub fn resolve(&self, segments: &[&'static str]) -> Result<FieldPath, ReflectError> {
        let not_reflectable = || ReflectError::NonReflectableField {
            type_name: self.type_name,
            path: segments.join("."),
        };

        let (last, parents) = segments.split_last().ok_or_else(not_reflectable)?;
        let mut shape: &Shape = self;
        for segment in parents {
            match shape.field(segment).map(|field| field.kind) {
                Some(FieldKind::Nested(nested)) => shape = nested(),
                _ => return Err(not_reflectable()),
            }
        }
        shape.field(last).ok_or_else(not_reflectable)?;

        Ok(FieldPath::from_segments(segments))
    }

    /// Returns the path of the first sequence field, searching nested shapes
    /// depth first.
    pub fn sequence_path(&self) -> Option<FieldPath> {
        self.fields.iter().find_map(|field| match field.kind {
            FieldKind::Sequence => Some(FieldPath::from_segments(&[field.name])),
            FieldKind::Nested(nested) => nested()
                .sequence_path()
                .map(|tail| FieldPath::from_segments(&[field.name]).join(tail.segments())),
            FieldKind::Leaf | FieldKind::Optional => None,
        })
    }
}

/// Reflection provider for a structured target type.
pub trait Reflect: 'static {
    fn shape() -> &'static Shape;
}

/// Declares the stored fields of a struct.
///
/// Generates a `<Name>Fields` struct of typed [`Field`](crate::Field)
/// accessors, exposed as the associated constant `FIELDS`, together with the
/// [`Reflect`] and [`Node`](crate::Node) impls. Each field is tagged with
/// its kind: `leaf`, `optional` (declared as `Option<T>`), `nested` (a
/// reflected struct) or `sequence` (declared as `Vec<T>`).
///
/// ```
/// use type_builder::{reflect, Reflect};
///
/// struct Point { x: i32, label: Option<String> }
///
/// reflect! {
///     Point => PointFields {
///         leaf x: i32,
///         optional label: String,
///     }
/// }
///
/// assert_eq!(Point::shape().fields.len(), 2);
/// assert_eq!(Point::FIELDS.label.segments(), &["label"]);
/// ```
#[macro_export]
macro_rules! reflect {
    (@ty leaf $t:ty) => { $t };
    (@ty optional $t:ty) => { ::core::option::Option<$t> };
    (@ty nested $t:ty) => { $t };
    (@ty sequence $t:ty) => { ::std::vec::Vec<$t> };

    (@kind leaf $t:ty) => { $crate::FieldKind::Leaf };
    (@kind optional $t:ty) => { $crate::FieldKind::Optional };
    (@kind nested $t:ty) => { $crate::FieldKind::Nested(<$t as $crate::Reflect>::shape) };
    (@kind sequence $t:ty) => { $crate::FieldKind::Sequence };

    (
        $vis:vis $ty:ident => $fields:ident {
            $( $kind:ident $name:ident : $fty:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone)]
        #[allow(dead_code)]
        $vis struct $fields {
            $( $vis $name: $crate::Field<$ty, $crate::reflect!(@ty $kind $fty)>, )*
        }

        impl $ty {
            #[allow(dead_code)]
            $vis const FIELDS: $fields = $fields {
                $( $name: $crate::Field::new(&[::core::stringify!($name)]), )*
            };
        }

        impl $crate::Reflect for $ty {
            fn shape() -> &'static $crate::Shape {
                static SHAPE: $crate::Shape = $crate::Shape {
                    type_name: ::core::stringify!($ty),
                    fields: &[
                        $(
                            $crate::FieldShape {
                                name: ::core::stringify!($name),
                                kind: $crate::reflect!(@kind $kind $fty),
                            },
                        )*
                    ],
                };
                &SHAPE
            }
        }

        impl $crate::Node for $ty {
            type View<'b> = $crate::Lens<'b, $ty>;

            fn view<'b>(
                store: &'b ::core::cell::RefCell<$crate::BuilderStore>,
                path: $crate::FieldPath,
            ) -> $crate::Lens<'b, $ty> {
                $crate::Lens::new(store, path)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    struct Inner {
        number: u32,
    }

    #[allow(dead_code)]
    struct Outer {
        title: String,
        inner: Inner,
        tags: Vec<String>,
    }

    crate::reflect! {
        Inner => InnerFields {
            leaf number: u32,
        }
    }

    crate::reflect! {
        Outer => OuterFields {
            leaf title: String,
            nested inner: Inner,
            sequence tags: String,
        }
    }

    #[test]
    fn test_shape_lists_declared_fields() {
        let shape = Outer::shape();
        assert_eq!(shape.type_name, "Outer");
        let names: Vec<_> = shape.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["title", "inner", "tags"]);
        assert!(matches!(shape.field("inner").map(|f| f.kind), Some(FieldKind::Nested(_))));
        assert!(matches!(shape.field("tags").map(|f| f.kind), Some(FieldKind::Sequence)));
        assert!(shape.field("missing").is_none());
    }

    #[test]
    fn test_resolve_nested_path() {
        let field = Outer::FIELDS.inner.then(&Inner::FIELDS.number);
        assert_eq!(
            Outer::shape().resolve(field.segments()),
            Ok(FieldPath::from(["inner", "number"]))
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_fields() {
        assert_eq!(
            Outer::shape().resolve(&["computed"]),
            Err(ReflectError::NonReflectableField {
                type_name: "Outer",
                path: "computed".to_string(),
            })
        );
        // Cannot pass through a leaf.
        assert!(Outer::shape().resolve(&["title", "len"]).is_err());
        assert!(Outer::shape().resolve(&["inner", "other"]).is_err());
        assert!(Outer::shape().resolve(&[]).is_err());
    }

    #[allow(dead_code)]
    struct Wrapper {
        outer: Outer,
    }

    crate::reflect! {
        Wrapper => WrapperFields {
            nested outer: Outer,
        }
    }

    #[test]
    fn test_sequence_path() {
        assert_eq!(Inner::shape().sequence_path(), None);
        assert_eq!(Outer::shape().sequence_path(), Some(FieldPath::from(["tags"])));
        assert_eq!(
            Wrapper::shape().sequence_path(),
            Some(FieldPath::from(["outer", "tags"]))
        );
    }
}
