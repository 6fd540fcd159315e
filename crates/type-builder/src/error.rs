//! Error types for the builder store, reflection, decoding and building.

use thiserror::Error;

use crate::path::FieldPath;

/// Error raised by a [`BuilderStore`](crate::store::BuilderStore) lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Nothing was ever written at this path.
    #[error("no value registered at `{path}`")]
    MissingPath { path: FieldPath },

    /// The path is registered but its slot was cleared.
    #[error("field `{path}` is registered but holds no value")]
    FieldUnset { path: FieldPath },

    /// A nil probe hit a path that was never targeted by a setter.
    #[error("unknown field path `{path}`")]
    UnknownPath { path: FieldPath },

    /// The stored value's type differs from the requested one.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: FieldPath,
        expected: &'static str,
        found: &'static str,
    },
}

impl StoreError {
    /// Returns the path the failed lookup was addressed to.
    pub fn path(&self) -> &FieldPath {
        match self {
            StoreError::MissingPath { path }
            | StoreError::FieldUnset { path }
            | StoreError::UnknownPath { path }
            | StoreError::TypeMismatch { path, .. } => path,
        }
    }
}

/// Error raised by the reflection provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// The accessor does not map to a stored field (e.g. a computed property).
    #[error("`{path}` is not a stored field of {type_name}")]
    NonReflectableField {
        type_name: &'static str,
        path: String,
    },
}

/// Error raised while a target type's construction contract runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A nil probe was asked about a field that has no associated value.
    #[error("no value associated with field `{field}` (at `{path}`)")]
    KeyNotFound {
        field: &'static str,
        path: FieldPath,
    },

    /// A required value was never written, or was cleared.
    #[error("missing value for required field `{path}`")]
    MissingValue { path: FieldPath },

    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: FieldPath,
        expected: &'static str,
        found: &'static str,
    },

    /// The target type rejected the assembled data.
    #[error("invalid value at `{path}`: {message}")]
    InvalidValue { path: FieldPath, message: String },

    #[error("nesting depth {depth} exceeds maximum {max} at `{path}`")]
    DepthExceeded {
        path: FieldPath,
        depth: usize,
        max: usize,
    },

    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    /// Builds an [`InvalidValue`](DecodeError::InvalidValue) error, for use in
    /// hand-written construction logic.
    pub fn invalid(path: &FieldPath, message: impl Into<String>) -> Self {
        DecodeError::InvalidValue {
            path: path.clone(),
            message: message.into(),
        }
    }
}

impl From<StoreError> for DecodeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingPath { path }
            | StoreError::FieldUnset { path }
            | StoreError::UnknownPath { path } => DecodeError::MissingValue { path },
            StoreError::TypeMismatch {
                path,
                expected,
                found,
            } => DecodeError::TypeMismatch {
                path,
                expected,
                found,
            },
        }
    }
}

#[cfg(feature = "serde")]
impl serde::de::Error for DecodeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        DecodeError::Custom(msg.to_string())
    }
}

/// Error returned by the checked [`Builder`](crate::builder::Builder) surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// A write was attempted while a [`Builder::store`](crate::Builder::store)
    /// view was alive.
    #[error("builder store is borrowed; drop the store view before writing")]
    StoreBorrowed,

    #[error("failed to build {type_name}: {source}")]
    Decode {
        type_name: &'static str,
        #[source]
        source: DecodeError,
    },
}

impl BuildError {
    /// Returns the decode failure, if building is what failed.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            BuildError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}
