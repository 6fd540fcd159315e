//! Type-checked partial object builder.
//!
//! This crate assembles a value of a target type one (possibly nested) field
//! at a time, then runs the type's own construction logic over the collected
//! values to produce the finished instance, failing clearly if required
//! fields are missing or the type's validation rejects the data.
//!
//! # Quick Start
//!
//! ```rust
//! use type_builder::{buildable, Builder};
//!
//! #[derive(Debug, PartialEq)]
//! struct Address { city: String, zip: u32 }
//!
//! #[derive(Debug, PartialEq)]
//! struct Person { name: String, nickname: Option<String>, address: Address }
//!
//! buildable! {
//!     Address => AddressFields {
//!         leaf city: String,
//!         leaf zip: u32,
//!     }
//! }
//!
//! buildable! {
//!     Person => PersonFields {
//!         leaf name: String,
//!         optional nickname: String,
//!         nested address: Address,
//!     }
//! }
//!
//! let builder = Builder::<Person>::new();
//! builder.at(&Person::FIELDS.name).set("Ada".to_string());
//! let address = builder.at(&Person::FIELDS.address);
//! address.at(&Address::FIELDS.city).set("London".to_string());
//! address.at(&Address::FIELDS.zip).set(12345);
//!
//! let person = builder.build()?;
//! assert_eq!(person.address.city, "London");
//! assert_eq!(person.nickname, None);
//! # Ok::<(), type_builder::BuildError>(())
//! ```
//!
//! # Modules
//!
//! - [`path`]: Field paths and typed field accessors
//! - [`reflect`]: Shapes of target types and the `reflect!` macro
//! - [`slot`]: Tri-state value slots
//! - [`store`]: Path-keyed value storage
//! - [`value`]: Terminal values and the `leaf!` macro
//! - [`lens`]: Chainable views into a builder
//! - [`decode`]: The construction contract, its store-backed decoder and
//!   the `buildable!` macro
//! - [`builder`]: The builder facade
//! - [`error`]: Error types
//! - [`limits`]: Limits applied while building
//!
//! # Fields
//!
//! A field is in one of three states: unset (never written, or cleared),
//! null (explicitly empty, optional fields only) or present. Values are
//! type-checked when read, not when written, so storing a value of the wrong
//! type surfaces as a [`DecodeError::TypeMismatch`] at build time.
//!
//! # Failure
//!
//! The [`Builder`] methods taking a [`Field`] return `Result`. The chainable
//! layer ([`Builder::at`], [`Lens`], [`Accessor`]) panics instead. Sequence
//! fields can be stored but never built; building or deserializing a type
//! that declares one panics, whether or not the field was written.
//!
//! # Features
//!
//! - `serde` (default): [`Builder::deserialize`] drives a type's
//!   `Deserialize` impl from the builder's values
//! - `uuid`: `uuid::Uuid` as a leaf type

pub mod builder;
#[cfg(feature = "serde")]
mod de;
pub mod decode;
pub mod error;
pub mod lens;
pub mod limits;
pub mod path;
pub mod reflect;
pub mod slot;
pub mod store;
pub mod value;

// Re-export commonly used types at crate root
pub use builder::{BuildOptions, Builder};
pub use decode::{Construct, DecodeBridge, Decoder};
pub use error::{BuildError, DecodeError, ReflectError, StoreError};
pub use lens::{Accessor, Lens, Node};
pub use path::{Field, FieldPath};
pub use reflect::{FieldKind, FieldShape, Reflect, Shape};
pub use slot::{AnyValue, ValueSlot};
pub use store::BuilderStore;
pub use value::{Assign, Leaf};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
