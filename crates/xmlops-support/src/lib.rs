//! # xmlops support
//!
//! Shared building blocks for the xmlops transcoding engine:
//!
//! - **Scalar classification**: the fixed set of leaf types ([`ScalarKind`],
//!   [`is_scalar`]) that are rendered as text rather than recursed into.
//! - **Type descriptors**: static, ordered descriptions of user types
//!   ([`TypeDescriptor`], [`FieldDescriptor`], [`EnumDescriptor`]) produced by
//!   `#[derive(Reflect)]`.
//! - **Field traits**: [`Field`], [`Reflect`], [`Reconstruct`] and
//!   [`Enumeration`], the seams the engine walks in both directions.
//! - **Known types**: the explicit [`KnownTypes`] registry of composite and
//!   enum types seen by the forward path and required by the reverse path.
//!
//! ```ignore
//! use xmlops_support::{Reconstruct, Reflect};
//!
//! #[derive(Reflect)]
//! struct User {
//!     id: i32,
//!     name: String,
//! }
//!
//! let descriptor = User::descriptor();
//! assert_eq!(descriptor.name, "User");
//! assert_eq!(descriptor.fields[0].name, "Id");
//! ```

// Generated code refers to `::xmlops_support`, including inside this crate's tests.
extern crate self as xmlops_support;

pub mod descriptor;
pub mod error;
pub mod field;
pub mod known_types;
pub mod scalar;

pub use descriptor::{EnumDescriptor, EnumMember, FieldDescriptor, FieldKind, TypeDescriptor};
pub use error::ReflectError;
pub use field::{
    Enumeration, Field, FieldValue, Reconstruct, Reflect, enum_member_from_json, expect_object,
    member_from_json,
};
pub use known_types::{KnownType, KnownTypes};
pub use scalar::{ScalarKind, is_scalar, is_scalar_type_id, scalar_kind_of};

pub use serde_json::{Map as JsonMap, Value as JsonValue};

/// Derives [`Reflect`], [`Reconstruct`] and [`Field`] for structs with named
/// fields, and [`Enumeration`] and [`Field`] for fieldless enums.
pub use xmlops_macro::Reflect;
