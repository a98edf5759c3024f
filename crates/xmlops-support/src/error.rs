//! Errors raised while reflecting over or reconstructing typed values.

use thiserror::Error;

use crate::scalar::ScalarKind;

/// A reconstruction or encoding failure.
///
/// These indicate a mismatch between a caller's type and a document's shape
/// and are always propagated, never retried.
#[derive(Error, Debug)]
pub enum ReflectError {
    #[error("missing member `{member}` while reconstructing `{type_name}`")]
    MissingMember {
        type_name: &'static str,
        member: &'static str,
    },

    #[error("expected a JSON object for `{type_name}`, found `{found}`")]
    ExpectedObject {
        type_name: &'static str,
        found: String,
    },

    #[error("`{text}` is not a member of enum `{enum_name}`")]
    InvalidEnumValue { enum_name: &'static str, text: String },

    /// A nested composite or enum type was never registered with the
    /// [`KnownTypes`](crate::KnownTypes) registry used for reconstruction.
    #[error("type `{type_name}` is not a known type; serialize it first or register it explicitly")]
    UnregisteredType { type_name: &'static str },

    #[error("invalid value for `{type_name}.{member}`: {source}")]
    Member {
        type_name: &'static str,
        member: &'static str,
        #[source]
        source: Box<ReflectError>,
    },

    #[error("non-finite {kind:?} value has no JSON encoding")]
    NonFiniteFloat { kind: ScalarKind },

    #[error("`{type_name}` stores more than one member under `{element}`")]
    DuplicateElement {
        type_name: &'static str,
        element: &'static str,
    },

    #[error("scalar conversion failed: {0}")]
    Scalar(#[from] serde_json::Error),
}

impl ReflectError {
    /// Attaches the owning type and member to an error raised for a field.
    pub fn within(self, type_name: &'static str, member: &'static str) -> Self {
        match self {
            // Already located; keep the innermost position.
            ReflectError::MissingMember { .. } | ReflectError::Member { .. } => self,
            other => ReflectError::Member {
                type_name,
                member,
                source: Box::new(other),
            },
        }
    }
}
