//! Scalar type registry.
//!
//! A fixed set of built-in types is treated as serialization leaves: every
//! integer width, floating point, decimal, string, boolean, character,
//! date-time, the pointer-sized integers, the untyped JSON [`Value`] ("object")
//! and `Option<_>` of any of these ("nullable"). Anything else is composite
//! and is recursed into field by field.
//!
//! Leaves are encoded as compact JSON text (`42`, `"Ann"`, `true`, `null`),
//! which is what makes the XML → JSON → object path lossless.

use std::any::TypeId;
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::FieldKind;
use crate::error::ReflectError;
use crate::field::{Field, FieldValue};

/// The kinds of leaf values the engine renders as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Decimal,
    String,
    Bool,
    Char,
    DateTime,
    /// Untyped JSON value.
    Object,
    /// `Option<_>` of any other scalar.
    Nullable,
}

/// Compact JSON text of a leaf.
///
/// serde_json writes NaN and the infinities as `null`, which cannot be read
/// back into a float, so they are rejected here.
fn encode<T: Serialize>(
    value: &T,
    kind: ScalarKind,
) -> Result<FieldValue<'static>, ReflectError> {
    let text = serde_json::to_string(value)?;
    if text == "null" && matches!(kind, ScalarKind::F32 | ScalarKind::F64) {
        return Err(ReflectError::NonFiniteFloat { kind });
    }
    Ok(FieldValue::Scalar(text))
}

macro_rules! scalar_fields {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                fn kind() -> FieldKind {
                    FieldKind::Scalar(ScalarKind::$kind)
                }

                fn to_field_value(&self) -> Result<FieldValue<'_>, ReflectError> {
                    encode(self, ScalarKind::$kind)
                }

                fn from_json_value(value: &Value) -> Result<Self, ReflectError> {
                    Ok(<$ty as Deserialize>::deserialize(value)?)
                }
            }

            impl Field for Option<$ty> {
                fn kind() -> FieldKind {
                    FieldKind::Scalar(ScalarKind::Nullable)
                }

                fn to_field_value(&self) -> Result<FieldValue<'_>, ReflectError> {
                    match self {
                        Some(value) => encode(value, ScalarKind::$kind),
                        None => Ok(FieldValue::Scalar("null".to_string())),
                    }
                }

                fn from_json_value(value: &Value) -> Result<Self, ReflectError> {
                    Ok(<Option<$ty> as Deserialize>::deserialize(value)?)
                }
            }
        )*

        fn builtin_scalars() -> HashMap<TypeId, ScalarKind> {
            let mut table = HashMap::new();
            $(
                table.insert(TypeId::of::<$ty>(), ScalarKind::$kind);
                table.insert(TypeId::of::<Option<$ty>>(), ScalarKind::Nullable);
            )*
            table
        }
    };
}

scalar_fields! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    String => String,
    bool => Bool,
    char => Char,
    DateTime<Utc> => DateTime,
    DateTime<FixedOffset> => DateTime,
    NaiveDateTime => DateTime,
    NaiveDate => DateTime,
    Value => Object,
}

static SCALAR_TYPES: Lazy<HashMap<TypeId, ScalarKind>> = Lazy::new(builtin_scalars);

/// Returns the scalar kind registered for `type_id`, if any.
pub fn scalar_kind_of(type_id: TypeId) -> Option<ScalarKind> {
    SCALAR_TYPES.get(&type_id).copied()
}

/// Returns true if `type_id` belongs to the scalar set.
pub fn is_scalar_type_id(type_id: TypeId) -> bool {
    SCALAR_TYPES.contains_key(&type_id)
}

/// Returns true if `T` is a scalar (leaf) type.
pub fn is_scalar<T: ?Sized + 'static>() -> bool {
    is_scalar_type_id(TypeId::of::<T>())
}
