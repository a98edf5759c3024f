//! The traits the transcoding engine walks.
//!
//! - [`Field`] is implemented by every type that may appear as a struct
//!   field: the scalar set, derived composites and derived enums.
//! - [`Reflect`] is the object-safe view of a composite used by the forward
//!   (object → XML) path.
//! - [`Reconstruct`] is the static view used by the reverse (JSON → object)
//!   path.
//! - [`Enumeration`] exposes the member table of a derived enum.

use serde_json::{Map, Value};

use crate::descriptor::{EnumDescriptor, EnumMember, FieldKind, TypeDescriptor};
use crate::error::ReflectError;

/// The current value of one field, ready to be rendered.
pub enum FieldValue<'a> {
    /// Compact JSON text of a scalar.
    Scalar(String),
    /// Declared member name of an enum value.
    Enum(&'static str),
    /// A nested composite.
    Composite(&'a dyn Reflect),
}

impl std::fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Scalar(text) => f.debug_tuple("Scalar").field(text).finish(),
            FieldValue::Enum(name) => f.debug_tuple("Enum").field(name).finish(),
            FieldValue::Composite(value) => f
                .debug_tuple("Composite")
                .field(&value.type_descriptor().name)
                .finish(),
        }
    }
}

/// A type usable as a field of a reflected struct.
pub trait Field: Sized + 'static {
    fn kind() -> FieldKind;

    fn to_field_value(&self) -> Result<FieldValue<'_>, ReflectError>;

    fn from_json_value(value: &Value) -> Result<Self, ReflectError>;
}

/// Runtime view of a composite value.
pub trait Reflect: 'static {
    fn type_descriptor(&self) -> &'static TypeDescriptor;

    /// Field values in descriptor order.
    fn field_values(&self) -> Result<Vec<FieldValue<'_>>, ReflectError>;
}

/// Static view of a composite type that can be rebuilt from JSON.
pub trait Reconstruct: Reflect + Sized {
    fn descriptor() -> &'static TypeDescriptor;

    fn from_json(value: &Value) -> Result<Self, ReflectError>;
}

/// A fieldless enum with a static member table.
pub trait Enumeration: Field {
    fn descriptor() -> &'static EnumDescriptor;
}

/// Returns the members of `value`, or an error naming the expected type.
pub fn expect_object<'v>(
    value: &'v Value,
    descriptor: &'static TypeDescriptor,
) -> Result<&'v Map<String, Value>, ReflectError> {
    value.as_object().ok_or_else(|| ReflectError::ExpectedObject {
        type_name: descriptor.name,
        found: value.to_string(),
    })
}

/// Reads the field at `index` of `descriptor` from a JSON object.
pub fn member_from_json<F: Field>(
    object: &Map<String, Value>,
    descriptor: &'static TypeDescriptor,
    index: usize,
) -> Result<F, ReflectError> {
    let field = &descriptor.fields[index];
    let key = field.element_name();
    let value = object.get(key).ok_or(ReflectError::MissingMember {
        type_name: descriptor.name,
        member: key,
    })?;
    F::from_json_value(value).map_err(|err| err.within(descriptor.name, key))
}

/// Resolves an enum member from either its integer value or its name.
pub fn enum_member_from_json(
    descriptor: &'static EnumDescriptor,
    value: &Value,
) -> Result<&'static EnumMember, ReflectError> {
    let member = match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(|value| descriptor.member_by_value(value)),
        Value::String(name) => descriptor.member_by_name(name),
        _ => None,
    };
    member.ok_or_else(|| ReflectError::InvalidEnumValue {
        enum_name: descriptor.name,
        text: match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect as DeriveReflect;
    use serde_json::json;

    #[derive(Debug, PartialEq, DeriveReflect)]
    enum Level {
        Low,
        High = 10,
    }

    #[derive(Debug, PartialEq, DeriveReflect)]
    struct Setting {
        key: String,
        level: Level,
    }

    #[test]
    fn test_enum_member_lookup() -> Result<(), ReflectError> {
        let descriptor = <Level as Enumeration>::descriptor();
        assert_eq!(enum_member_from_json(descriptor, &json!(10))?.name, "High");
        assert_eq!(enum_member_from_json(descriptor, &json!("Low"))?.value, 0);
        assert!(matches!(
            enum_member_from_json(descriptor, &json!("Medium")),
            Err(ReflectError::InvalidEnumValue { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_member_from_json_reports_missing_member() {
        let err = Setting::from_json(&json!({ "Key": "mode" })).unwrap_err();
        assert!(matches!(
            err,
            ReflectError::MissingMember {
                type_name: "Setting",
                member: "Level"
            }
        ));
    }

    #[test]
    fn test_from_json_with_enum_value() -> Result<(), ReflectError> {
        let setting = Setting::from_json(&json!({ "Key": "mode", "Level": 10 }))?;
        assert_eq!(
            setting,
            Setting {
                key: "mode".to_string(),
                level: Level::High,
            }
        );
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            Setting::from_json(&json!([1, 2])),
            Err(ReflectError::ExpectedObject { .. })
        ));
    }

    #[test]
    fn test_field_values_follow_declaration_order() -> Result<(), ReflectError> {
        let setting = Setting {
            key: "mode".to_string(),
            level: Level::Low,
        };
        let values = setting.field_values()?;
        assert!(matches!(&values[0], FieldValue::Scalar(text) if text == "\"mode\""));
        assert!(matches!(values[1], FieldValue::Enum("Low")));
        Ok(())
    }
}
