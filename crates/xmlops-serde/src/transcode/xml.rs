//! Object → XML fragment.
//!
//! A composite becomes an element named after its type. Scalar and enum
//! fields become `<Field>text</Field>` leaves, where the text of a scalar is
//! its compact JSON encoding and the text of an enum is the member name.
//! Nested composites are written inline under their own type name, without a
//! wrapper named after the field.

use std::io;

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;
use xmlops_support::{FieldKind, FieldValue, KnownTypes, Reconstruct, Reflect, TypeDescriptor};

use crate::error::Result;

/// Renders `value` as an XML element, registering every composite and enum
/// type it meets in `known`.
pub fn to_xml_fragment(value: &dyn Reflect, known: &mut KnownTypes) -> Result<String> {
    value.type_descriptor().ensure_unique_elements()?;
    let mut writer = Writer::new(Vec::new());
    write_object(&mut writer, value, known)?;
    into_string(writer)
}

/// Renders `items` inside a `<TypeList>` wrapper, in order.
///
/// An empty slice still produces the wrapper.
pub fn to_xml_list_fragment<T: Reconstruct>(items: &[T], known: &mut KnownTypes) -> Result<String> {
    write_list(
        T::descriptor(),
        items.iter().map(|item| item as &dyn Reflect),
        known,
    )
}

/// Like [`to_xml_list_fragment`], skipping `None` entries.
pub fn to_xml_list_fragment_sparse<T: Reconstruct>(
    items: &[Option<T>],
    known: &mut KnownTypes,
) -> Result<String> {
    write_list(
        T::descriptor(),
        items.iter().flatten().map(|item| item as &dyn Reflect),
        known,
    )
}

fn write_list<'a>(
    descriptor: &'static TypeDescriptor,
    items: impl Iterator<Item = &'a dyn Reflect>,
    known: &mut KnownTypes,
) -> Result<String> {
    descriptor.ensure_unique_elements()?;
    known.register_type(descriptor);
    let list_name = descriptor.list_name();

    let mut writer = Writer::new(Vec::new());
    emit(&mut writer, Event::Start(BytesStart::new(list_name.as_str())))?;
    for item in items {
        write_object(&mut writer, item, known)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new(list_name.as_str())))?;
    into_string(writer)
}

fn write_object(
    writer: &mut Writer<Vec<u8>>,
    value: &dyn Reflect,
    known: &mut KnownTypes,
) -> Result<()> {
    let descriptor = value.type_descriptor();
    known.register_type(descriptor);
    trace!(type_name = descriptor.name, "Writing object element");

    emit(writer, Event::Start(BytesStart::new(descriptor.name)))?;
    for (field, field_value) in descriptor.fields.iter().zip(value.field_values()?) {
        match field_value {
            FieldValue::Scalar(text) => write_leaf(writer, field.name, &text)?,
            FieldValue::Enum(member) => {
                if let FieldKind::Enum(enumeration) = field.field_kind() {
                    known.register_enum(enumeration());
                }
                write_leaf(writer, field.name, member)?;
            }
            FieldValue::Composite(nested) => write_object(writer, nested, known)?,
        }
    }
    emit(writer, Event::End(BytesEnd::new(descriptor.name)))
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(io::Error::other)?;
    Ok(())
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|e| io::Error::other(e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscodeError;
    use xmlops_support::{ReflectError, Reflect as DeriveReflect};

    #[derive(DeriveReflect)]
    struct Address {
        city: String,
    }

    #[derive(DeriveReflect)]
    struct User {
        id: i32,
        name: String,
        address: Address,
    }

    fn ann() -> User {
        User {
            id: 1,
            name: "Ann & Co".to_string(),
            address: Address {
                city: "Oslo".to_string(),
            },
        }
    }

    #[test]
    fn test_nested_composite_is_inlined() -> Result<()> {
        let mut known = KnownTypes::new();
        let xml = to_xml_fragment(&ann(), &mut known)?;
        assert_eq!(
            xml,
            r#"<User><Id>1</Id><Name>"Ann &amp; Co"</Name><Address><City>"Oslo"</City></Address></User>"#
        );
        assert_eq!(known.len(), 2);
        Ok(())
    }

    #[derive(DeriveReflect)]
    struct Move {
        from: Address,
        to: Address,
    }

    #[test]
    fn test_colliding_members_are_rejected() {
        let mut known = KnownTypes::new();
        let value = Move {
            from: Address {
                city: "Oslo".to_string(),
            },
            to: Address {
                city: "Bergen".to_string(),
            },
        };
        assert!(matches!(
            to_xml_fragment(&value, &mut known),
            Err(TranscodeError::Reflect(ReflectError::DuplicateElement {
                type_name: "Move",
                element: "Address"
            }))
        ));
        assert!(to_xml_list_fragment::<Move>(&[], &mut known).is_err());
        assert!(known.is_empty());
    }

    #[test]
    fn test_list_wrapper() -> Result<()> {
        let mut known = KnownTypes::new();
        let xml = to_xml_list_fragment(&[ann(), ann()], &mut known)?;
        assert!(xml.starts_with("<UserList><User><Id>1</Id>"));
        assert!(xml.ends_with("</User></UserList>"));
        assert_eq!(xml.matches("<User>").count(), 2);
        Ok(())
    }

    #[test]
    fn test_empty_list_keeps_wrapper() -> Result<()> {
        let mut known = KnownTypes::new();
        let xml = to_xml_list_fragment::<User>(&[], &mut known)?;
        assert_eq!(xml, "<UserList></UserList>");
        Ok(())
    }

    #[test]
    fn test_sparse_list_skips_absent_items() -> Result<()> {
        let mut known = KnownTypes::new();
        let xml = to_xml_list_fragment_sparse(&[None, Some(ann()), None], &mut known)?;
        assert_eq!(xml.matches("<User>").count(), 1);
        Ok(())
    }
}
