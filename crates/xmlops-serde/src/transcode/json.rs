//! XML fragment → JSON text.
//!
//! The walk is driven by the type descriptor, not by the document: every
//! declared field must have a matching child element. Leaf text is copied
//! into the output as it is, so leaves written by the forward path (compact
//! JSON) come out as valid JSON while hand-written string leaves come out
//! unquoted. Enum leaves whose text names a declared member are replaced by
//! the member's integer value.

use std::collections::HashMap;

use xmlops_document::{Document, NodeId};
use xmlops_support::{FieldKind, Reconstruct, TypeDescriptor};

use crate::error::{Result, TranscodeError};

/// Renders the `T` element found in `fragment` as `"Type":{...}`.
pub fn to_json_fragment<T: Reconstruct>(fragment: &str) -> Result<String> {
    json_fragment_with(fragment, T::descriptor())
}

/// Renders the element named `descriptor.name` as `"Type":{...}`.
pub fn json_fragment_with(fragment: &str, descriptor: &'static TypeDescriptor) -> Result<String> {
    descriptor.ensure_unique_elements()?;
    let document = Document::parse(fragment)?;
    let element = locate(&document, descriptor.name)?;
    let mut out = String::new();
    write_member(&document, element, descriptor, &mut out)?;
    Ok(out)
}

/// The root element if it is called `name`, otherwise its first descendant
/// with that name.
pub(crate) fn locate(document: &Document, name: &str) -> Result<NodeId> {
    let root = document.root_element().ok_or(xmlops_document::ParseError::NoRoot)?;
    if document.name(root) == Some(name) {
        return Ok(root);
    }
    document
        .descendants(root)
        .into_iter()
        .find(|id| document.name(*id) == Some(name))
        .ok_or_else(|| TranscodeError::MissingElement {
            element: name.to_string(),
            parent: document.name(root).unwrap_or_default().to_string(),
        })
}

fn write_member(
    document: &Document,
    element: NodeId,
    descriptor: &'static TypeDescriptor,
    out: &mut String,
) -> Result<()> {
    out.push('"');
    out.push_str(descriptor.name);
    out.push_str("\":");
    write_object(document, element, descriptor, out)
}

/// Writes `{...}` for `element` read as `descriptor`.
pub(crate) fn write_object(
    document: &Document,
    element: NodeId,
    descriptor: &'static TypeDescriptor,
    out: &mut String,
) -> Result<()> {
    let mut children = ChildCursor::new(document, element);

    out.push('{');
    for (index, field) in descriptor.fields.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        match field.field_kind() {
            FieldKind::Composite(nested) => {
                let nested = nested();
                let child = children.next_named(nested.name)?;
                write_member(document, child, nested, out)?;
            }
            FieldKind::Scalar(_) => {
                let child = children.next_named(field.name)?;
                write_leaf(field.name, &document.inner_text(child), out);
            }
            FieldKind::Enum(enumeration) => {
                let child = children.next_named(field.name)?;
                let text = document.inner_text(child);
                match enumeration().member_by_name(&text) {
                    Some(member) => write_leaf(field.name, &member.value.to_string(), out),
                    None => write_leaf(field.name, &text, out),
                }
            }
        }
    }
    out.push('}');
    Ok(())
}

fn write_leaf(name: &str, value: &str, out: &mut String) {
    out.push('"');
    out.push_str(name);
    out.push_str("\":");
    out.push_str(value);
}

/// Hands out child elements by name, each occurrence once, in document order.
struct ChildCursor<'a> {
    document: &'a Document,
    element: NodeId,
    taken: HashMap<&'static str, usize>,
}

impl<'a> ChildCursor<'a> {
    fn new(document: &'a Document, element: NodeId) -> Self {
        Self {
            document,
            element,
            taken: HashMap::new(),
        }
    }

    fn next_named(&mut self, name: &'static str) -> Result<NodeId> {
        let document = self.document;
        let taken = self.taken.entry(name).or_insert(0);
        let found = document
            .children(self.element)
            .iter()
            .copied()
            .filter(|id| document.name(*id) == Some(name))
            .nth(*taken);
        *taken += 1;
        found.ok_or_else(|| TranscodeError::MissingElement {
            element: name.to_string(),
            parent: document.name(self.element).unwrap_or_default().to_string(),
        })
    }
}
