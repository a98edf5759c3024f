//! XML fragment → typed value.
//!
//! The fragment is first rendered to a JSON object with the same walk as
//! [`to_json_fragment`](super::to_json_fragment), then rebuilt through the
//! type's generated `from_json`. Every composite and enum type nested inside
//! the target must already be in the registry passed in.

use tracing::debug;
use xmlops_document::{Document, NodeId};
use xmlops_support::{KnownTypes, Reconstruct};

use super::json::{locate, write_object};
use crate::error::{Result, TranscodeError};
use crate::json::parse_json_value;

/// Rebuilds the `T` element found in `fragment`.
pub fn to_object<T: Reconstruct>(fragment: &str, known: &mut KnownTypes) -> Result<T> {
    let document = Document::parse(fragment)?;
    let element = locate(&document, T::descriptor().name)?;
    object_at(&document, element, known)
}

/// Rebuilds every child of the `<TypeList>` wrapper found in `fragment`.
///
/// Returns `Ok(None)` when the wrapper is missing and also when it is
/// present but has no child elements; an empty list is never returned.
/// Every child must be a `T` element.
pub fn to_object_list<T: Reconstruct>(
    fragment: &str,
    known: &mut KnownTypes,
) -> Result<Option<Vec<T>>> {
    let descriptor = T::descriptor();
    let document = Document::parse(fragment)?;
    let list_name = descriptor.list_name();
    let Ok(wrapper) = locate(&document, &list_name) else {
        debug!(list = %list_name, "No list wrapper in fragment");
        return Ok(None);
    };

    let items: Vec<NodeId> = document
        .node(wrapper)
        .element_children()
        .map(|child| child.id())
        .collect();
    if items.is_empty() {
        debug!(list = %list_name, "List wrapper has no items");
        return Ok(None);
    }

    if let Some(foreign) = items
        .iter()
        .find(|item| document.name(**item) != Some(descriptor.name))
    {
        debug!(
            list = %list_name,
            found = document.name(*foreign).unwrap_or_default(),
            "List holds a foreign element"
        );
        return Err(TranscodeError::MissingElement {
            element: descriptor.name.to_string(),
            parent: list_name,
        });
    }

    items
        .into_iter()
        .map(|item| object_at(&document, item, known))
        .collect::<Result<Vec<T>>>()
        .map(Some)
}

fn object_at<T: Reconstruct>(
    document: &Document,
    element: NodeId,
    known: &mut KnownTypes,
) -> Result<T> {
    let descriptor = T::descriptor();
    descriptor.ensure_unique_elements()?;
    known.register_type(descriptor);

    let mut json = String::new();
    write_object(document, element, descriptor, &mut json)?;
    known.ensure_nested_known(descriptor)?;

    debug!(type_name = descriptor.name, %json, "Reconstructing object");
    let value = parse_json_value(&json)?;
    Ok(T::from_json(&value)?)
}
