//! Typed CRUD over a document.
//!
//! A [`Repository`] stores values of reflected types as elements under a
//! parent element and finds them again by the text of one of their members:
//!
//! ```ignore
//! let mut users = Repository::new(XmlEditor::open_or_create("users.xml", "Users")?);
//! users.add("Users", &User { id: 1, name: "Ann".into() })?;
//! let ann: Option<User> = users.query_by("Users", "Id", &1)?;
//! ```
//!
//! Member values are matched in the compact encoding the engine writes, so
//! `"Ann"` is looked up with its quotes.
//!
//! The repository owns its [`KnownTypes`]. Queries register `T` and its
//! nested types before rebuilding, because a repository reopened on an
//! existing file has not serialized anything yet. This is the one place the
//! reverse path registers types itself; the free functions in
//! [`transcode`](crate::transcode) never do.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;
use xmlops_document::{Document, FileStore, NodeEditor, XmlEditor};
use xmlops_support::{KnownTypes, Reconstruct};

use crate::error::{Result, TranscodeError};
use crate::transcode::{to_object, to_xml_fragment};

/// Typed access to the elements of one editor.
#[derive(Debug)]
pub struct Repository<E: NodeEditor> {
    editor: E,
    known: KnownTypes,
}

impl Repository<XmlEditor<FileStore>> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(XmlEditor::open(path)?))
    }

    pub fn open_or_create(path: impl Into<PathBuf>, root: &str) -> Result<Self> {
        Ok(Self::new(XmlEditor::open_or_create(path, root)?))
    }
}

impl<E: NodeEditor> Repository<E> {
    pub fn new(editor: E) -> Self {
        Self {
            editor,
            known: KnownTypes::new(),
        }
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn known_types(&self) -> &KnownTypes {
        &self.known
    }

    pub fn into_editor(self) -> E {
        self.editor
    }

    /// Appends `value` as a new element under `parent`.
    pub fn add<T: Reconstruct>(&mut self, parent: &str, value: &T) -> Result<()> {
        let fragment = to_xml_fragment(value, &mut self.known)?;
        self.editor.add_fragment(parent, &fragment)?;
        Ok(())
    }

    /// Rebuilds every `T` element directly under `parent`.
    ///
    /// Registers `T` and every type nested in it first.
    pub fn query_all<T: Reconstruct>(&mut self, parent: &str) -> Result<Vec<T>> {
        self.known.register_all::<T>();
        let type_name = T::descriptor().name;
        let fragments: Vec<String> = self
            .editor
            .query_children(parent)
            .into_iter()
            .filter(|node| node.name() == type_name)
            .map(|node| node.outer_xml())
            .collect();
        fragments
            .iter()
            .map(|fragment| to_object(fragment, &mut self.known))
            .collect()
    }

    /// Rebuilds the first `T` under `parent` whose `property` equals `value`.
    ///
    /// Registers `T` and every type nested in it first.
    pub fn query_by<T, V>(&mut self, parent: &str, property: &str, value: &V) -> Result<Option<T>>
    where
        T: Reconstruct,
        V: Serialize + ?Sized,
    {
        self.known.register_all::<T>();
        let path = member_path::<T, V>(parent, property, value)?;
        let Some(fragment) = self.editor.query_single(&path).map(|node| node.outer_xml()) else {
            debug!(%path, "No matching element");
            return Ok(None);
        };
        to_object(&fragment, &mut self.known).map(Some)
    }

    /// Replaces the content of the matching `T` element with `replacement`.
    pub fn update<T, V>(&mut self, parent: &str, property: &str, value: &V, replacement: &T) -> Result<()>
    where
        T: Reconstruct,
        V: Serialize + ?Sized,
    {
        let path = member_path::<T, V>(parent, property, value)?;
        let fragment = to_xml_fragment(replacement, &mut self.known)?;
        let document = Document::parse(&fragment)?;
        let inner = document.root().map(|root| root.inner_xml()).unwrap_or_default();
        self.editor.modify_node(&path, &inner)?;
        Ok(())
    }

    /// Removes the matching `T` element from `parent`.
    pub fn delete<T, V>(&mut self, parent: &str, property: &str, value: &V) -> Result<()>
    where
        T: Reconstruct,
        V: Serialize + ?Sized,
    {
        let path = member_path::<T, V>(parent, property, value)?;
        self.editor.delete_node(parent, &path)?;
        Ok(())
    }
}

/// `//Parent//Type[Property='encoded value']`
fn member_path<T, V>(parent: &str, property: &str, value: &V) -> Result<String>
where
    T: Reconstruct,
    V: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value)?;
    let quote = if !encoded.contains('\'') {
        '\''
    } else if !encoded.contains('"') {
        '"'
    } else {
        return Err(TranscodeError::UnquotableValue(encoded));
    };
    Ok(format!(
        "//{}//{}[{}={}{}{}]",
        parent,
        T::descriptor().name,
        property,
        quote,
        encoded,
        quote
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlops_support::Reflect as DeriveReflect;

    #[derive(DeriveReflect)]
    struct User {
        id: i32,
        name: String,
    }

    #[test]
    fn test_member_path_quotes_encoded_value() -> Result<()> {
        assert_eq!(
            member_path::<User, _>("Users", "Id", &1)?,
            "//Users//User[Id='1']"
        );
        assert_eq!(
            member_path::<User, _>("Users", "Name", "Ann")?,
            r#"//Users//User[Name='"Ann"']"#
        );
        assert!(matches!(
            member_path::<User, _>("Users", "Name", "O'Neil"),
            Err(TranscodeError::UnquotableValue(_))
        ));
        Ok(())
    }
}
