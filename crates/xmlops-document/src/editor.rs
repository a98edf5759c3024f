//! Path-addressed editing of one document bound to one store.
//!
//! Every mutation resolves its paths against the current tree, applies the
//! change to a copy, persists the copy and only then makes it current. A call
//! that fails at any step leaves both the in-memory tree and the store as
//! they were.

use std::io::{Read, Seek, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{EditError, ParseError};
use crate::store::{DocumentStore, FileStore, StreamStore, Truncate};
use crate::tree::{Declaration, Document, Node, NodeId, is_valid_name};

/// Declaration written into newly created documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    pub version: String,
    pub encoding: Option<String>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("gb2312".to_string()),
        }
    }
}

impl CreateOptions {
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    fn declaration(&self) -> Declaration {
        Declaration::new(self.version.clone(), self.encoding.as_deref())
    }
}

/// Query and mutation operations keyed by path expressions.
///
/// Paths use the grammar of [`crate::path`]. Queries never fail: a path that
/// does not parse or matches nothing yields `None` or an empty list.
pub trait NodeEditor {
    fn document(&self) -> &Document;

    /// First node matching `path`.
    fn query_single(&self, path: &str) -> Option<Node<'_>> {
        match self.document().select_single(path) {
            Ok(node) => node,
            Err(err) => {
                debug!(path, error = %err, "Ignoring invalid query path");
                None
            }
        }
    }

    /// Children of the first node matching `path`, materialized now.
    fn query_children(&self, path: &str) -> Vec<Node<'_>> {
        self.query_single(path)
            .map(|node| node.children())
            .unwrap_or_default()
    }

    /// Adds the root element to a document that has none.
    fn create_root(&mut self, name: &str) -> Result<(), EditError>;

    /// Appends a new element `name` with `inner_xml` as content under `parent_path`.
    fn add_node(&mut self, parent_path: &str, name: &str, inner_xml: &str) -> Result<(), EditError>;

    /// Appends `fragment` after the existing content of `parent_path`.
    fn add_fragment(&mut self, parent_path: &str, fragment: &str) -> Result<(), EditError>;

    /// Removes the node at `child_path` from the node at `parent_path`.
    fn delete_node(&mut self, parent_path: &str, child_path: &str) -> Result<(), EditError>;

    /// Replaces the content of the node at `path`.
    fn modify_node(&mut self, path: &str, inner_xml: &str) -> Result<(), EditError>;

    /// Removes the node at `path` and appends `outer_xml` to its former parent.
    ///
    /// The replacement goes after the parent's remaining children; the
    /// original position is not kept.
    fn replace_node(&mut self, path: &str, outer_xml: &str) -> Result<(), EditError>;
}

/// An editor over a [`Document`] persisted to `S`.
#[derive(Debug)]
pub struct XmlEditor<S: DocumentStore> {
    document: Document,
    store: S,
}

impl XmlEditor<FileStore> {
    /// Loads an existing document file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EditError> {
        Self::load(FileStore::new(path))
    }

    /// Loads the file if it holds a document, otherwise creates one with a
    /// `root` element and writes it out.
    pub fn open_or_create(path: impl Into<PathBuf>, root: &str) -> Result<Self, EditError> {
        let mut store = FileStore::new(path);
        if store.exists() {
            match store.load().map_err(EditError::from).and_then(|text| {
                Document::parse(&text).map_err(EditError::from)
            }) {
                Ok(document) => return Ok(Self { document, store }),
                Err(err) => {
                    warn!(path = %store.path().display(), error = %err, "Existing file is not a document, recreating");
                }
            }
        }
        Self::create_with(store, root, &CreateOptions::default())
    }

    /// Creates a new document file with a `root` element.
    pub fn create(path: impl Into<PathBuf>, root: &str) -> Result<Self, EditError> {
        Self::create_with(FileStore::new(path), root, &CreateOptions::default())
    }
}

impl<S> XmlEditor<StreamStore<S>>
where
    S: Read + Write + Seek + Truncate,
{
    /// Reads the document from the start of `stream` and keeps the stream as
    /// the persistence target.
    pub fn from_stream(stream: S) -> Result<Self, EditError> {
        Self::load(StreamStore::new(stream))
    }

    /// Hands the stream back to the caller.
    pub fn into_stream(self) -> S {
        self.store.into_inner()
    }
}

impl<S: DocumentStore> XmlEditor<S> {
    /// Parses the document currently held by `store`.
    pub fn load(mut store: S) -> Result<Self, EditError> {
        let text = store.load()?;
        let document = Document::parse(&text)?;
        debug!(root = ?document.root().map(|r| r.name()), "Loaded document");
        Ok(Self { document, store })
    }

    /// Binds an already parsed document to `store` without writing it.
    pub fn with_document(store: S, document: Document) -> Self {
        Self { document, store }
    }

    /// Writes a new document with a `root` element to `store`.
    pub fn create_with(store: S, root: &str, options: &CreateOptions) -> Result<Self, EditError> {
        let mut document = Document::new();
        document.set_declaration(options.declaration());
        let mut editor = Self { document, store };
        editor.create_root(root)?;
        info!(root, "Created document");
        Ok(editor)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Writes the current document to the store.
    pub fn save(&mut self) -> Result<(), EditError> {
        let bytes = self.document.to_xml_bytes()?;
        self.store.persist(&bytes)?;
        Ok(())
    }

    fn stage<F>(&mut self, operation: &'static str, mutate: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut Document) -> Result<(), EditError>,
    {
        let mut staged = self.document.clone();
        let result = mutate(&mut staged).and_then(|()| {
            let bytes = staged.to_xml_bytes()?;
            self.store.persist(&bytes)?;
            Ok(())
        });
        match result {
            Ok(()) => {
                self.document = staged;
                debug!(operation, "Document updated");
                Ok(())
            }
            Err(err) => {
                warn!(operation, error = %err, "Document left unchanged");
                Err(err)
            }
        }
    }
}

fn resolve(document: &Document, path: &str) -> Result<NodeId, EditError> {
    document
        .select_single(path)?
        .map(|node| node.id())
        .ok_or_else(|| EditError::Unresolved {
            path: path.to_string(),
        })
}

impl<S: DocumentStore> NodeEditor for XmlEditor<S> {
    fn document(&self) -> &Document {
        &self.document
    }

    fn create_root(&mut self, name: &str) -> Result<(), EditError> {
        if let Some(existing) = self.document.root() {
            return Err(EditError::RootExists {
                name: existing.name().to_string(),
            });
        }
        if !is_valid_name(name) {
            return Err(ParseError::InvalidName(name.to_string()).into());
        }
        self.stage("create_root", |document| {
            let root = document.create_element(name);
            let document_node = document.document_node();
            document.append_child(document_node, root);
            Ok(())
        })
    }

    fn add_node(&mut self, parent_path: &str, name: &str, inner_xml: &str) -> Result<(), EditError> {
        if !is_valid_name(name) {
            return Err(ParseError::InvalidName(name.to_string()).into());
        }
        self.stage("add_node", |document| {
            let parent = resolve(document, parent_path)?;
            let element = document.create_element(name);
            document.set_inner_xml(element, inner_xml)?;
            document.append_child(parent, element);
            Ok(())
        })
    }

    fn add_fragment(&mut self, parent_path: &str, fragment: &str) -> Result<(), EditError> {
        self.stage("add_fragment", |document| {
            let parent = resolve(document, parent_path)?;
            document.append_inner_xml(parent, fragment)?;
            Ok(())
        })
    }

    fn delete_node(&mut self, parent_path: &str, child_path: &str) -> Result<(), EditError> {
        self.stage("delete_node", |document| {
            let parent = resolve(document, parent_path)?;
            let child = resolve(document, child_path)?;
            if document.remove_child(parent, child) {
                Ok(())
            } else {
                Err(EditError::NotAChild {
                    parent: parent_path.to_string(),
                    child: child_path.to_string(),
                })
            }
        })
    }

    fn modify_node(&mut self, path: &str, inner_xml: &str) -> Result<(), EditError> {
        self.stage("modify_node", |document| {
            let node = resolve(document, path)?;
            document.set_inner_xml(node, inner_xml)?;
            Ok(())
        })
    }

    fn replace_node(&mut self, path: &str, outer_xml: &str) -> Result<(), EditError> {
        self.stage("replace_node", |document| {
            let node = resolve(document, path)?;
            let parent = document
                .parent(node)
                .filter(|parent| document.is_element(*parent))
                .ok_or_else(|| EditError::NoParent {
                    path: path.to_string(),
                })?;
            document.remove_child(parent, node);
            document.append_inner_xml(parent, outer_xml)?;
            Ok(())
        })
    }
}
