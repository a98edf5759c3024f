//! # xmlops-document
//!
//! An in-memory XML document that is edited through path expressions and
//! written back to its file or stream after every change.
//!
//! ```no_run
//! use xmlops_document::{NodeEditor, XmlEditor};
//!
//! # fn main() -> Result<(), xmlops_document::EditError> {
//! let mut editor = XmlEditor::open_or_create("users.xml", "Users")?;
//! editor.add_node("Users", "User", "<Id>1</Id><Name>Ann</Name>")?;
//!
//! let user = editor.query_single("//Users//User[Id='1']");
//! assert_eq!(user.map(|u| u.inner_text()), Some("1Ann".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! - [`tree`]: the arena-backed [`Document`] and its [`Node`] views
//! - [`path`]: the path expression grammar and evaluator
//! - [`store`]: file and stream persistence targets
//! - [`editor`]: the [`NodeEditor`] operations and [`XmlEditor`]

pub mod editor;
pub mod error;
pub mod path;
pub mod store;
pub mod tree;

pub use editor::{CreateOptions, NodeEditor, XmlEditor};
pub use error::{EditError, ParseError, PathError};
pub use path::PathExpr;
pub use store::{DocumentStore, FileStore, StreamStore, Truncate};
pub use tree::{Declaration, Document, Node, NodeId, is_valid_name};
