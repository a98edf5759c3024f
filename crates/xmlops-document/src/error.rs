//! Error types for parsing, path evaluation and document mutation.

use thiserror::Error;

/// Errors raised while parsing document or fragment text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("`{0}` is not a valid element name")]
    InvalidName(String),

    #[error("unknown entity reference `&{0};`")]
    UnknownEntity(String),

    #[error("unexpected closing tag `</{0}>`")]
    UnexpectedEnd(String),

    #[error("unclosed element `<{0}>`")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text is not allowed outside the root element")]
    TextOutsideRoot,
}

/// Errors raised while parsing a path expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path expression is empty")]
    Empty,

    #[error("expected an element name at position {position} in `{expr}`")]
    ExpectedName { expr: String, position: usize },

    #[error("unexpected `{found}` at position {position} in `{expr}`")]
    Unexpected {
        expr: String,
        position: usize,
        found: char,
    },

    #[error("unterminated predicate in `{expr}`")]
    UnterminatedPredicate { expr: String },
}

/// Why a mutating editor operation did not take effect.
///
/// A failed operation never changes the in-memory document: mutations are
/// staged on a copy and only swapped in after the copy was persisted.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("path `{path}` does not resolve to a node")]
    Unresolved { path: String },

    #[error("`{child}` is not a child of `{parent}`")]
    NotAChild { parent: String, child: String },

    #[error("node `{path}` has no parent element")]
    NoParent { path: String },

    #[error("document already has a root element `{name}`")]
    RootExists { name: String },

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to access the backing store: {0}")]
    Io(#[from] std::io::Error),
}
