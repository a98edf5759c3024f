use xmlops_document::{EditError, ParseError};
use xmlops_support::ReflectError;

/// Error types for transcoding and whole-document serialization.
#[derive(Debug)]
pub enum TranscodeError {
    /// JSON parsing or encoding error
    Json(serde_json::Error),

    /// Structural XML serialization error
    XmlSerialize(quick_xml::se::SeError),

    /// Structural XML deserialization error
    XmlDeserialize(quick_xml::de::DeError),

    /// Fragment text is not well-formed XML
    Fragment(ParseError),

    /// The element the walk expected is absent from the fragment
    MissingElement { element: String, parent: String },

    /// Type/document shape mismatch found while rebuilding a value
    Reflect(ReflectError),

    /// Editor operation failed
    Edit(EditError),

    /// IO error during serialization/deserialization
    Io(std::io::Error),

    /// A lookup value contains both quote characters, so no path literal
    /// can hold it
    UnquotableValue(String),
}

impl std::fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscodeError::Json(e) => write!(f, "JSON error: {}", e),
            TranscodeError::XmlSerialize(e) => write!(f, "XML serialization error: {}", e),
            TranscodeError::XmlDeserialize(e) => write!(f, "XML deserialization error: {}", e),
            TranscodeError::Fragment(e) => write!(f, "invalid fragment: {}", e),
            TranscodeError::MissingElement { element, parent } => {
                write!(f, "element `{}` not found in `{}`", element, parent)
            }
            TranscodeError::Reflect(e) => write!(f, "reconstruction error: {}", e),
            TranscodeError::Edit(e) => write!(f, "editor error: {}", e),
            TranscodeError::Io(e) => write!(f, "IO error: {}", e),
            TranscodeError::UnquotableValue(value) => write!(
                f,
                "value {} contains both quote characters and cannot be matched",
                value
            ),
        }
    }
}

impl std::error::Error for TranscodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranscodeError::Json(e) => Some(e),
            TranscodeError::XmlSerialize(e) => Some(e),
            TranscodeError::XmlDeserialize(e) => Some(e),
            TranscodeError::Fragment(e) => Some(e),
            TranscodeError::Reflect(e) => Some(e),
            TranscodeError::Edit(e) => Some(e),
            TranscodeError::Io(e) => Some(e),
            TranscodeError::MissingElement { .. } | TranscodeError::UnquotableValue(_) => None,
        }
    }
}

impl From<serde_json::Error> for TranscodeError {
    fn from(err: serde_json::Error) -> Self {
        TranscodeError::Json(err)
    }
}

impl From<quick_xml::se::SeError> for TranscodeError {
    fn from(err: quick_xml::se::SeError) -> Self {
        TranscodeError::XmlSerialize(err)
    }
}

impl From<quick_xml::de::DeError> for TranscodeError {
    fn from(err: quick_xml::de::DeError) -> Self {
        TranscodeError::XmlDeserialize(err)
    }
}

impl From<ParseError> for TranscodeError {
    fn from(err: ParseError) -> Self {
        TranscodeError::Fragment(err)
    }
}

impl From<ReflectError> for TranscodeError {
    fn from(err: ReflectError) -> Self {
        TranscodeError::Reflect(err)
    }
}

impl From<EditError> for TranscodeError {
    fn from(err: EditError) -> Self {
        TranscodeError::Edit(err)
    }
}

impl From<std::io::Error> for TranscodeError {
    fn from(err: std::io::Error) -> Self {
        TranscodeError::Io(err)
    }
}

/// Result type alias for transcoding operations
pub type Result<T> = std::result::Result<T, TranscodeError>;
