//! Whole-document serialization through `serde` and `quick_xml`.
//!
//! These entry points do not use type descriptors or the known-type
//! registry; any `Serialize`/`Deserialize` type works. The file and reader
//! variants log failures and fall back to `T::default()`, so an unreadable
//! document and an empty one look the same to the caller. The string
//! variants and [`FromXmlStream`] return errors instead.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::Result;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Writes `value` to `path`, replacing any previous content.
///
/// Failures are logged and otherwise ignored.
pub fn serialize_to_file<T: Serialize>(value: &T, path: impl AsRef<Path>) {
    let path = path.as_ref();
    if let Err(err) = write_document(value, path) {
        error!(path = %path.display(), error = %err, "Failed to serialize document");
    }
}

fn write_document<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let body = quick_xml::se::to_string(value)?;
    let mut file = File::create(path)?;
    file.write_all(DECLARATION.as_bytes())?;
    file.write_all(body.as_bytes())?;
    file.flush()?;
    debug!(path = %path.display(), "Serialized document");
    Ok(())
}

/// Renders `value` as the markup of its root element, without a declaration.
pub fn serialize_to_string<T: Serialize>(value: &T) -> Result<String> {
    let body = quick_xml::se::to_string(value)?;
    if body.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(body)
}

/// Reads a `T` from the document file at `path`.
///
/// Returns `T::default()` if the file cannot be opened or parsed.
pub fn deserialize_from_file<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> T {
    let path = path.as_ref();
    let result = File::open(path)
        .map_err(Into::into)
        .and_then(|file| read_document(file));
    match result {
        Ok(value) => value,
        Err(err) => {
            error!(path = %path.display(), error = %err, "Failed to deserialize document");
            T::default()
        }
    }
}

/// Reads a `T` from `reader`, consuming it.
///
/// Returns `T::default()` if the content cannot be parsed.
pub fn deserialize_from_reader<T, R>(reader: R) -> T
where
    T: DeserializeOwned + Default,
    R: Read,
{
    match read_document(reader) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "Failed to deserialize document");
            T::default()
        }
    }
}

/// Parses a `T` from document text.
pub fn deserialize_from_str<T: DeserializeOwned>(xml: &str) -> Result<T> {
    Ok(quick_xml::de::from_str(xml)?)
}

fn read_document<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(quick_xml::de::from_reader(BufReader::new(reader))?)
}

/// Deserializes a whole document from a seekable stream.
pub trait FromXmlStream {
    /// Rewinds to the start of the stream and parses a `T` from it.
    fn from_xml_stream<T: DeserializeOwned>(&mut self) -> Result<T>;
}

impl<S: Read + Seek> FromXmlStream for S {
    fn from_xml_stream<T: DeserializeOwned>(&mut self) -> Result<T> {
        self.seek(SeekFrom::Start(0))?;
        read_document(self)
    }
}
