//! Persistence targets for an editor.
//!
//! A store hands out the current document text once, at load time, and accepts
//! the full serialized document after every successful mutation.

use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Where an editor reads its document from and writes it back to.
pub trait DocumentStore {
    /// Reads the complete document text.
    fn load(&mut self) -> io::Result<String>;

    /// Replaces the stored document with `bytes`.
    fn persist(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// A document file rewritten in full on every persist.
///
/// No handle is held between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl DocumentStore for FileStore {
    fn load(&mut self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn persist(&mut self, bytes: &[u8]) -> io::Result<()> {
        debug!(path = %self.path.display(), bytes = bytes.len(), "Writing document file");
        fs::write(&self.path, bytes)
    }
}

/// Streams that can be cut to a given length after a rewrite.
pub trait Truncate {
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl Truncate for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(io::Error::other)?;
        self.get_mut().truncate(len);
        Ok(())
    }
}

impl Truncate for Cursor<&mut Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(io::Error::other)?;
        self.get_mut().truncate(len);
        Ok(())
    }
}

impl<T: Truncate + ?Sized> Truncate for &mut T {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }
}

/// A seekable byte stream used as the persistence target.
///
/// Holding the stream by value makes the editor its owner, and it is released
/// when the editor is dropped. Wrapping `&mut S` leaves ownership with the
/// caller.
#[derive(Debug)]
pub struct StreamStore<S> {
    stream: S,
}

impl<S> StreamStore<S>
where
    S: Read + Write + Seek + Truncate,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> DocumentStore for StreamStore<S>
where
    S: Read + Write + Seek + Truncate,
{
    fn load(&mut self) -> io::Result<String> {
        self.stream.seek(SeekFrom::Start(0))?;
        let mut text = String::new();
        self.stream.read_to_string(&mut text)?;
        Ok(text)
    }

    fn persist(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.seek(SeekFrom::Start(0))?;
        self.stream.write_all(bytes)?;
        self.stream.truncate(bytes.len() as u64)?;
        self.stream.flush()
    }
}
