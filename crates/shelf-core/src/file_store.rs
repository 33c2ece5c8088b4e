//! Whole-catalog JSON file store

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use shelf_domain::{normalize_all, Book, RawBook};
use tempfile::NamedTempFile;

use crate::error::FileStoreError;
use crate::notice::Notices;

pub type FileStoreResult<T> = std::result::Result<T, FileStoreError>;

/// Default library file, relative to the working directory.
pub const DEFAULT_LIBRARY_FILE: &str = "library.json";

/// Reads and rewrites the entire catalog as one JSON array.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw documents on disk. A missing file is an empty catalog.
    pub fn read(&self) -> FileStoreResult<Vec<RawBook>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(FileStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| FileStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file contents with `books`.
    ///
    /// Writes to a sibling temp file and renames it over the target, so a
    /// reader sees either the old catalog or the new one.
    pub fn write(&self, books: &[Book]) -> FileStoreResult<()> {
        let encoded = encode(books)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(&encoded)
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        tracing::debug!(path = %self.path.display(), books = books.len(), "library file written");
        Ok(())
    }

    /// Load and normalize the catalog.
    ///
    /// A corrupt or unreadable file is reported and treated as an empty
    /// catalog; it is not repaired.
    pub fn load(&self, notices: &mut Notices) -> Vec<Book> {
        match self.read() {
            Ok(raws) => normalize_all(raws),
            Err(err) => {
                notices.error(format!(
                    "Error loading library file ({err}). Starting with an empty library."
                ));
                Vec::new()
            }
        }
    }

    /// Persist the catalog, reporting failure as a notice.
    pub fn save(&self, books: &[Book], notices: &mut Notices) -> bool {
        match self.write(books) {
            Ok(()) => true,
            Err(err) => {
                notices.error(format!("Error saving library file: {err}"));
                false
            }
        }
    }

    fn io_error(&self, source: std::io::Error) -> FileStoreError {
        FileStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_FILE)
    }
}

/// Pretty JSON with four-space indentation.
fn encode(books: &[Book]) -> FileStoreResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    books
        .serialize(&mut serializer)
        .map_err(FileStoreError::Encode)?;
    Ok(out)
}
