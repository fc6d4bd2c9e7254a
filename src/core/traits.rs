//! Collaborator traits.
//!
//! Payload discovery sits behind [`PayloadSource`] so the send loop can run
//! against an in-memory fake as easily as against the filesystem.

use std::path::{Path, PathBuf};

use super::error::SourceError;

/// One entry reported by a [`PayloadSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path of the entry.
    pub path: PathBuf,
    /// Whether the entry is a directory. Directories are never sent.
    pub is_dir: bool,
}

impl SourceEntry {
    /// Create a file entry.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    /// Create a directory entry.
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// Something that can enumerate payloads and load their bytes.
///
/// # Requirements
///
/// - `entries` MUST return a stable order for an unchanged source
/// - `load` MUST return the bytes verbatim
pub trait PayloadSource {
    /// Enumerate entries in send order.
    fn entries(&self) -> Result<Vec<SourceEntry>, SourceError>;

    /// Read the payload at `path`.
    fn load(&self, path: &Path) -> Result<Vec<u8>, SourceError>;
}

impl<T: PayloadSource + ?Sized> PayloadSource for &T {
    fn entries(&self) -> Result<Vec<SourceEntry>, SourceError> {
        (**self).entries()
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        (**self).load(path)
    }
}
