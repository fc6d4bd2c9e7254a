//! Filesystem payload source.
//!
//! The source path may be a single file, a directory, or a directory followed
//! by a wildcard file pattern (`in/*.hl7`). Directory listings are sorted by
//! name so repeated runs send in the same order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{PayloadSource, SourceEntry, SourceError};

/// Enumerates payload files on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsPayloadSource {
    root: PathBuf,
    recursive: bool,
}

impl FsPayloadSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            root: root.into(),
            recursive,
        }
    }

    /// Root path as given.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Split `root` into a directory and file pattern if its last component
    /// has wildcards.
    fn pattern(&self) -> Option<(PathBuf, String)> {
        let name = self.root.file_name()?.to_str()?;
        if !name.contains(['*', '?']) {
            return None;
        }
        let dir = match self.root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Some((dir, name.to_string()))
    }
}

impl PayloadSource for FsPayloadSource {
    fn entries(&self) -> Result<Vec<SourceEntry>, SourceError> {
        let mut entries = Vec::new();

        if let Some((dir, pattern)) = self.pattern() {
            if !dir.is_dir() {
                return Err(SourceError::NotFound(dir));
            }
            walk(&dir, self.recursive, Some(&pattern), &mut entries)?;
            if entries.iter().all(|e| e.is_dir) {
                return Err(SourceError::NoMatch(self.root.clone()));
            }
            return Ok(entries);
        }

        let meta = fs::metadata(&self.root).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(self.root.clone()),
            _ => SourceError::Io {
                path: self.root.clone(),
                source,
            },
        })?;

        if meta.is_dir() {
            walk(&self.root, self.recursive, None, &mut entries)?;
        } else {
            entries.push(SourceEntry::file(&self.root));
        }

        debug!(root = %self.root.display(), count = entries.len(), "payloads enumerated");
        Ok(entries)
    }

    fn load(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
            _ => SourceError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

fn walk(
    dir: &Path,
    recursive: bool,
    pattern: Option<&str>,
    out: &mut Vec<SourceEntry>,
) -> Result<(), SourceError> {
    let io_err = |source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut children = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    children.sort();

    for path in children {
        if path.is_dir() {
            out.push(SourceEntry::dir(&path));
            if recursive {
                walk(&path, recursive, pattern, out)?;
            }
            continue;
        }

        let matched = match (pattern, path.file_name().and_then(|n| n.to_str())) {
            (None, _) => true,
            (Some(pattern), Some(name)) => wildcard_match(pattern, name),
            (Some(_), None) => false,
        };
        if matched {
            out.push(SourceEntry::file(path));
        }
    }

    Ok(())
}

/// Match `name` against a pattern where `*` is any run and `?` any one char.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                Some((sp, sn)) => {
                    p = sp + 1;
                    n = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
