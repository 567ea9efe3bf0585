//! Persisted set of listing keys already written in earlier runs.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;

/// On-disk stand-in for the empty key, which a blank line cannot carry.
const EMPTY_KEY_LINE: &str = "<empty>";

#[derive(Debug)]
pub struct SeenIds {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl SeenIds {
    /// Reads one key per line. A missing file is an empty set.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let ids = match fs::read_to_string(&path) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| if l == EMPTY_KEY_LINE { "" } else { l })
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(source) => return Err(StorageError::ReadSeenIds { path, source }),
        };
        debug!(path = %path.display(), count = ids.len(), "loaded seen ids");
        Ok(Self { path, ids })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ids.contains(key)
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: String) -> bool {
        self.ids.insert(key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the file with the whole set, sorted.
    pub fn save(&self) -> Result<(), StorageError> {
        let err = |source: io::Error| StorageError::WriteSeenIds {
            path: self.path.clone(),
            source,
        };
        let mut body = self
            .ids
            .iter()
            .map(|k| if k.is_empty() { EMPTY_KEY_LINE } else { k.as_str() })
            .collect::<Vec<_>>()
            .join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(err)?;
        tmp.write_all(body.as_bytes()).map_err(err)?;
        tmp.persist(&self.path).map_err(|e| err(e.error))?;
        debug!(path = %self.path.display(), count = self.ids.len(), "saved seen ids");
        Ok(())
    }
}
