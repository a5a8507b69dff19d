//! Files staged for publishing.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::publish::PublishError;

/// One file to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Where the file is read from.
    pub source_path: PathBuf,
    /// Path below the destination prefix, `/`-separated. Also the string that
    /// exclusion and property patterns are matched against.
    pub relative_path: String,
}

impl FileEntry {
    pub fn new(source_path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            relative_path: relative_path.into(),
        }
    }
}

/// Insertion-ordered list of entries. Duplicates are kept.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    entries: Vec<FileEntry>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single file under its base name.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&FileEntry, PublishError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .ok_or_else(|| PublishError::InvalidPath(path.to_path_buf()))?
            .to_string_lossy()
            .into_owned();
        debug!(path = %path.display(), relative_path = %name, "Registered file");
        self.entries.push(FileEntry::new(path, name));
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Register files found under `root`, given their paths relative to it.
    /// Returns the number of entries added.
    pub fn add_listing(&mut self, root: &Path, relative_paths: Vec<PathBuf>) -> usize {
        let before = self.entries.len();
        for rel in relative_paths {
            let relative_path = to_key_path(&rel);
            if relative_path.is_empty() {
                continue;
            }
            self.entries.push(FileEntry::new(root.join(&rel), relative_path));
        }
        let added = self.entries.len() - before;
        info!(root = %root.display(), added, "Registered directory");
        added
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `/`-joined normal components of a relative path.
fn to_key_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
