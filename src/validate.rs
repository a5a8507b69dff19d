//! Per-file checks run right before upload.

use tracing::{debug, warn};

use crate::contract::FileSystem;
use crate::pattern::PatternSet;
use crate::registry::FileEntry;

/// Outcome of validating one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// Source file no longer exists.
    Missing,
    /// Relative path matched the contained exclusion pattern.
    Excluded(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// Existence is checked first, then exclusion.
pub async fn validate<F>(entry: &FileEntry, fs: &F, exclude: &PatternSet) -> Validation
where
    F: FileSystem + ?Sized,
{
    if !fs.exists(entry.source_path.clone()).await {
        warn!(path = %entry.source_path.display(), "File not found. Skipped");
        return Validation::Missing;
    }

    if let Some(pattern) = exclude.first_match(&entry.relative_path) {
        debug!(relative_path = %entry.relative_path, pattern, "File excluded. Skipped");
        return Validation::Excluded(pattern.to_string());
    }

    Validation::Valid
}

/// Boolean form of [`validate`].
pub async fn is_valid<F>(entry: &FileEntry, fs: &F, exclude: &PatternSet) -> bool
where
    F: FileSystem + ?Sized,
{
    validate(entry, fs, exclude).await.is_valid()
}
