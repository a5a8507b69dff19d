//! Local filesystem backed by `tokio::fs` and `walkdir`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use crate::contract::FileSystem;

/// The real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: PathBuf) -> bool {
        tokio::fs::try_exists(&path).await.unwrap_or(false)
    }

    async fn read_bytes(&self, path: PathBuf) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&path).await
    }

    async fn list_files_recursive(&self, root: PathBuf) -> std::io::Result<Vec<PathBuf>> {
        tokio::task::spawn_blocking(move || walk(&root))
            .await
            .map_err(std::io::Error::other)?
    }
}

/// Non-directory entries below `root`, relative to it, ordered by file name
/// within each directory. Symlinks are followed.
fn walk(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        match entry.path().strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => files.push(rel.to_path_buf()),
            _ => debug!(path = %entry.path().display(), "Skipping entry outside root"),
        }
    }
    Ok(files)
}
