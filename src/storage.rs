use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Which class of writable location a recording lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryKind {
    /// Ephemeral, may be reclaimed by the host
    #[default]
    Cache,
    /// Private to the application, persists until deleted
    Private,
}

/// Storage path provider
///
/// Supplies writable directories for recording artifacts and deletes files
/// on request. Implementations must not call back into the controller.
pub trait StorageProvider: Send + Sync {
    /// Resolve (and create if missing) the directory for `kind`
    fn writable_directory(&self, kind: DirectoryKind) -> Result<PathBuf>;

    /// Check whether `path` exists
    fn exists(&self, path: &Path) -> bool;

    /// Delete the file at `path`
    fn delete_file(&self, path: &Path) -> Result<()>;
}

/// Local filesystem storage rooted at two directories
#[derive(Debug, Clone)]
pub struct FsStorage {
    cache_root: PathBuf,
    private_root: PathBuf,
}

impl FsStorage {
    pub fn new(cache_root: impl Into<PathBuf>, private_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            private_root: private_root.into(),
        }
    }

    /// Build from config paths, expanding a leading `~`
    pub fn from_config(cache_dir: &str, private_dir: &str) -> Self {
        let cache_root = shellexpand::tilde(cache_dir);
        let private_root = shellexpand::tilde(private_dir);
        Self::new(
            PathBuf::from(cache_root.as_ref()),
            PathBuf::from(private_root.as_ref()),
        )
    }

    pub fn root(&self, kind: DirectoryKind) -> &Path {
        match kind {
            DirectoryKind::Cache => &self.cache_root,
            DirectoryKind::Private => &self.private_root,
        }
    }
}

impl StorageProvider for FsStorage {
    fn writable_directory(&self, kind: DirectoryKind) -> Result<PathBuf> {
        let dir = self.root(kind);
        if !dir.exists() {
            info!("Creating {:?} recordings directory: {}", kind, dir.display());
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create recordings directory {}", dir.display())
            })?;
        }
        Ok(dir.to_path_buf())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))
    }
}
