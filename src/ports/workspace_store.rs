//! Filesystem operations used while assembling a workspace.
//!
//! All paths are absolute; the workspace path catalog decides where
//! artifacts live.

use std::path::Path;

use crate::domain::AppError;

/// Port for the on-disk side effects of an assembly run.
pub trait WorkspaceStore {
    /// Create a directory and all parent directories. Idempotent.
    fn create_dir_all(&self, path: &Path) -> Result<(), AppError>;

    /// Remove a file. No-op if the file does not exist.
    fn remove_file(&self, path: &Path) -> Result<(), AppError>;

    /// Replace the content of `path` so that readers observe either the old
    /// or the new content, never a partial write.
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<(), AppError>;
}
