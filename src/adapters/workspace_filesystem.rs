use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::AppError;
use crate::ports::WorkspaceStore;

/// Filesystem-based workspace store implementation.
#[derive(Debug, Clone, Default)]
pub struct FilesystemWorkspaceStore;

impl FilesystemWorkspaceStore {
    pub fn new() -> Self {
        Self
    }
}

impl WorkspaceStore for FilesystemWorkspaceStore {
    fn create_dir_all(&self, path: &Path) -> Result<(), AppError> {
        fs::create_dir_all(path).map_err(|err| AppError::filesystem(path, err))
    }

    fn remove_file(&self, path: &Path) -> Result<(), AppError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::filesystem(path, err)),
        }
    }

    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<(), AppError> {
        let parent = path.parent().ok_or_else(|| {
            AppError::config_error(format!("Path has no parent directory: {}", path.display()))
        })?;
        self.create_dir_all(parent)?;

        // The temp file must share the target's filesystem for the rename to be atomic.
        let mut file =
            NamedTempFile::new_in(parent).map_err(|err| AppError::filesystem(parent, err))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|err| AppError::filesystem(file.path(), err))?;
        file.persist(path).map_err(|err| AppError::filesystem(path, err.error))?;
        Ok(())
    }
}
