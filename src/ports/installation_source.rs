//! Backend port supplying installations and their modules.

use crate::domain::{AppError, InstalledPackage};

/// Port for looking up an installation by repository name.
pub trait InstallationSource {
    /// The installation of `repository` and the modules it requires.
    fn installation(&self, repository: &str) -> Result<InstalledPackage, AppError>;
}
