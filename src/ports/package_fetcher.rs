//! Package retrieval port.

use std::path::Path;

use crate::domain::{AppError, ModuleSpec};

/// Port for populating a module directory from its packaged archive.
pub trait PackageFetcher {
    /// Retrieve `module.package_source` and extract it beneath `dest`.
    ///
    /// `dest` exists when this is called. Implementations must not clean up
    /// partially extracted files on failure.
    fn fetch(&self, module: &ModuleSpec, dest: &Path) -> Result<(), AppError>;
}
