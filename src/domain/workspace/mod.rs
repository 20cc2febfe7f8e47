//! Workspace model: the root context of one assembly run.

pub mod paths;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::domain::identifiers::validate_module_name;
use crate::domain::{AppError, InstalledPackage, Installation, ModuleSpec};

/// Target installation, ordered modules, and the destination root.
#[derive(Debug, Clone)]
pub struct Workspace {
    installation: Installation,
    modules: Vec<ModuleSpec>,
    root: PathBuf,
}

impl Workspace {
    /// Build a workspace rooted at `<base>/<repository name>`.
    pub fn new(base: &Path, package: InstalledPackage) -> Result<Self, AppError> {
        let repo = &package.installation.repository.name;
        if !validate_module_name(repo) {
            return Err(AppError::config_error(format!(
                "Invalid repository name '{}': cannot be used as a workspace directory",
                repo
            )));
        }
        let base = std::path::absolute(base).map_err(|err| AppError::filesystem(base, err))?;
        let root = base.join(repo);

        Ok(Self { installation: package.installation, modules: package.terraform, root })
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    pub fn modules(&self) -> &[ModuleSpec] {
        &self.modules
    }

    /// Absolute workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/terraform/main.tf`
    pub fn aggregate_file(&self) -> PathBuf {
        paths::aggregate_file(&self.root)
    }

    /// Check module names and dependency references before anything is fetched.
    ///
    /// Names must be valid and unique. When `check_dependencies` is set every
    /// dependency must name a module of this workspace.
    pub fn validate(&self, check_dependencies: bool) -> Result<(), AppError> {
        let mut names = BTreeSet::new();
        for module in &self.modules {
            if !validate_module_name(&module.name) {
                return Err(AppError::InvalidModuleName(module.name.clone()));
            }
            if !names.insert(module.name.as_str()) {
                return Err(AppError::DuplicateModule(module.name.clone()));
            }
        }

        if !check_dependencies {
            return Ok(());
        }

        for module in &self.modules {
            for (variable, dependency) in &module.dependencies {
                if !names.contains(dependency.as_str()) {
                    return Err(AppError::UnresolvedDependency {
                        module: module.name.clone(),
                        variable: variable.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
