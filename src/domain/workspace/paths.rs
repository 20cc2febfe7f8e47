//! Path catalog for generated workspace artifacts.
//!
//! All workspace paths are defined here. Assembly and writer code use these
//! accessors instead of ad-hoc `.join("...")` chains.

use std::path::{Path, PathBuf};

/// Directory holding every generated Terraform artifact.
pub const TERRAFORM_DIR: &str = "terraform";

/// Aggregate definition file name.
pub const AGGREGATE_FILENAME: &str = "main.tf";

/// Stale per-module values file name.
pub const VALUES_FILENAME: &str = "terraform.tfvars";

/// `<root>/terraform/`
pub fn terraform_dir(root: &Path) -> PathBuf {
    root.join(TERRAFORM_DIR)
}

/// `<root>/terraform/<module>/`
pub fn module_dir(root: &Path, module: &str) -> PathBuf {
    terraform_dir(root).join(module)
}

/// `<root>/terraform/<module>/terraform.tfvars`
pub fn values_file(root: &Path, module: &str) -> PathBuf {
    module_dir(root, module).join(VALUES_FILENAME)
}

/// `<root>/terraform/main.tf`
pub fn aggregate_file(root: &Path) -> PathBuf {
    terraform_dir(root).join(AGGREGATE_FILENAME)
}

/// Module `source` as seen from `main.tf`.
pub fn module_source(module: &str) -> String {
    format!("./{}", module)
}
