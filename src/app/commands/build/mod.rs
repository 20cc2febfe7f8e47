//! Build command: assemble an installation's modules into a workspace.

mod assembler;
mod writer;

use std::path::PathBuf;

use tracing::info;

pub use assembler::RenderedModule;

use crate::app::AppContext;
use crate::domain::{AppError, Workspace};
use crate::ports::{PackageFetcher, WorkspaceStore};

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Absolute path of the written `main.tf`.
    pub aggregate_file: PathBuf,
    /// Module names, in the order they were assembled.
    pub modules: Vec<String>,
}

/// Validate, assemble and write `workspace`.
///
/// `main.tf` is only written once every module has been assembled.
pub fn execute<S, F>(ctx: &AppContext<S, F>, workspace: &Workspace) -> Result<BuildOutcome, AppError>
where
    S: WorkspaceStore,
    F: PackageFetcher,
{
    workspace.validate(ctx.config().build.validate_dependencies)?;
    info!(
        repository = %workspace.installation().repository.name,
        modules = workspace.modules().len(),
        root = %workspace.root().display(),
        "building workspace"
    );

    let rendered = assembler::assemble(ctx, workspace)?;
    let aggregate_file = writer::write_aggregate(ctx.store(), workspace, &rendered)?;

    Ok(BuildOutcome {
        aggregate_file,
        modules: rendered.into_iter().map(|module| module.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FilesystemWorkspaceStore;
    use crate::domain::{InstalledPackage, Installation, ModuleSpec, Repository, ToolConfig};
    use crate::testing::{FakePackageFetcher, module};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn workspace(base: &Path, modules: Vec<ModuleSpec>) -> Workspace {
        let package = InstalledPackage {
            installation: Installation {
                repository: Repository { name: "airflow".to_string() },
                context: BTreeMap::new(),
                license: None,
            },
            terraform: modules,
        };
        Workspace::new(base, package).unwrap()
    }

    fn depends(mut spec: ModuleSpec, variable: &str, dependency: &str) -> ModuleSpec {
        spec.dependencies.insert(variable.to_string(), dependency.to_string());
        spec
    }

    #[test]
    fn writes_one_block_per_module() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(FilesystemWorkspaceStore::new(), FakePackageFetcher::new(), ToolConfig::default());
        let ws = workspace(
            dir.path(),
            vec![
                module("network", "https://example.com/network.tgz"),
                depends(module("cluster", "https://example.com/cluster.tgz"), "vpc_id", "network"),
            ],
        );

        let outcome = execute(&ctx, &ws).unwrap();

        assert_eq!(outcome.modules, ["network", "cluster"]);
        let content = fs::read_to_string(&outcome.aggregate_file).unwrap();
        assert!(content.starts_with("module \"network\" {"));
        assert!(content.contains("}\n\nmodule \"cluster\" {"));
        assert!(content.contains("  vpc_id = module.network\n"));
    }

    #[test]
    fn failure_leaves_existing_main_tf_untouched() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(
            FilesystemWorkspaceStore::new(),
            FakePackageFetcher::failing_on("cluster"),
            ToolConfig::default(),
        );
        let ws = workspace(
            dir.path(),
            vec![
                module("network", "https://example.com/network.tgz"),
                module("cluster", "https://example.com/cluster.tgz"),
            ],
        );
        let main_tf = ws.aggregate_file();
        fs::create_dir_all(main_tf.parent().unwrap()).unwrap();
        fs::write(&main_tf, "# previous run\n").unwrap();

        assert!(execute(&ctx, &ws).is_err());
        assert_eq!(fs::read_to_string(&main_tf).unwrap(), "# previous run\n");
    }

    #[test]
    fn unresolved_dependency_fails_before_fetching() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::new(FilesystemWorkspaceStore::new(), FakePackageFetcher::new(), ToolConfig::default());
        let ws = workspace(
            dir.path(),
            vec![depends(module("cluster", "https://example.com/cluster.tgz"), "vpc_id", "network")],
        );

        let err = execute(&ctx, &ws).unwrap_err();

        assert!(matches!(err, AppError::UnresolvedDependency { .. }));
        assert!(ctx.fetcher().fetched_names().is_empty());
    }

    #[test]
    fn dependency_check_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let mut config = ToolConfig::default();
        config.build.validate_dependencies = false;
        let ctx = AppContext::new(FilesystemWorkspaceStore::new(), FakePackageFetcher::new(), config);
        let ws = workspace(
            dir.path(),
            vec![depends(module("cluster", "https://example.com/cluster.tgz"), "vpc_id", "external")],
        );

        let outcome = execute(&ctx, &ws).unwrap();
        let content = fs::read_to_string(outcome.aggregate_file).unwrap();
        assert!(content.contains("vpc_id = module.external"));
    }
}
