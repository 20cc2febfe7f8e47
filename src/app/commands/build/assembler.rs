//! Per-module fetch, render and wrap.

use std::path::Path;

use tracing::{debug, info};

use crate::app::AppContext;
use crate::domain::workspace::paths;
use crate::domain::{AppError, ModuleSpec, TemplateRenderer, Value, Workspace, values_context};
use crate::ports::{PackageFetcher, WorkspaceStore};

/// Wrapper block emitted into `main.tf` for each module.
const MODULE_TEMPLATE: &str = r#"module "{{ .Values.name }}" {
  source = "{{ .Values.path }}"
{{ .Values.conf | nindent 2 }}
{{ range $key, $val := .Values.deps }}
  {{ $key }} = module.{{ $val }}{{ end }}
}"#;

/// Generated wrapper text for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
    pub name: String,
    pub text: String,
}

/// Assemble every module of `workspace`, in input order.
///
/// Stops at the first failure; directories of earlier modules stay on disk.
pub fn assemble<S, F>(
    ctx: &AppContext<S, F>,
    workspace: &Workspace,
) -> Result<Vec<RenderedModule>, AppError>
where
    S: WorkspaceStore,
    F: PackageFetcher,
{
    let installation = workspace.installation();
    let values = values_context(installation.context_value(), installation.license.as_deref());

    let mut rendered = Vec::with_capacity(workspace.modules().len());
    for module in workspace.modules() {
        rendered.push(assemble_module(ctx, workspace.root(), module, &values)?);
    }
    Ok(rendered)
}

fn assemble_module<S, F>(
    ctx: &AppContext<S, F>,
    root: &Path,
    module: &ModuleSpec,
    values: &Value,
) -> Result<RenderedModule, AppError>
where
    S: WorkspaceStore,
    F: PackageFetcher,
{
    let dir = paths::module_dir(root, &module.name);
    ctx.store().create_dir_all(&dir)?;
    ctx.fetcher().fetch(module, &dir)?;

    let conf = ctx.renderer().render(&module.name, &module.values_template, values)?;
    let text = render_wrapper(ctx.renderer(), module, conf.trim_end_matches('\n'))?;

    ctx.store().remove_file(&paths::values_file(root, &module.name))?;
    debug!(module = %module.name, dependencies = module.dependencies.len(), "rendered module block");
    info!(module = %module.name, dir = %dir.display(), "assembled module");

    Ok(RenderedModule { name: module.name.clone(), text })
}

fn render_wrapper(
    renderer: &TemplateRenderer,
    module: &ModuleSpec,
    conf: &str,
) -> Result<String, AppError> {
    let deps: Value =
        module.dependencies.iter().map(|(var, dep)| (var.as_str(), dep.as_str())).collect();
    let values = Value::mapping()
        .with("name", module.name.as_str())
        .with("path", paths::module_source(&module.name))
        .with("conf", conf)
        .with("deps", deps);
    let context = Value::mapping().with("Values", values);

    Ok(renderer.render("module-wrapper", MODULE_TEMPLATE, &context)?)
}
