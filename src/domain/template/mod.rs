//! Text templating over installation context values.
//!
//! Templates use the `{{ .Path.To.Value }}` dialect (pipelines, `range`,
//! `if`, sprig-style helpers such as `nindent`). The dialect is compiled to
//! a minijinja template, which does the actual evaluation.
//!
//! Missing values:
//! - a root reference absent from the context (`.Missing`) is an
//!   [`TemplateError::UnresolvedPath`];
//! - traversing through a missing key (`.Values.a.b` without `a`) fails
//!   the render;
//! - a missing leaf key (`.Values.absent`) and a null value render as an
//!   empty string.

mod dialect;
mod filters;

use minijinja::{Environment, UndefinedBehavior, escape_formatter};
use thiserror::Error;

use crate::domain::Value;

/// Key under which the whole context is exposed to compiled templates.
const ROOT_VAR: &str = "__root";

/// Template parsing or rendering failure.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Malformed template syntax.
    #[error("template '{template}': {message} near `{fragment}`")]
    Syntax { template: String, message: String, fragment: String },

    /// A root reference is absent from the context.
    #[error("template '{template}': unresolved reference `{path}`")]
    UnresolvedPath { template: String, path: String },

    /// The template calls a function that does not exist.
    #[error("template '{template}': unknown function `{function}`")]
    UnknownFunction { template: String, function: String },

    /// Evaluation failed.
    #[error("template '{template}' failed to render: {source}")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Renders dialect templates against a [`Value`] context.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_formatter(|out, state, value| {
            if value.is_undefined() || value.is_none() {
                Ok(())
            } else {
                escape_formatter(out, state, value)
            }
        });
        filters::register(&mut env);
        Self { env }
    }

    /// Render `template` against `context`.
    ///
    /// `name` identifies the template in error messages.
    pub fn render(&self, name: &str, template: &str, context: &Value) -> Result<String, TemplateError> {
        let compiled = dialect::translate(name, template)?;

        for path in &compiled.root_paths {
            let root = path.first().map(String::as_str).unwrap_or_default();
            if context.get(root).is_none() {
                return Err(TemplateError::UnresolvedPath {
                    template: name.to_string(),
                    path: format!(".{}", path.join(".")),
                });
            }
        }

        let scope = context.clone().with(ROOT_VAR, context.clone());
        self.env
            .render_named_str(name, &compiled.source, &scope)
            .map_err(|source| TemplateError::Render { template: name.to_string(), source })
    }
}

/// Context for per-installation templates: `{ Values, License }`.
pub fn values_context(values: Value, license: Option<&str>) -> Value {
    Value::mapping().with("Values", values).with("License", license.unwrap_or_default())
}
