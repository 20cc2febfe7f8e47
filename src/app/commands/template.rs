//! Template command: render ad-hoc text against an installation's context.

use crate::domain::{AppError, Installation, TemplateRenderer, values_context};

/// Name used for the template in error messages.
const TEMPLATE_NAME: &str = "stdin";

/// Render `template` against `{ Values: <context>, License: <license> }`.
pub fn execute(
    renderer: &TemplateRenderer,
    installation: &Installation,
    template: &str,
) -> Result<String, AppError> {
    let context = values_context(installation.context_value(), installation.license.as_deref());
    Ok(renderer.render(TEMPLATE_NAME, template, &context)?)
}
