//! Installation and module specification models.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::Value;

/// Repository identity an installation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
}

/// An activated instance of a package, bound to a user's context values.
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub repository: Repository,
    /// Configuration supplied at install time.
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
    /// Opaque license credential.
    #[serde(default)]
    pub license: Option<String>,
}

impl Installation {
    /// Context as a template value.
    pub fn context_value(&self) -> Value {
        Value::Mapping(self.context.clone())
    }
}

/// One infrastructure module to materialize.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    /// Unique within a workspace.
    pub name: String,
    /// Archive location.
    #[serde(alias = "package")]
    pub package_source: String,
    /// Module configuration, expressed against the installation context.
    #[serde(default)]
    pub values_template: String,
    /// Module-local variable name -> name of the module feeding it.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

/// An installation together with the modules it requires.
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledPackage {
    #[serde(flatten)]
    pub installation: Installation,
    #[serde(default)]
    pub terraform: Vec<ModuleSpec>,
}
