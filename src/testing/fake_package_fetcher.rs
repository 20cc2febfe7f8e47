use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, ModuleSpec};
use crate::ports::PackageFetcher;

/// Package fetcher writing a fixed `main.tf` per module.
#[derive(Default)]
pub struct FakePackageFetcher {
    failing: Option<String>,
    pub fetched: RefCell<Vec<(String, PathBuf)>>,
}

impl FakePackageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with a network error when asked for `module`.
    pub fn failing_on(module: &str) -> Self {
        Self { failing: Some(module.to_string()), ..Self::default() }
    }

    pub fn fetched_names(&self) -> Vec<String> {
        self.fetched.borrow().iter().map(|(name, _)| name.clone()).collect()
    }
}

impl PackageFetcher for FakePackageFetcher {
    fn fetch(&self, module: &ModuleSpec, dest: &Path) -> Result<(), AppError> {
        self.fetched.borrow_mut().push((module.name.clone(), dest.to_path_buf()));
        if self.failing.as_deref() == Some(module.name.as_str()) {
            return Err(AppError::Network {
                url: module.package_source.clone(),
                details: "connection refused".to_string(),
            });
        }
        fs::create_dir_all(dest).map_err(|err| AppError::filesystem(dest, err))?;
        let main = dest.join("main.tf");
        fs::write(&main, format!("# module {}\n", module.name))
            .map_err(|err| AppError::filesystem(&main, err))
    }
}
