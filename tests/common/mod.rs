//! Shared testing utilities for tfmart tests.

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Testing harness providing an isolated environment for CLI exercises.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    work_dir: PathBuf,
    original_cwd: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    /// Create a new isolated environment.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        let original_cwd = env::current_dir().expect("Failed to get current directory");

        Self { root, work_dir, original_cwd }
    }

    /// Path to the directory used for CLI invocations.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build a command for invoking the compiled `tfmart` binary within the work directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("tfmart").expect("Failed to locate tfmart binary");
        cmd.current_dir(self.work_dir()).env_remove("RUST_LOG").env_remove("TFMART_LOG");
        cmd
    }

    /// Write `tfmart.yml` into the work directory.
    pub fn write_manifest(&self, content: &str) -> PathBuf {
        let path = self.work_dir.join("tfmart.yml");
        fs::write(&path, content).expect("Failed to write manifest");
        path
    }

    /// Write a file relative to the work directory, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.work_dir.join(relative);
        fs::create_dir_all(path.parent().expect("relative path has a parent"))
            .expect("Failed to create parent directory");
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Workspace root of `repository` under the work directory.
    pub fn workspace_root(&self, repository: &str) -> PathBuf {
        self.work_dir.join(repository)
    }

    /// Content of the aggregate file of `repository`.
    pub fn read_main_tf(&self, repository: &str) -> String {
        fs::read_to_string(self.workspace_root(repository).join("terraform/main.tf"))
            .expect("main.tf should exist")
    }

    /// Execute a closure with the current directory set to the work directory.
    pub fn with_work_dir<F, R>(&self, action: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::current_dir().expect("Failed to capture current dir");
        env::set_current_dir(&self.work_dir).expect("Failed to switch current dir");
        let result = action();
        env::set_current_dir(original).expect("Failed to restore current dir");
        result
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.original_cwd);
    }
}

/// Gzip-compressed tar archive holding `files` as `(path, content)` pairs.
#[allow(dead_code)]
pub fn package_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, content.as_bytes()).expect("append entry");
    }
    builder.into_inner().expect("finish tar").finish().expect("finish gzip")
}

/// Serve a package for `module` at `/<module>.tgz`.
///
/// Returns the package URL and the mock, which must be kept alive.
#[allow(dead_code)]
pub fn serve_package(server: &mut mockito::Server, module: &str) -> (String, mockito::Mock) {
    let body = package_archive(&[
        (format!("{module}/main.tf").as_str(), "resource \"null_resource\" \"this\" {}\n"),
        (format!("{module}/variables.tf").as_str(), "variable \"cidr\" {\n  default = \"\"\n}\n"),
    ]);
    let mock = server
        .mock("GET", format!("/{module}.tgz").as_str())
        .with_status(200)
        .with_body(body)
        .create();
    (format!("{}/{module}.tgz", server.url()), mock)
}
