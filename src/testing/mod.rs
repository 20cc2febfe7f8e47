//! Test doubles and fixtures shared by unit tests.

mod fake_package_fetcher;

pub use fake_package_fetcher::FakePackageFetcher;

use std::collections::BTreeMap;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::domain::ModuleSpec;

/// Gzip-compressed tar archive holding `files` as `(path, content)` pairs.
pub fn package_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, content.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Module with no values template and no dependencies.
pub fn module(name: &str, package_source: &str) -> ModuleSpec {
    ModuleSpec {
        name: name.to_string(),
        package_source: package_source.to_string(),
        values_template: String::new(),
        dependencies: BTreeMap::new(),
    }
}
