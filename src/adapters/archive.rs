//! Tar archive extraction for module packages.
//!
//! Packages are tar streams, gzip-compressed or plain. Entries rooted at a
//! directory named after the module have that directory stripped, so
//! `network/main.tf` lands at `<dest>/main.tf`.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, warn};

use crate::domain::AppError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extract the archive read from `reader` beneath `dest`.
///
/// Returns the number of regular files written.
pub fn unpack<R: Read>(mut reader: R, dest: &Path, module: &str) -> Result<usize, AppError> {
    let mut magic = [0u8; 2];
    let read = read_prefix(&mut reader, &mut magic).map_err(|err| archive_error(module, err))?;
    if read == 0 {
        return Err(AppError::Archive {
            module: module.to_string(),
            details: "package is empty".to_string(),
        });
    }

    let stream = Cursor::new(magic[..read].to_vec()).chain(reader);
    if magic[..read] == GZIP_MAGIC {
        unpack_tar(GzDecoder::new(stream), dest, module)
    } else {
        unpack_tar(stream, dest, module)
    }
}

/// Read until `buf` is full or the stream ends.
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

fn unpack_tar<R: Read>(reader: R, dest: &Path, module: &str) -> Result<usize, AppError> {
    let mut archive = Archive::new(reader);
    let entries = archive.entries().map_err(|err| archive_error(module, err))?;

    let mut files = 0;
    for entry in entries {
        let mut entry = entry.map_err(|err| archive_error(module, err))?;
        let raw_path = entry.path().map_err(|err| archive_error(module, err))?.into_owned();
        let relative = namespaced_path(&raw_path, module).map_err(|details| AppError::Archive {
            module: module.to_string(),
            details,
        })?;
        let Some(relative) = relative else {
            continue;
        };
        let target = dest.join(&relative);
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            fs::create_dir_all(&target).map_err(|err| AppError::filesystem(&target, err))?;
        } else if entry_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|err| AppError::filesystem(parent, err))?;
            }
            let expected = entry.size();
            entry.unpack(&target).map_err(|err| unpack_error(module, &target, err))?;
            let written = fs::metadata(&target).map_err(|err| AppError::filesystem(&target, err))?;
            if written.len() != expected {
                return Err(AppError::Archive {
                    module: module.to_string(),
                    details: format!("entry '{}' is truncated", raw_path.display()),
                });
            }
            files += 1;
        } else if entry_type.is_symlink() || entry_type.is_hard_link() {
            warn!(module, path = %raw_path.display(), "skipping link entry in package");
        } else {
            debug!(module, path = %raw_path.display(), ?entry_type, "skipping archive entry");
        }
    }
    Ok(files)
}

/// Path of an entry relative to the destination, without the module root.
///
/// `Ok(None)` for entries that name the destination itself.
fn namespaced_path(path: &Path, module: &str) -> Result<Option<PathBuf>, String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(format!("entry '{}' escapes the module directory", path.display()));
            }
        }
    }

    if parts.first().is_some_and(|first| *first == module) {
        parts.remove(0);
    }
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.iter().collect()))
}

/// Read failures mean a corrupt archive; anything else is the filesystem.
fn unpack_error(module: &str, target: &Path, err: io::Error) -> AppError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            archive_error(module, err)
        }
        _ => AppError::filesystem(target, err),
    }
}

fn archive_error(module: &str, err: io::Error) -> AppError {
    AppError::Archive { module: module.to_string(), details: err.to_string() }
}
