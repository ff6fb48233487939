//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs::{self, File, FileTimes};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Read file contents with standardized error handling.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Create `path` with `content` unless something already occupies it.
///
/// Uses exclusive create, so the existence check and the write are a single
/// filesystem operation. Returns `false` when the path was already taken.
pub fn write_new_file(path: &Path, content: &str, operation: &str) -> Result<bool> {
    let mut file = match File::options().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::internal_io(e.to_string(), Some(operation.to_string()))),
    };

    fill_new_file(&mut file, path, content, operation)?;
    Ok(true)
}

/// Write `content` into a freshly created file, removing it again on failure.
/// A partial file would be skipped as existing on every later run.
fn fill_new_file<W: Write>(
    writer: &mut W,
    path: &Path,
    content: &str,
    operation: &str,
) -> Result<()> {
    writer
        .write_all(content.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            Error::internal_io(e.to_string(), Some(operation.to_string()))
        })
}

/// Copy `source` to `target` keeping permission bits and access/modification times.
///
/// The caller is responsible for the existence check on `target`.
pub fn copy_with_metadata(source: &Path, target: &Path, operation: &str) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (stat source)", operation)))
    })?;

    // fs::copy carries the permission bits over
    fs::copy(source, target)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} (copy)", operation))))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    #[cfg(unix)]
    let file = File::open(target);
    #[cfg(not(unix))]
    let file = File::options().write(true).open(target);

    file.and_then(|file| file.set_times(times)).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (set times)", operation)))
    })
}
