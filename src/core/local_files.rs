use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::output::ItemStatus;
use crate::utils::io;

/// Create-if-absent filesystem operations used by the scaffold.
///
/// None of these ever replace an existing file or directory.
pub trait FileSystem {
    fn ensure_dir(&self, dir: &Path) -> Result<ItemStatus>;
    fn write_if_absent(&self, path: &Path, content: &str) -> Result<ItemStatus>;
    fn copy_if_absent(&self, source: &Path, target: &Path) -> Result<ItemStatus>;
}

/// Local filesystem implementation
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFs {
    fn ensure_dir(&self, dir: &Path) -> Result<ItemStatus> {
        if dir.is_dir() {
            return Ok(ItemStatus::Skipped);
        }

        fs::create_dir_all(dir).map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("create directory {}", dir.display())),
            )
        })?;

        Ok(ItemStatus::Created)
    }

    fn write_if_absent(&self, path: &Path, content: &str) -> Result<ItemStatus> {
        let created = io::write_new_file(path, content, &format!("write {}", path.display()))?;
        Ok(ItemStatus::from_created(created))
    }

    fn copy_if_absent(&self, source: &Path, target: &Path) -> Result<ItemStatus> {
        if target.exists() {
            return Ok(ItemStatus::Skipped);
        }

        io::copy_with_metadata(
            source,
            target,
            &format!("copy {} to {}", source.display(), target.display()),
        )?;

        Ok(ItemStatus::Created)
    }
}

/// Convenience function to get local filesystem
pub fn local() -> LocalFs {
    LocalFs::new()
}
