use std::path::Path;

use crate::error::{Error, Result};

/// Owner-execute bit (`S_IXUSR`).
pub const OWNER_EXEC: u32 = 0o100;

/// Add the owner-execute bit to `path`, keeping every other permission bit.
///
/// Returns the resulting mode. On platforms without unix permissions this is a
/// no-op and returns `None`.
pub fn make_owner_executable(path: &Path) -> Result<Option<u32>> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std::fs::metadata(path).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("stat {}", path.display())))
        })?;
        let mode = metadata.permissions().mode() | OWNER_EXEC;

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("chmod {}", path.display())))
        })?;

        Ok(Some(mode))
    }

    #[cfg(not(unix))]
    {
        if !path.exists() {
            return Err(Error::internal_io(
                format!("File not found: {}", path.display()),
                Some("chmod".to_string()),
            ));
        }
        Ok(None)
    }
}

/// Render a mode as the familiar four-digit octal string.
pub fn format_mode(mode: u32) -> String {
    format!("{:04o}", mode & 0o7777)
}
