use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the install root.
pub const SKELETON_HOME_ENV: &str = "SKELETON_HOME";

/// Base skeleton config directory (universal ~/.config/skeleton/ on all platforms)
pub fn skeleton() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("skeleton"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("skeleton"))
    }
}

/// Global skeleton.json config file path
pub fn skeleton_json() -> Result<PathBuf> {
    Ok(skeleton()?.join("skeleton.json"))
}

/// Support files shipped with the source tree.
const BUNDLED_ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Install root holding the static support files.
///
/// Order: `SKELETON_HOME`, then `skeletonDir` from skeleton.json, then the first
/// of the executable's directory, `<exe>/../share/skeleton` and the bundled
/// assets that holds every file in `support_files`. With none complete, the
/// executable's directory is returned and the copy step reports what is missing.
pub fn install_root(configured: Option<&str>, support_files: &[String]) -> Result<PathBuf> {
    if let Some(from_env) = env::var(SKELETON_HOME_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
    {
        return Ok(expand(&from_env));
    }

    if let Some(configured) = configured.filter(|v| !v.trim().is_empty()) {
        return Ok(expand(configured));
    }

    let exe_dir = executable_dir()?;
    let candidates = [
        exe_dir.clone(),
        exe_dir.join("..").join("share").join("skeleton"),
        PathBuf::from(BUNDLED_ASSETS),
    ];

    Ok(candidates
        .into_iter()
        .find(|dir| holds_all(dir, support_files))
        .unwrap_or(exe_dir))
}

fn executable_dir() -> Result<PathBuf> {
    let exe = env::current_exe().map_err(|e| {
        Error::internal_unexpected(format!("Cannot locate running executable: {}", e))
            .with_hint(format!("Set {} to the skeleton install directory", SKELETON_HOME_ENV))
    })?;

    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        Error::internal_unexpected(format!(
            "Executable path has no parent: {}",
            exe.display()
        ))
        .with_hint(format!("Set {} to the skeleton install directory", SKELETON_HOME_ENV))
    })
}

fn holds_all(dir: &Path, support_files: &[String]) -> bool {
    support_files.iter().all(|name| dir.join(name).is_file())
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}
