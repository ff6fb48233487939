use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::io;

/// Root configuration structure for skeleton.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonConfig {
    /// Install root holding the support files (overridden by SKELETON_HOME).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton_dir: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via skeleton.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    #[serde(default = "default_test_dir")]
    pub test_dir: String,

    #[serde(default = "default_support_files")]
    pub support_files: Vec<String>,

    #[serde(default = "default_python_version")]
    pub python_version: String,

    #[serde(default = "default_tenant_url")]
    pub tenant_url: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            test_dir: default_test_dir(),
            support_files: default_support_files(),
            python_version: default_python_version(),
            tenant_url: default_tenant_url(),
        }
    }
}

impl Defaults {
    /// Names that become path segments must be a single plain file name.
    pub fn validate(&self) -> Result<()> {
        ensure_file_name("testDir", &self.test_dir)?;
        for file in &self.support_files {
            ensure_file_name("supportFiles", file)?;
        }
        Ok(())
    }
}

fn ensure_file_name(key: &str, value: &str) -> Result<()> {
    let mut components = Path::new(value).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if single_normal {
        return Ok(());
    }

    Err(Error::config_invalid_value(
        key,
        Some(value.to_string()),
        "must be a single file or directory name",
    ))
}

fn default_test_dir() -> String {
    "test".to_string()
}

fn default_support_files() -> Vec<String> {
    vec!["test_runner.py".to_string(), "requirements.txt".to_string()]
}

fn default_python_version() -> String {
    "2.7".to_string()
}

fn default_tenant_url() -> String {
    "https://express.qubell.com".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load the full skeleton.json config, falling back to defaults on any error.
pub fn load_config() -> SkeletonConfig {
    match load_config_from_file() {
        Ok(Some(config)) => config,
        Ok(None) => SkeletonConfig::default(),
        Err(err) => {
            log_status!("config", "Ignoring skeleton.json: {}", err.detail());
            SkeletonConfig::default()
        }
    }
}

/// Attempt to load config from skeleton.json file. `None` when it does not exist.
fn load_config_from_file() -> Result<Option<SkeletonConfig>> {
    let path = paths::skeleton_json()?;

    if !path.exists() {
        return Ok(None);
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    parse_config(&content, &path.to_string_lossy()).map(Some)
}

pub fn parse_config(content: &str, source: &str) -> Result<SkeletonConfig> {
    serde_json::from_str(content).map_err(|e| Error::config_invalid_json(source, e))
}
