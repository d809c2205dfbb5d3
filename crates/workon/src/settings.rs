use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use workon_platform::AppPaths;

use crate::storage::{ConfigError, read_json, write_json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Toolchain used to compile source releases.
    #[serde(default, alias = "goroot")]
    pub bootstrap_toolchain: Option<PathBuf>,

    /// Environment treated as the everyday default: switching to it keeps
    /// the prompt and takes no backups.
    #[serde(default, alias = "default")]
    pub default_environment: Option<String>,

    /// Alternative base URL for the release listing and archives.
    #[serde(default)]
    pub mirror: Option<String>,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bootstrap_toolchain: None,
            default_environment: None,
            mirror: None,
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

/// A settings key accepted by `workon set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Bootstrap,
    Default,
    Mirror,
    Debug,
}

impl SettingKey {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bootstrap" | "goroot" => Some(Self::Bootstrap),
            "default" => Some(Self::Default),
            "mirror" => Some(Self::Mirror),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl AppSettings {
    pub fn load(paths: &AppPaths) -> Result<Self, ConfigError> {
        Ok(read_json(&paths.settings_file())?.unwrap_or_default())
    }

    pub fn save(&self, paths: &AppPaths) -> Result<(), ConfigError> {
        write_json(&paths.settings_file(), self)
    }

    /// Apply `value` to `key`. An empty value clears optional settings.
    pub fn set(&mut self, key: SettingKey, value: &str) {
        match key {
            SettingKey::Bootstrap => self.bootstrap_toolchain = non_empty(value).map(PathBuf::from),
            SettingKey::Default => self.default_environment = non_empty(value),
            SettingKey::Mirror => self.mirror = non_empty(value),
            SettingKey::Debug => self.debug_logging = parse_flag(value),
        }
    }

    #[must_use]
    pub fn is_default_environment(&self, name: &str) -> bool {
        self.default_environment.as_deref() == Some(name)
    }
}

/// `true`, `yes`, `on` and `1` enable a flag; anything else disables it.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}
