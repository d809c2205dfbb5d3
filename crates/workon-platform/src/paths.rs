use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the data root when set to a non-empty path.
pub const DATA_DIR_ENV: &str = "WORKON_HOME";

/// Name of the top-level directory inside every release archive.
pub const TOOLCHAIN_DIR: &str = "go";

const APP_DIR: &str = "workon";
const CONFIGS_DIR: &str = "configs";
const INSTALLS_DIR: &str = "installs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine data directory (set $WORKON_HOME or $XDG_DATA_HOME)")]
    DataDirUnavailable,
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the data root for the current user.
    ///
    /// # Errors
    /// Returns an error when neither the override variable nor the platform
    /// data directory is available.
    pub fn new() -> Result<Self, AppPathsError> {
        if let Some(root) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            log::debug!("Using data root from ${}", DATA_DIR_ENV);
            return Ok(Self::from_root(PathBuf::from(root)));
        }

        let data_dir = dirs::data_dir().ok_or(AppPathsError::DataDirUnavailable)?;
        Ok(Self::from_root(data_dir.join(APP_DIR)))
    }

    #[must_use]
    pub fn from_root(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    #[must_use]
    pub fn configs_dir(&self) -> PathBuf {
        self.data_dir.join(CONFIGS_DIR)
    }

    #[must_use]
    pub fn environment_file(&self, name: &str) -> PathBuf {
        self.configs_dir().join(format!("{name}.json"))
    }

    #[must_use]
    pub fn installs_dir(&self) -> PathBuf {
        self.data_dir.join(INSTALLS_DIR)
    }

    #[must_use]
    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.installs_dir().join(version)
    }

    /// The `bin` directory of an installed toolchain. Its presence marks a
    /// completed install.
    #[must_use]
    pub fn installed_bin_dir(&self, version: &str) -> PathBuf {
        self.install_dir(version).join(TOOLCHAIN_DIR).join("bin")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }

    /// Ensure the data, configs and installs directories exist on disk.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.configs_dir())?;
        std::fs::create_dir_all(self.installs_dir())?;
        Ok(())
    }
}

#[must_use]
pub fn workspace_bin_dir(workspace: &Path) -> PathBuf {
    workspace.join("bin")
}

#[must_use]
pub fn workspace_src_dir(workspace: &Path) -> PathBuf {
    workspace.join("src")
}
