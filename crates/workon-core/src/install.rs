use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use workon_backend::{
    ArchiveStore, BackendError, InstallPhase, InstallProgress, ProgressSender, Version,
};
use workon_platform::{AppPaths, TOOLCHAIN_DIR};

use crate::archive::{extract_tar_gz, sha256_file};
use crate::catalog::Catalog;

const BUILD_SCRIPT: &str = "make.bash";
const BUILD_OUTPUT_TAIL_LINES: usize = 20;

/// Changes the process working directory and restores the previous one when
/// dropped.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    /// # Errors
    /// Returns an error when the current directory cannot be read or `dir`
    /// cannot be entered.
    pub fn change_to(dir: &Path) -> std::io::Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        debug!("Entered {}", dir.display());
        Ok(Self { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(error) = std::env::set_current_dir(&self.previous) {
            warn!(
                "Failed to restore working directory {}: {error}",
                self.previous.display()
            );
        }
    }
}

/// Toolchain used to compile source-only releases: the configured path, or
/// the root of the `go` found on `PATH`.
///
/// # Errors
/// Returns [`BackendError::BuildError`] when neither is available.
pub fn resolve_bootstrap(
    configured: Option<&Path>,
    version: Version,
) -> Result<PathBuf, BackendError> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    let go = which::which("go").map_err(|_| {
        BackendError::build_failed(
            version,
            "no bootstrap toolchain found; install Go or run `workon set bootstrap <path>`",
        )
    })?;
    let go = std::fs::canonicalize(&go).unwrap_or(go);
    go.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            BackendError::build_failed(
                version,
                format!("cannot derive a toolchain root from {}", go.display()),
            )
        })
}

fn output_tail(output: &[u8]) -> String {
    let text = String::from_utf8_lossy(output);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(BUILD_OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}

/// Materializes toolchains under the installs directory.
pub struct Installer<'a> {
    store: &'a dyn ArchiveStore,
    paths: &'a AppPaths,
    progress: Option<ProgressSender>,
}

impl<'a> Installer<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ArchiveStore, paths: &'a AppPaths) -> Self {
        Self {
            store,
            paths,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }

    async fn report(&self, event: InstallProgress) {
        if let Some(progress) = &self.progress {
            let _ = progress.send(event).await;
        }
    }

    #[must_use]
    pub fn is_installed(&self, version: Version) -> bool {
        self.paths.installed_bin_dir(&version.to_string()).is_dir()
    }

    /// Install `version` unless its bin directory already exists, returning
    /// that directory.
    ///
    /// Work happens in a staging directory next to the final location; only
    /// a complete tree is renamed into place.
    ///
    /// # Errors
    /// Returns an error when the version is not listed, or when the download,
    /// verification, extraction or build fails.
    pub async fn ensure_installed(
        &self,
        catalog: &Catalog,
        version: Version,
        bootstrap: Option<&Path>,
    ) -> Result<PathBuf, BackendError> {
        let display = version.to_string();
        let bin_dir = self.paths.installed_bin_dir(&display);
        if bin_dir.is_dir() {
            debug!("Go {display} already installed at {}", bin_dir.display());
            return Ok(bin_dir);
        }

        let locator = catalog
            .locator(version)
            .ok_or_else(|| BackendError::not_found(version))?;

        let installs_dir = self.paths.installs_dir();
        std::fs::create_dir_all(&installs_dir).map_err(|error| {
            BackendError::io(format!("create {}", installs_dir.display()), error)
        })?;
        let staging = tempfile::Builder::new()
            .prefix(&format!(".staging-{display}-"))
            .tempdir_in(&installs_dir)
            .map_err(|error| BackendError::io("create staging directory", error))?;
        let archive_path = staging.path().join("archive.tar.gz");
        let tree = staging.path().join("tree");

        info!("Installing Go {display} from {}", self.store.url_for(locator));
        self.report(InstallProgress::Phase(InstallPhase::Downloading))
            .await;
        self.store
            .download(locator, &archive_path, self.progress.as_ref())
            .await?;

        if let Some(checksum_locator) = catalog.checksum_locator(version) {
            self.report(InstallProgress::Phase(InstallPhase::Verifying))
                .await;
            let expected = self.store.fetch_checksum(&checksum_locator).await?;
            let actual = sha256_file(&archive_path)?;
            if actual != expected {
                return Err(BackendError::ChecksumMismatch {
                    locator: locator.to_string(),
                    expected,
                    actual,
                });
            }
            debug!("Checksum verified for {locator}");
        }

        self.report(InstallProgress::Phase(InstallPhase::Extracting))
            .await;
        extract_tar_gz(&archive_path, &tree)?;

        let toolchain_root = tree.join(TOOLCHAIN_DIR);
        if !toolchain_root.join("bin").is_dir() {
            self.report(InstallProgress::Phase(InstallPhase::Building))
                .await;
            let bootstrap = resolve_bootstrap(bootstrap, version)?;
            let final_root = self.paths.install_dir(&display).join(TOOLCHAIN_DIR);
            build_from_source(&toolchain_root, &final_root, &bootstrap, version).await?;
            if !toolchain_root.join("bin").is_dir() {
                return Err(BackendError::build_failed(
                    version,
                    "build finished without producing a bin directory",
                ));
            }
        }

        let install_dir = self.paths.install_dir(&display);
        if install_dir.exists() {
            warn!(
                "Removing incomplete install at {}",
                install_dir.display()
            );
            std::fs::remove_dir_all(&install_dir).map_err(|error| {
                BackendError::io(format!("remove {}", install_dir.display()), error)
            })?;
        }
        std::fs::rename(&tree, &install_dir).map_err(|error| {
            BackendError::io(format!("move install into {}", install_dir.display()), error)
        })?;

        info!("Installed Go {display} at {}", install_dir.display());
        self.report(InstallProgress::Complete(version)).await;
        Ok(bin_dir)
    }
}

/// Run the toolchain's own build script from `root/src`.
///
/// `final_root` is where the tree will live after the build, so the built
/// binaries locate their standard library there.
async fn build_from_source(
    root: &Path,
    final_root: &Path,
    bootstrap: &Path,
    version: Version,
) -> Result<(), BackendError> {
    let src = root.join("src");
    info!(
        "Building Go {version} in {} with bootstrap {}",
        src.display(),
        bootstrap.display()
    );

    let _guard = WorkingDirGuard::change_to(&src)
        .map_err(|error| BackendError::io(format!("enter {}", src.display()), error))?;
    let output = tokio::process::Command::new("bash")
        .arg(BUILD_SCRIPT)
        .env("GOROOT_BOOTSTRAP", bootstrap)
        .env("GOROOT_FINAL", final_root)
        .env_remove("GOROOT")
        .output()
        .await
        .map_err(|error| BackendError::build_failed(version, format!("cannot run bash: {error}")))?;

    debug!("{BUILD_SCRIPT} stdout:\n{}", output_tail(&output.stdout));
    if !output.status.success() {
        return Err(BackendError::build_failed(
            version,
            format!(
                "{BUILD_SCRIPT} exited with {}:\n{}",
                output.status,
                output_tail(&output.stderr)
            ),
        ));
    }
    Ok(())
}
