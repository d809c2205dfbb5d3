mod create;
mod list;
mod set;
mod switch;
mod update;

use std::path::PathBuf;

use log::debug;
use tokio::sync::mpsc;
use workon_backend::{ArchiveStore, InstallProgress, Version};
use workon_core::{Catalog, Installer, ReleaseStore};
use workon_platform::AppPaths;
use workon_shell::shell_hook;

use crate::cli::{Cli, Command};
use crate::environments::EnvironmentStore;
use crate::error::AppError;
use crate::logging::init_logging;
use crate::settings::AppSettings;

/// State shared by every command: resolved paths and loaded settings.
pub struct Context {
    pub paths: AppPaths,
    pub settings: AppSettings,
}

impl Context {
    pub fn load() -> Result<Self, AppError> {
        let paths = AppPaths::new()?;
        paths.ensure_dirs().map_err(|error| {
            AppError::io(
                format!("Failed to create {}", paths.data_dir.display()),
                error,
            )
        })?;
        let settings = AppSettings::load(&paths)?;
        Ok(Self { paths, settings })
    }

    pub fn environments(&self) -> EnvironmentStore<'_> {
        EnvironmentStore::new(&self.paths)
    }

    pub fn release_store(&self) -> Result<ReleaseStore, AppError> {
        Ok(ReleaseStore::new(self.settings.mirror.as_deref())?)
    }
}

pub async fn dispatch(cli: Cli) -> Result<(), AppError> {
    let mut ctx = Context::load()?;
    init_logging(
        &ctx.paths,
        cli.verbose,
        ctx.settings.debug_logging,
        ctx.settings.max_log_size_bytes,
    );
    debug!("Data root: {}", ctx.paths.data_dir.display());

    match cli.command {
        Command::Create {
            name,
            workspace,
            go_version,
        } => create::run(&ctx, &name, &workspace, go_version.as_deref()).await,
        Command::Switch { name } => switch::run(&ctx, name.as_deref()),
        Command::Update { name, go_version } => {
            update::run(&ctx, name.as_deref(), go_version.as_deref()).await
        }
        Command::Set { attribute, value } => set::run(&mut ctx, &attribute, &value),
        Command::List => list::list(&ctx),
        Command::Available => list::available(&ctx).await,
        Command::Current => {
            list::current();
            Ok(())
        }
        Command::Init { shell } => {
            print!("{}", shell_hook(shell, "workon"));
            Ok(())
        }
    }
}

fn describe_progress(event: &InstallProgress, last_percent: &mut u64) -> Option<String> {
    match event {
        InstallProgress::Phase(phase) => Some(format!("{phase}...")),
        InstallProgress::Downloading { downloaded, total } if *total > 0 => {
            let percent = downloaded * 100 / total;
            if percent >= *last_percent + 10 || (percent == 100 && *last_percent < 100) {
                *last_percent = percent;
                Some(format!("  {percent}% of {} MiB", total / (1024 * 1024)))
            } else {
                None
            }
        }
        InstallProgress::Downloading { .. } => None,
        InstallProgress::Complete(version) => Some(format!("Installed Go {version}")),
    }
}

/// Install `version` if needed, printing progress to stderr. Returns the
/// toolchain's bin directory.
async fn install(
    ctx: &Context,
    store: &dyn ArchiveStore,
    catalog: &Catalog,
    version: Version,
) -> Result<PathBuf, AppError> {
    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        let mut last_percent = 0;
        while let Some(event) = rx.recv().await {
            if let Some(line) = describe_progress(&event, &mut last_percent) {
                eprintln!("{line}");
            }
        }
    });

    let result = Installer::new(store, &ctx.paths)
        .with_progress(tx)
        .ensure_installed(
            catalog,
            version,
            ctx.settings.bootstrap_toolchain.as_deref(),
        )
        .await;
    let _ = printer.await;
    Ok(result?)
}
