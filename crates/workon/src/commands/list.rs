use std::fmt::Write as _;

use workon_backend::EnvironmentRecord;
use workon_core::Catalog;
use workon_shell::ACTIVE_ENVIRONMENT;

use super::Context;
use crate::error::AppError;

fn format_environment(record: &EnvironmentRecord, active: bool, is_default: bool) -> String {
    let marker = if active { '*' } else { ' ' };
    let mut line = format!(
        "{marker} {} (Go {}) {}",
        record.name,
        record.toolchain_version,
        record.workspace.display()
    );
    if is_default {
        line.push_str(" [default]");
    }
    if record.global_bin {
        line.push_str(" [globalbin]");
    }
    for step in &record.compile_steps {
        let _ = write!(line, "\n      $ {step}");
    }
    line
}

fn active_environment() -> Option<String> {
    std::env::var(ACTIVE_ENVIRONMENT)
        .ok()
        .filter(|name| !name.is_empty())
}

pub fn list(ctx: &Context) -> Result<(), AppError> {
    let records = ctx.environments().load_all()?;
    if records.is_empty() {
        eprintln!("No environments; create one with `workon create <name> <workspace>`");
        return Ok(());
    }

    let active = active_environment();
    for record in records.values() {
        println!(
            "{}",
            format_environment(
                record,
                active.as_deref() == Some(record.name.as_str()),
                ctx.settings.is_default_environment(&record.name),
            )
        );
    }
    Ok(())
}

pub async fn available(ctx: &Context) -> Result<(), AppError> {
    let store = ctx.release_store()?;
    let catalog = Catalog::list_available(&store).await?;

    for (version, _) in catalog.entries() {
        let installed = ctx
            .paths
            .installed_bin_dir(&version.to_string())
            .is_dir();
        if installed {
            println!("{version} (installed)");
        } else {
            println!("{version}");
        }
    }
    Ok(())
}

pub fn current() {
    match active_environment() {
        Some(name) => println!("{name}"),
        None => eprintln!("No environment active"),
    }
}
