use log::{info, warn};
use workon_backend::{ArchiveStore, BackendError, EnvironmentRecord, Version};
use workon_core::{Catalog, run_compile_steps};

use super::{Context, install};
use crate::error::AppError;

pub async fn run(
    ctx: &Context,
    name: Option<&str>,
    go_version: Option<&str>,
) -> Result<(), AppError> {
    let environments = ctx.environments();

    let (records, requested) = match (name, go_version) {
        (None, None) => {
            return Err(AppError::usage(
                "give an environment name, a --go-version line, or both",
            ));
        }
        (Some(name), requested) => (vec![environments.get(name)?], requested),
        (None, Some(line)) => {
            let line: Version = line.parse().map_err(BackendError::from)?;
            if line.has_patch() {
                return Err(AppError::usage(format!(
                    "updating every environment takes a version line such as {}",
                    line.line_key()
                )));
            }
            (on_line(environments.load_all()?.into_values(), line), go_version)
        }
    };

    if records.is_empty() {
        println!("No environments to update");
        return Ok(());
    }

    let store = ctx.release_store()?;
    let catalog = Catalog::list_available(&store).await?;
    let version = match requested {
        Some(requested) => catalog.resolve(requested)?,
        None => catalog
            .newest()
            .ok_or_else(|| BackendError::not_found("latest"))?,
    };

    update_records(ctx, &store, &catalog, version, records).await
}

fn on_line(
    records: impl Iterator<Item = EnvironmentRecord>,
    line: Version,
) -> Vec<EnvironmentRecord> {
    records
        .filter(|record| match record.version() {
            Ok(version) => version.same_line(&line),
            Err(error) => {
                warn!("Skipping {}: {error}", record.name);
                false
            }
        })
        .collect()
}

async fn update_records(
    ctx: &Context,
    store: &dyn ArchiveStore,
    catalog: &Catalog,
    version: Version,
    records: Vec<EnvironmentRecord>,
) -> Result<(), AppError> {
    let toolchain_bin = install(ctx, store, catalog, version).await?;
    let environments = ctx.environments();

    for mut record in records {
        let previous = std::mem::replace(&mut record.toolchain_version, version.to_string());
        environments.save(&record)?;
        info!("Moved {} from Go {previous} to Go {version}", record.name);
        println!("Updated {} from Go {previous} to Go {version}", record.name);

        let ran = run_compile_steps(&record, &toolchain_bin).await?;
        if ran > 0 {
            println!("Ran {ran} compile step(s) for {}", record.name);
        }
    }
    Ok(())
}
