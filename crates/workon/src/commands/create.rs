use std::path::Path;

use log::info;
use workon_backend::{BackendError, EnvironmentRecord};
use workon_core::Catalog;
use workon_platform::{workspace_bin_dir, workspace_src_dir};

use super::{Context, install};
use crate::environments::validate_name;
use crate::error::AppError;

pub async fn run(
    ctx: &Context,
    name: &str,
    workspace: &Path,
    go_version: Option<&str>,
) -> Result<(), AppError> {
    validate_name(name)?;
    let environments = ctx.environments();
    if environments.exists(name) {
        return Err(AppError::EnvironmentExists(name.to_string()));
    }
    let workspace = std::path::absolute(workspace)
        .map_err(|error| AppError::io(format!("resolve {}", workspace.display()), error))?;

    let store = ctx.release_store()?;
    let catalog = Catalog::list_available(&store).await?;
    let version = match go_version {
        Some(requested) => catalog.resolve(requested)?,
        None => catalog
            .newest()
            .ok_or_else(|| BackendError::not_found("latest"))?,
    };
    info!("Creating {name} with Go {version} at {}", workspace.display());

    install(ctx, &store, &catalog, version).await?;

    for dir in [workspace_src_dir(&workspace), workspace_bin_dir(&workspace)] {
        std::fs::create_dir_all(&dir)
            .map_err(|error| AppError::io(format!("create {}", dir.display()), error))?;
    }

    environments.save(&EnvironmentRecord::new(name, version, &workspace))?;
    println!(
        "Created {name} (Go {version}) at {}; enter it with `workon switch {name}`",
        workspace.display()
    );
    Ok(())
}
