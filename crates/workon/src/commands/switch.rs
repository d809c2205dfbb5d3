use std::ffi::OsString;

use workon_backend::BackendError;
use workon_shell::{Assignment, EnvSnapshot, EnvironmentSwitcher, TrackedVar};

use super::Context;
use crate::error::AppError;

fn read_by_switcher(name: &str) -> bool {
    name.starts_with("WORKON_") || TrackedVar::ALL.iter().any(|var| var.name() == name)
}

/// Snapshot the variables the switcher reads. Unrelated variables that are
/// not UTF-8 are ignored; a tracked one is an error, since rewriting it
/// would lose its value.
fn snapshot_from<I>(vars: I) -> Result<EnvSnapshot, AppError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut readable = Vec::new();
    for (name, value) in vars {
        let Ok(name) = name.into_string() else {
            continue;
        };
        if !read_by_switcher(&name) {
            continue;
        }
        match value.into_string() {
            Ok(value) => readable.push((name, value)),
            Err(_) => {
                return Err(AppError::usage(format!(
                    "${name} is not valid UTF-8; refusing to rewrite it"
                )));
            }
        }
    }
    Ok(EnvSnapshot::from_vars(readable))
}

fn render(assignments: &[Assignment]) -> String {
    assignments
        .iter()
        .map(|assignment| format!("{}\n", assignment.to_shell_line()))
        .collect()
}

/// Print the assignments that enter `name`, or that restore the original
/// shell when no name is given. Nothing is printed on error.
pub fn run(ctx: &Context, name: Option<&str>) -> Result<(), AppError> {
    let mut switcher = EnvironmentSwitcher::new(snapshot_from(std::env::vars_os())?);

    let assignments = match name {
        None => switcher.reset(),
        Some(name) => {
            let environments = ctx.environments();
            let record = environments.get(name)?;
            let version = record.version().map_err(BackendError::from)?;
            let toolchain_bin = ctx.paths.installed_bin_dir(&version.to_string());
            if !toolchain_bin.is_dir() {
                return Err(AppError::NotInstalled {
                    name: name.to_string(),
                    version: version.to_string(),
                });
            }
            let extra_bins = environments.global_bins()?;
            switcher.switch_to(
                &record,
                &toolchain_bin,
                ctx.settings.is_default_environment(name),
                &extra_bins,
            )
        }
    };

    print!("{}", render(&assignments));
    Ok(())
}
