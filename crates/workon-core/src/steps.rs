use std::path::{Path, PathBuf};

use log::info;
use workon_backend::{BackendError, EnvironmentRecord};
use workon_platform::workspace_bin_dir;

/// Search path for compile steps: workspace bin, toolchain bin, then the
/// inherited `PATH`.
fn step_path(
    record: &EnvironmentRecord,
    toolchain_bin: &Path,
) -> Result<std::ffi::OsString, BackendError> {
    let mut dirs: Vec<PathBuf> = vec![
        workspace_bin_dir(&record.workspace),
        toolchain_bin.to_path_buf(),
    ];
    if let Some(inherited) = std::env::var_os("PATH") {
        dirs.extend(std::env::split_paths(&inherited));
    }
    std::env::join_paths(dirs).map_err(|error| {
        BackendError::build_failed(
            &record.toolchain_version,
            format!("invalid PATH entry: {error}"),
        )
    })
}

/// Run an environment's compile steps in its workspace, in order, with
/// `GOPATH` and `PATH` pointing at the environment. Step output goes to
/// stderr. Stops at the first failing step.
///
/// # Errors
/// Returns [`BackendError::BuildError`] naming the step that failed.
pub async fn run_compile_steps(
    record: &EnvironmentRecord,
    toolchain_bin: &Path,
) -> Result<usize, BackendError> {
    if record.compile_steps.is_empty() {
        return Ok(0);
    }
    let path = step_path(record, toolchain_bin)?;

    for step in &record.compile_steps {
        info!("[{}] running compile step: {step}", record.name);
        let status = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(step)
            .current_dir(&record.workspace)
            .env("GOPATH", &record.workspace)
            .env("PATH", &path)
            .env_remove("GOROOT")
            .stdout(std::io::stderr())
            .status()
            .await
            .map_err(|error| {
                BackendError::build_failed(
                    &record.toolchain_version,
                    format!("cannot start compile step {step:?} for {}: {error}", record.name),
                )
            })?;

        if !status.success() {
            return Err(BackendError::build_failed(
                &record.toolchain_version,
                format!("compile step {step:?} for {} exited with {status}", record.name),
            ));
        }
    }

    Ok(record.compile_steps.len())
}

#[cfg(all(test, unix))]
mod tests {
    use workon_backend::Version;

    use super::*;

    fn record_in(workspace: &Path, steps: &[&str]) -> EnvironmentRecord {
        let mut record = EnvironmentRecord::new("juju", Version::new(1, 7, 3), workspace);
        record.compile_steps = steps.iter().map(ToString::to_string).collect();
        record
    }

    #[tokio::test]
    async fn steps_run_in_workspace_with_gopath() {
        let temp = tempfile::tempdir().unwrap();
        let record = record_in(temp.path(), &[r#"printf '%s' "$GOPATH" > gopath.txt"#]);

        let ran = run_compile_steps(&record, Path::new("/nonexistent/go/bin"))
            .await
            .unwrap();

        assert_eq!(ran, 1);
        let written = std::fs::read_to_string(temp.path().join("gopath.txt")).unwrap();
        assert_eq!(written, temp.path().display().to_string());
    }

    #[tokio::test]
    async fn failing_step_stops_the_sequence() {
        let temp = tempfile::tempdir().unwrap();
        let record = record_in(temp.path(), &["exit 4", "touch after.txt"]);

        let result = run_compile_steps(&record, Path::new("/nonexistent/go/bin")).await;

        assert!(matches!(result, Err(BackendError::BuildError { .. })));
        assert!(!temp.path().join("after.txt").exists());
    }

    #[tokio::test]
    async fn no_steps_is_a_no_op() {
        let record = record_in(Path::new("/does/not/exist"), &[]);
        assert_eq!(
            run_compile_steps(&record, Path::new("/go/bin")).await.unwrap(),
            0
        );
    }
}
