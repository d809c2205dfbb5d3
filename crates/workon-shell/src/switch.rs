use std::path::{Path, PathBuf};

use workon_backend::EnvironmentRecord;
use workon_platform::{workspace_bin_dir, workspace_src_dir};

use crate::path_list::{SEPARATOR, insert_front};
use crate::snapshot::{ACTIVE_ENVIRONMENT, Assignment, BACKUP_CHAIN, EnvSnapshot, TrackedVar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchState {
    Default,
    InEnvironment(String),
}

/// Computes the variable assignments that enter or leave an environment.
///
/// The switcher never touches the process environment. It works on an
/// [`EnvSnapshot`] and folds its own output back into it, so a sequence of
/// calls behaves as if each result had been evaluated by the shell.
#[derive(Debug, Clone)]
pub struct EnvironmentSwitcher {
    snapshot: EnvSnapshot,
}

impl EnvironmentSwitcher {
    #[must_use]
    pub fn new(snapshot: EnvSnapshot) -> Self {
        Self { snapshot }
    }

    #[must_use]
    pub fn snapshot(&self) -> &EnvSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn state(&self) -> SwitchState {
        match self.snapshot.active_environment() {
            Some(name) => SwitchState::InEnvironment(name.to_string()),
            None => SwitchState::Default,
        }
    }

    pub fn switch_to(
        &mut self,
        record: &EnvironmentRecord,
        toolchain_bin: &Path,
        is_default: bool,
        extra_bins: &[PathBuf],
    ) -> Vec<Assignment> {
        let mut out = Vec::new();
        let cdpath_was_backed_up = self.snapshot.backup().is_populated(TrackedVar::Cdpath);

        if !is_default {
            for var in TrackedVar::ALL {
                let current = self.snapshot.current(var).to_string();
                if self.snapshot.backup_mut().capture_if_empty(var, &current) {
                    out.push(Assignment::new(var.backup_name(), current));
                }
            }
            if !self.snapshot.chain_open() {
                out.push(Assignment::new(BACKUP_CHAIN, "1"));
            }
        }

        out.push(Assignment::new(
            TrackedVar::Gopath.name(),
            record.workspace.display().to_string(),
        ));

        let mut front = vec![
            workspace_bin_dir(&record.workspace).display().to_string(),
            toolchain_bin.display().to_string(),
        ];
        front.extend(extra_bins.iter().map(|dir| dir.display().to_string()));
        out.push(Assignment::new(
            TrackedVar::Path.name(),
            insert_front(self.snapshot.current(TrackedVar::Path), &front),
        ));

        let src = workspace_src_dir(&record.workspace).display().to_string();
        let current_cdpath = self.snapshot.current(TrackedVar::Cdpath);
        let cdpath = if !current_cdpath.is_empty() && !cdpath_was_backed_up {
            let mut members: Vec<&str> = current_cdpath
                .split(SEPARATOR)
                .filter(|member| *member != src)
                .collect();
            members.push(&src);
            members.join(&SEPARATOR.to_string())
        } else {
            src
        };
        out.push(Assignment::new(TrackedVar::Cdpath.name(), cdpath));

        if !is_default {
            let base_prompt = self
                .snapshot
                .backup()
                .get(TrackedVar::Prompt)
                .unwrap_or_else(|| self.snapshot.current(TrackedVar::Prompt));
            out.push(Assignment::new(
                TrackedVar::Prompt.name(),
                format!("{base_prompt}({})$ ", record.name),
            ));
        }
        out.push(Assignment::new(ACTIVE_ENVIRONMENT, record.name.clone()));

        log::debug!(
            "Switching to {} (default: {is_default}) emits {} assignments",
            record.name,
            out.len()
        );
        self.snapshot.apply(&out);
        out
    }

    /// Clear every backup slot and restore the search path, workspace path
    /// and prompt from the slots that were populated.
    pub fn reset(&mut self) -> Vec<Assignment> {
        let mut out = Vec::new();
        let mut restored = Vec::new();

        for var in TrackedVar::ALL {
            let previous = self.snapshot.backup_mut().clear(var);
            out.push(Assignment::clear(var.backup_name()));
            if let Some(value) = previous.filter(|_| var != TrackedVar::Cdpath) {
                restored.push(Assignment::new(var.name(), value));
            }
        }
        out.push(Assignment::clear(BACKUP_CHAIN));
        out.push(Assignment::clear(ACTIVE_ENVIRONMENT));
        out.extend(restored);

        self.snapshot.apply(&out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, workspace: &str) -> EnvironmentRecord {
        EnvironmentRecord::new(name, workon_backend::Version::new(1, 7, 3), workspace)
    }

    fn value<'a>(out: &'a [Assignment], name: &str) -> Option<&'a str> {
        out.iter()
            .rev()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    fn shell() -> EnvSnapshot {
        EnvSnapshot::from_vars([
            ("PATH", "/usr/bin:/bin"),
            ("GOPATH", "/home/me/go"),
            ("PS1", "$ "),
            ("CDPATH", ""),
        ])
    }

    #[test]
    fn switch_sets_workspace_path_and_prompt() {
        let mut switcher = EnvironmentSwitcher::new(shell());

        let out = switcher.switch_to(
            &record("juju", "/ws/juju"),
            Path::new("/data/installs/1.7.3/go/bin"),
            false,
            &[],
        );

        assert_eq!(value(&out, "GOPATH"), Some("/ws/juju"));
        assert_eq!(
            value(&out, "PATH"),
            Some("/ws/juju/bin:/data/installs/1.7.3/go/bin:/usr/bin:/bin")
        );
        assert_eq!(value(&out, "CDPATH"), Some("/ws/juju/src"));
        assert_eq!(value(&out, "PS1"), Some("$ (juju)$ "));
        assert_eq!(value(&out, "WORKON_PREVIOUS_PATH"), Some("/usr/bin:/bin"));
        assert_eq!(value(&out, "WORKON_PREVIOUS_CDPATH"), Some(""));
        assert_eq!(value(&out, "WORKON_BACKED_UP"), Some("1"));
        assert_eq!(switcher.state(), SwitchState::InEnvironment("juju".into()));
    }

    #[test]
    fn extra_bins_follow_toolchain_bin() {
        let mut switcher = EnvironmentSwitcher::new(shell());

        let out = switcher.switch_to(
            &record("juju", "/ws/juju"),
            Path::new("/go/bin"),
            false,
            &[PathBuf::from("/ws/tools/bin")],
        );

        assert_eq!(
            value(&out, "PATH"),
            Some("/ws/juju/bin:/go/bin:/ws/tools/bin:/usr/bin:/bin")
        );
    }

    #[test]
    fn second_switch_keeps_original_backups() {
        let mut switcher = EnvironmentSwitcher::new(shell());

        switcher.switch_to(&record("juju", "/ws/juju"), Path::new("/go17/bin"), false, &[]);
        let kiwi = record("kiwi", "/ws/kiwi");
        let out = switcher.switch_to(&kiwi, Path::new("/go18/bin"), false, &[]);

        assert!(out.iter().all(|a| !a.name.starts_with("WORKON_PREVIOUS_")));
        assert_eq!(value(&out, "PS1"), Some("$ (kiwi)$ "));
        assert_eq!(
            switcher.snapshot().backup().get(TrackedVar::Path),
            Some("/usr/bin:/bin")
        );
        assert_eq!(
            switcher.snapshot().backup().get(TrackedVar::Prompt),
            Some("$ ")
        );
    }

    #[test]
    fn reset_after_two_switches_restores_original_values() {
        let mut switcher = EnvironmentSwitcher::new(shell());
        switcher.switch_to(&record("juju", "/ws/juju"), Path::new("/go17/bin"), false, &[]);
        switcher.switch_to(&record("kiwi", "/ws/kiwi"), Path::new("/go18/bin"), false, &[]);

        let out = switcher.reset();

        assert_eq!(value(&out, "PATH"), Some("/usr/bin:/bin"));
        assert_eq!(value(&out, "GOPATH"), Some("/home/me/go"));
        assert_eq!(value(&out, "PS1"), Some("$ "));
        assert_eq!(value(&out, "CDPATH"), None);
        for var in TrackedVar::ALL {
            assert_eq!(value(&out, var.backup_name()), Some(""));
        }
        assert!(switcher.snapshot().backup().is_empty());
        assert_eq!(switcher.state(), SwitchState::Default);
    }

    #[test]
    fn reset_without_backups_only_clears() {
        let mut switcher = EnvironmentSwitcher::new(shell());

        let out = switcher.reset();

        assert!(out.iter().all(|a| a.value.is_empty()));
        assert_eq!(value(&out, "PATH"), None);
        assert_eq!(value(&out, "WORKON_ENVIRONMENT"), Some(""));
    }

    #[test]
    fn default_target_skips_backups_and_prompt() {
        let mut switcher = EnvironmentSwitcher::new(shell());

        let out = switcher.switch_to(&record("main", "/ws/main"), Path::new("/go/bin"), true, &[]);

        assert!(out.iter().all(|a| !a.name.starts_with("WORKON_PREVIOUS_")));
        assert_eq!(value(&out, "WORKON_BACKED_UP"), None);
        assert_eq!(value(&out, "PS1"), None);
        assert_eq!(value(&out, "GOPATH"), Some("/ws/main"));
        assert!(switcher.snapshot().backup().is_empty());
        assert_eq!(switcher.state(), SwitchState::InEnvironment("main".into()));
    }

    #[test]
    fn default_target_after_environment_becomes_active() {
        let mut switcher = EnvironmentSwitcher::new(shell());
        switcher.switch_to(&record("juju", "/ws/juju"), Path::new("/go17/bin"), false, &[]);

        let main = record("main", "/ws/main");
        let out = switcher.switch_to(&main, Path::new("/go18/bin"), true, &[]);

        assert_eq!(value(&out, "WORKON_ENVIRONMENT"), Some("main"));
        assert_eq!(value(&out, "GOPATH"), Some("/ws/main"));
        assert_eq!(switcher.state(), SwitchState::InEnvironment("main".into()));
        assert!(switcher.snapshot().chain_open());
        assert_eq!(
            switcher.snapshot().backup().get(TrackedVar::Path),
            Some("/usr/bin:/bin")
        );

        let out = switcher.reset();
        assert_eq!(value(&out, "GOPATH"), Some("/home/me/go"));
        assert_eq!(value(&out, "PS1"), Some("$ "));
        assert_eq!(switcher.state(), SwitchState::Default);
    }

    #[test]
    fn existing_cdpath_is_kept_on_first_switch() {
        let snapshot = EnvSnapshot::from_vars([("PATH", "/bin"), ("CDPATH", ".:/projects")]);
        let mut switcher = EnvironmentSwitcher::new(snapshot);

        let out = switcher.switch_to(&record("juju", "/ws/juju"), Path::new("/go/bin"), false, &[]);

        assert_eq!(value(&out, "CDPATH"), Some(".:/projects:/ws/juju/src"));

        let out = switcher.switch_to(&record("kiwi", "/ws/kiwi"), Path::new("/go/bin"), false, &[]);
        assert_eq!(value(&out, "CDPATH"), Some("/ws/kiwi/src"));
    }

    #[test]
    fn switch_reads_backups_left_by_a_previous_invocation() {
        let snapshot = EnvSnapshot::from_vars([
            ("PATH", "/ws/juju/bin:/go17/bin:/usr/bin"),
            ("PS1", "$ (juju)$ "),
            ("GOPATH", "/ws/juju"),
            ("WORKON_ENVIRONMENT", "juju"),
            ("WORKON_BACKED_UP", "1"),
            ("WORKON_PREVIOUS_PATH", "/usr/bin"),
            ("WORKON_PREVIOUS_PS1", "$ "),
            ("WORKON_PREVIOUS_GOPATH", ""),
            ("WORKON_PREVIOUS_CDPATH", ""),
        ]);
        let mut switcher = EnvironmentSwitcher::new(snapshot);

        let kiwi = record("kiwi", "/ws/kiwi");
        let out = switcher.switch_to(&kiwi, Path::new("/go18/bin"), false, &[]);
        assert_eq!(value(&out, "PS1"), Some("$ (kiwi)$ "));
        assert!(out.iter().all(|a| !a.name.starts_with("WORKON_PREVIOUS_")));

        let out = switcher.reset();
        assert_eq!(value(&out, "GOPATH"), Some(""));
        assert_eq!(value(&out, "PATH"), Some("/usr/bin"));
    }
}
