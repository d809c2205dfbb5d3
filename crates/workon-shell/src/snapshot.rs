use std::fmt;

pub const PATH: &str = "PATH";
pub const GOPATH: &str = "GOPATH";
pub const PS1: &str = "PS1";
pub const CDPATH: &str = "CDPATH";

/// Name of the environment currently switched into. Empty or unset in the
/// default state.
pub const ACTIVE_ENVIRONMENT: &str = "WORKON_ENVIRONMENT";

/// Non-empty while the `WORKON_PREVIOUS_*` slots hold a chain's originals.
pub const BACKUP_CHAIN: &str = "WORKON_BACKED_UP";

/// A variable whose value is backed up before the first switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedVar {
    Path,
    Gopath,
    Prompt,
    Cdpath,
}

impl TrackedVar {
    pub const ALL: [TrackedVar; 4] = [
        TrackedVar::Gopath,
        TrackedVar::Path,
        TrackedVar::Prompt,
        TrackedVar::Cdpath,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Path => PATH,
            Self::Gopath => GOPATH,
            Self::Prompt => PS1,
            Self::Cdpath => CDPATH,
        }
    }

    #[must_use]
    pub fn backup_name(self) -> &'static str {
        match self {
            Self::Path => "WORKON_PREVIOUS_PATH",
            Self::Gopath => "WORKON_PREVIOUS_GOPATH",
            Self::Prompt => "WORKON_PREVIOUS_PS1",
            Self::Cdpath => "WORKON_PREVIOUS_CDPATH",
        }
    }
}

/// Values captured before the first switch of a chain.
///
/// A slot is written only through [`Backup::capture_if_empty`] and emptied
/// only by [`Backup::clear`], so once populated it keeps the original value
/// across any number of switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backup {
    path: Option<String>,
    gopath: Option<String>,
    prompt: Option<String>,
    cdpath: Option<String>,
}

impl Backup {
    fn slot(&self, var: TrackedVar) -> &Option<String> {
        match var {
            TrackedVar::Path => &self.path,
            TrackedVar::Gopath => &self.gopath,
            TrackedVar::Prompt => &self.prompt,
            TrackedVar::Cdpath => &self.cdpath,
        }
    }

    fn slot_mut(&mut self, var: TrackedVar) -> &mut Option<String> {
        match var {
            TrackedVar::Path => &mut self.path,
            TrackedVar::Gopath => &mut self.gopath,
            TrackedVar::Prompt => &mut self.prompt,
            TrackedVar::Cdpath => &mut self.cdpath,
        }
    }

    #[must_use]
    pub fn get(&self, var: TrackedVar) -> Option<&str> {
        self.slot(var).as_deref()
    }

    #[must_use]
    pub fn is_populated(&self, var: TrackedVar) -> bool {
        self.slot(var).is_some()
    }

    /// Store `value` unless the slot already holds one. Returns whether the
    /// value was captured.
    pub fn capture_if_empty(&mut self, var: TrackedVar, value: &str) -> bool {
        let slot = self.slot_mut(var);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value.to_string());
        true
    }

    /// Empty the slot, returning what it held.
    pub fn clear(&mut self, var: TrackedVar) -> Option<String> {
        self.slot_mut(var).take()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        TrackedVar::ALL.iter().all(|var| !self.is_populated(*var))
    }
}

/// A single `NAME=VALUE` mutation for the caller's shell to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

impl Assignment {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn clear(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }

    /// Render as a POSIX shell assignment with the value single-quoted.
    #[must_use]
    pub fn to_shell_line(&self) -> String {
        format!("{}='{}'", self.name, self.value.replace('\'', r"'\''"))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The subset of a shell environment the switcher reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    path: String,
    gopath: String,
    prompt: String,
    cdpath: String,
    active: Option<String>,
    chain_open: bool,
    backup: Backup,
}

impl EnvSnapshot {
    /// Build a snapshot from `(name, value)` pairs such as
    /// `std::env::vars()`.
    ///
    /// A backup variable counts as populated when it is non-empty, or when
    /// it is present at all while [`BACKUP_CHAIN`] is set (an original value
    /// may itself have been empty).
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut snapshot = Self::default();
        let mut backups: Vec<(TrackedVar, String)> = Vec::new();

        for (name, value) in vars {
            let name = name.as_ref();
            let value = value.into();
            if name == ACTIVE_ENVIRONMENT {
                snapshot.active = Some(value).filter(|v| !v.is_empty());
                continue;
            }
            if name == BACKUP_CHAIN {
                snapshot.chain_open = !value.is_empty();
                continue;
            }
            for var in TrackedVar::ALL {
                if name == var.name() {
                    *snapshot.current_mut(var) = value.clone();
                } else if name == var.backup_name() {
                    backups.push((var, value.clone()));
                }
            }
        }

        for (var, value) in backups {
            if !value.is_empty() || snapshot.chain_open {
                snapshot.backup.capture_if_empty(var, &value);
            }
        }

        snapshot
    }

    fn current_mut(&mut self, var: TrackedVar) -> &mut String {
        match var {
            TrackedVar::Path => &mut self.path,
            TrackedVar::Gopath => &mut self.gopath,
            TrackedVar::Prompt => &mut self.prompt,
            TrackedVar::Cdpath => &mut self.cdpath,
        }
    }

    #[must_use]
    pub fn current(&self, var: TrackedVar) -> &str {
        match var {
            TrackedVar::Path => &self.path,
            TrackedVar::Gopath => &self.gopath,
            TrackedVar::Prompt => &self.prompt,
            TrackedVar::Cdpath => &self.cdpath,
        }
    }

    #[must_use]
    pub fn backup(&self) -> &Backup {
        &self.backup
    }

    pub(crate) fn backup_mut(&mut self) -> &mut Backup {
        &mut self.backup
    }

    #[must_use]
    pub fn active_environment(&self) -> Option<&str> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn chain_open(&self) -> bool {
        self.chain_open
    }

    /// Reflect emitted assignments, as a shell evaluating them would.
    pub fn apply(&mut self, assignments: &[Assignment]) {
        for assignment in assignments {
            let name = assignment.name.as_str();
            if name == ACTIVE_ENVIRONMENT {
                self.active = Some(assignment.value.clone()).filter(|v| !v.is_empty());
                continue;
            }
            if name == BACKUP_CHAIN {
                self.chain_open = !assignment.value.is_empty();
                continue;
            }
            for var in TrackedVar::ALL {
                if name == var.name() {
                    self.current_mut(var).clone_from(&assignment.value);
                }
            }
        }
    }
}
