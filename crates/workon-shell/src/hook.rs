use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
}

impl ShellType {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ShellType::Bash => "bash",
            ShellType::Zsh => "zsh",
        }
    }

    #[must_use]
    pub fn config_file(&self) -> &'static str {
        match self {
            ShellType::Bash => "~/.bashrc",
            ShellType::Zsh => "~/.zshrc",
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported shell: {0} (expected bash or zsh)")]
pub struct UnsupportedShell(pub String);

impl FromStr for ShellType {
    type Err = UnsupportedShell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bash" => Ok(ShellType::Bash),
            "zsh" => Ok(ShellType::Zsh),
            other => Err(UnsupportedShell(other.to_string())),
        }
    }
}

/// Shell function that wraps `binary` so `switch` output is evaluated in the
/// calling shell. `set -a` exports every assignment, which keeps the backup
/// variables visible to the next invocation.
#[must_use]
pub fn shell_hook(shell: ShellType, binary: &str) -> String {
    format!(
        r#"# {binary} hook ({shell}). Add to {config}:
#   eval "$({binary} init {shell})"
{binary}() {{
  if [ "$1" = "switch" ]; then
    local __workon_out
    __workon_out="$(command {binary} "$@")" || return $?
    set -a
    eval "$__workon_out"
    set +a
  else
    command {binary} "$@"
  fi
}}
"#,
        config = shell.config_file(),
    )
}
