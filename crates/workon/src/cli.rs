use std::path::PathBuf;

use clap::{Parser, Subcommand};
use workon_shell::ShellType;

/// Named Go environments: a pinned toolchain plus a workspace.
#[derive(Debug, Parser)]
#[command(
    name = "workon",
    version,
    about = "Manage named Go environments and switch between them",
    after_help = "\
SHELL INTEGRATION:
    `workon switch` prints variable assignments on stdout. Install the hook
    so your shell applies them:
        eval \"$(workon init bash)\"

ENVIRONMENT VARIABLES:
    WORKON_HOME    Data directory (default: $XDG_DATA_HOME/workon)"
)]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an environment, installing its toolchain when needed.
    Create {
        name: String,
        /// Workspace directory, used as GOPATH.
        workspace: PathBuf,
        /// X.Y for the newest patch of a line, or an exact X.Y.Z.
        #[arg(long = "go-version", value_name = "VERSION")]
        go_version: Option<String>,
    },

    /// Enter an environment; without a name, restore the original shell.
    Switch { name: Option<String> },

    /// Move environments to a newer toolchain and rerun their compile steps.
    ///
    /// With a name and a version, moves that environment to the version.
    /// With only a name, moves it to the newest release. With only a
    /// version line (X.Y), moves every environment on that line to the
    /// line's newest patch.
    Update {
        name: Option<String>,
        #[arg(long = "go-version", value_name = "VERSION")]
        go_version: Option<String>,
    },

    /// Set a setting, or an environment attribute with `attribute@environment`.
    ///
    /// Settings: bootstrap, default, mirror, debug.
    /// Environment attributes: globalbin, compilesteps (`;`-separated).
    Set { attribute: String, value: String },

    /// List environments.
    List,

    /// List release lines available for install, with their newest patch.
    Available,

    /// Print the active environment.
    Current,

    /// Print the shell hook.
    Init { shell: ShellType },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_version() {
        let cli = Cli::parse_from(["workon", "create", "juju", "/ws/juju", "--go-version", "1.7"]);
        match cli.command {
            Command::Create {
                name,
                workspace,
                go_version,
            } => {
                assert_eq!(name, "juju");
                assert_eq!(workspace, std::path::Path::new("/ws/juju"));
                assert_eq!(go_version.as_deref(), Some("1.7"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn switch_name_is_optional() {
        let cli = Cli::parse_from(["workon", "switch"]);
        assert!(matches!(cli.command, Command::Switch { name: None }));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["workon", "list", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn init_rejects_unknown_shell() {
        assert!(Cli::try_parse_from(["workon", "init", "fish"]).is_err());
    }
}
