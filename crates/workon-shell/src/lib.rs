#![allow(clippy::missing_errors_doc)]

mod hook;
mod path_list;
mod snapshot;
mod switch;

pub use hook::{ShellType, UnsupportedShell, shell_hook};
pub use path_list::{SEPARATOR, insert_front};
pub use snapshot::{
    ACTIVE_ENVIRONMENT, Assignment, BACKUP_CHAIN, Backup, CDPATH, EnvSnapshot, GOPATH, PATH, PS1,
    TrackedVar,
};
pub use switch::{EnvironmentSwitcher, SwitchState};
