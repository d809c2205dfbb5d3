mod error;
mod traits;
mod types;

pub use error::{BackendError, NetworkStage};
pub use traits::ArchiveStore;
pub use types::{
    EnvironmentRecord, InstallPhase, InstallProgress, ProgressSender, Version, VersionParseError,
};
