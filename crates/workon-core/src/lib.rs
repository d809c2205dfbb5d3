//! Toolchain discovery and installation for workon.
//!
//! - [`Catalog`]: the remote release listing, reduced to the newest patch of
//!   each `major.minor` line.
//! - [`Installer`]: download, verify, extract and (for source releases)
//!   build a toolchain under the installs directory.
//! - [`ReleaseStore`]: the HTTP [`workon_backend::ArchiveStore`].
//! - [`run_compile_steps`]: per-environment build commands run after an
//!   update.

mod archive;
mod catalog;
mod install;
mod steps;
mod store;

pub use archive::{extract_tar_gz, sha256_file};
pub use catalog::{ARCHIVE_PREFIX, ARCHIVE_SUFFIX, Catalog};
pub use install::{Installer, WorkingDirGuard, resolve_bootstrap};
pub use steps::run_compile_steps;
pub use store::{RELEASES_URL, ReleaseStore};
