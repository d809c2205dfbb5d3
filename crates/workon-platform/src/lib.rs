mod paths;

pub use paths::{
    AppPaths, AppPathsError, DATA_DIR_ENV, TOOLCHAIN_DIR, workspace_bin_dir, workspace_src_dir,
};
