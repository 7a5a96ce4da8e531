mod clone_op;
mod copy;
mod install;
mod sanitize;
mod shell;
mod unpack;

pub use clone_op::{TEMP_CLONE_PREFIX, clone_repository, temp_clone_dir};
pub use copy::{copy_entry, copy_path};
pub use install::{InstallCommand, PackageManager, build_install_command, install_packages};
pub use sanitize::sanitize_relative_path;
pub use unpack::{DependencyOutcome, Mode, UnpackOutcome, UnpackRequest, unpack};
