use colored::Colorize;
use log::{debug, error, info};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::shell;
use crate::error::{Result, UnpackrError};
use crate::manifest::Dependency;

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    pub const ALL: [PackageManager; 2] = [PackageManager::Npm, PackageManager::Yarn];

    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Subcommand that adds a dependency
    pub fn add_subcommand(&self) -> &'static str {
        match self {
            PackageManager::Npm => "install",
            PackageManager::Yarn => "add",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for PackageManager {
    type Err = UnpackrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            other => Err(UnpackrError::InvalidPackageManager(other.to_string())),
        }
    }
}

/// A fully validated install invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub manager: PackageManager,
    /// `name@version` specs, in input order
    pub specs: Vec<String>,
    pub command_line: String,
}

/// Validate the manager and package list and build the shell command.
/// Packages without a name or a valid version are dropped silently.
pub fn build_install_command(
    packages: &[Dependency],
    manager: &str,
    working_dir: &Path,
) -> Result<InstallCommand> {
    let manager: PackageManager = manager.parse()?;

    let specs: Vec<String> = packages.iter().filter_map(Dependency::spec).collect();
    if specs.is_empty() {
        return Err(UnpackrError::NoValidPackages);
    }

    let cd = shell::escape_command(&["cd".to_string(), working_dir.to_string_lossy().into_owned()]);
    let mut install = vec![manager.program().to_string(), manager.add_subcommand().to_string()];
    install.extend(specs.iter().cloned());
    let command_line = format!("{} && {}", cd, shell::escape_command(&install));

    Ok(InstallCommand {
        manager,
        specs,
        command_line,
    })
}

/// Install `packages` into `working_dir` with the given package manager.
/// Returns the installed `name@version` specs.
pub fn install_packages(packages: &[Dependency], manager: &str, working_dir: &Path) -> Result<Vec<String>> {
    let command = match build_install_command(packages, manager, working_dir) {
        Ok(command) => command,
        Err(UnpackrError::InvalidPackageManager(m)) => {
            println!("{} {}", "Invalid package manager:".red(), m.yellow());
            return Err(UnpackrError::InvalidPackageManager(m));
        }
        Err(UnpackrError::NoValidPackages) => {
            println!("{}", "No valid packages available to install".yellow());
            return Err(UnpackrError::NoValidPackages);
        }
        Err(e) => return Err(e),
    };

    for spec in &command.specs {
        println!("Installing: {} via {}", spec.cyan(), command.manager.to_string().cyan());
    }

    info!(
        "install_packages: {} package(s) via {} in {}",
        command.specs.len(),
        command.manager,
        working_dir.display()
    );
    debug!("install_packages: command `{}`", command.command_line);

    match shell::run_inherited(&command.command_line) {
        Ok(()) => Ok(command.specs),
        Err(e) => {
            error!("install_packages: {}", e);
            println!("{}", "An error occurred while installing the selected packages".red());
            println!("{}", e);
            Err(UnpackrError::InstallFailed(e.to_string()))
        }
    }
}
