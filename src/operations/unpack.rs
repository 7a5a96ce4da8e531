use colored::Colorize;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use super::clone_op::{clone_repository, temp_clone_dir};
use super::copy::{copy_entry, copy_path};
use super::install::install_packages;
use crate::config::Config;
use crate::error::{Result, UnpackrError};
use crate::locate::locate_parent_file;
use crate::manifest::{
    Dependency, DependencyChoice, FileEntry, Manifest, ManifestStatus, PACKAGE_FILE, PackageManifest,
    dependency_choices,
};
use crate::prompt::Prompter;

/// What to unpack and where
#[derive(Debug, Clone, Default)]
pub struct UnpackRequest {
    /// Repository URL or local path
    pub repository: String,
    /// Destination directory, resolved against the working directory
    pub destination: PathBuf,
    pub branch: Option<String>,
    pub tag: Option<String>,
    /// Package manager used to install every unpacked dependency without
    /// prompting. Only consulted in [`Mode::Programmatic`].
    pub install_dependencies: Option<String>,
}

impl UnpackRequest {
    pub fn new(repository: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    /// Branch or tag to clone. Fails if both are set.
    pub fn reference(&self) -> Result<Option<&str>> {
        match (&self.branch, &self.tag) {
            (Some(branch), Some(tag)) => Err(UnpackrError::ConflictingRef {
                branch: branch.clone(),
                tag: tag.clone(),
            }),
            (Some(branch), None) => Ok(Some(branch.as_str())),
            (None, Some(tag)) => Ok(Some(tag.as_str())),
            (None, None) => Ok(None),
        }
    }
}

/// How dependency installation is decided
#[derive(Clone, Copy)]
pub enum Mode<'a> {
    /// Ask which dependencies to install, then which package manager
    Interactive(&'a dyn Prompter),
    /// Use `install_dependencies` from the request, or only list dependencies
    Programmatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOutcome {
    /// The unpacked package declares no dependencies
    NoDependencies,
    /// Dependencies were listed for the user to install by hand
    ManualInstall(Vec<Dependency>),
    /// The user deselected everything
    NoneSelected,
    /// `name@version` specs that were installed
    Installed(Vec<String>),
    InstallFailed(String),
}

#[derive(Debug, Clone)]
pub struct UnpackOutcome {
    pub destination: PathBuf,
    pub manifest: Manifest,
    /// Manifest entries that could not be copied
    pub failed_entries: Vec<FileEntry>,
    pub dependencies: DependencyOutcome,
}

/// Clone `request.repository` and unpack it into `request.destination`, then
/// offer the unpacked package's dependencies to the host project.
pub fn unpack(request: &UnpackRequest, mode: Mode<'_>, config: &Config) -> Result<UnpackOutcome> {
    let reference = request.reference()?;
    let destination = std::path::absolute(&request.destination)?;

    println!("{}", "Unpacking files...".green());
    println!("From: {}", request.repository.cyan());
    if let Some(branch) = &request.branch {
        println!("{}", format!("        (branch {})", branch.magenta()).dimmed());
    } else if let Some(tag) = &request.tag {
        println!("{}", format!("        (tag {})", tag.magenta()).dimmed());
    }
    println!("To:   {}", destination.display().to_string().cyan());

    if destination.exists() {
        error!("unpack: destination already exists at {}", destination.display());
        return Err(UnpackrError::DestinationExists(destination));
    }

    let clone_dir = temp_clone_dir(&config.clone_root()?, &request.repository, reference);
    debug!("unpack: temporary clone at {}", clone_dir.display());

    println!("\nCreating temporary files...");
    clone_repository(&request.repository, reference, &clone_dir)?;

    let (manifest, status) = Manifest::load(&clone_dir);
    match status {
        ManifestStatus::Parsed => println!("{}", "\nunpackr.config.json located and parsed".green()),
        ManifestStatus::Invalid => {
            println!("{}", "\nInvalid unpackr.config.json in target repository root".yellow())
        }
        ManifestStatus::Missing => {
            println!("{}", "\nunpackr.config.json not found in repository root".yellow())
        }
    }

    // Read before the clone is removed below. The search may continue above the
    // clone directory when the repository has no package.json of its own.
    let cloned_package =
        locate_parent_file::<PackageManifest>(PACKAGE_FILE, Some(clone_dir.as_path())).map(|found| found.contents);

    let copied = unpack_files(&manifest, &clone_dir, &destination);

    println!("\nRemoving temporary files...");
    remove_temp_clone(&clone_dir);
    println!("Removed temporary files");

    let failed_entries = copied?;
    info!(
        "unpack: unpacked '{}' into {} ({} failed entries)",
        request.repository,
        destination.display(),
        failed_entries.len()
    );

    let dependencies = handle_dependencies(cloned_package, &destination, request, mode);

    Ok(UnpackOutcome {
        destination,
        manifest,
        failed_entries,
        dependencies,
    })
}

/// Copy the clone into the destination. Returns the entries that failed.
fn unpack_files(manifest: &Manifest, clone_dir: &Path, destination: &Path) -> Result<Vec<FileEntry>> {
    match manifest {
        Manifest::All => {
            println!("\nUnpacking all files...");
            copy_path(clone_dir, destination)?;

            let git_dir = destination.join(".git");
            if git_dir.exists() {
                fs::remove_dir_all(&git_dir)?;
            }
            println!("All files unpacked to {}", destination.display().to_string().cyan());
            Ok(Vec::new())
        }
        Manifest::Selective(entries) => {
            println!();
            let failed: Vec<FileEntry> = entries
                .iter()
                .filter(|entry| !copy_entry(entry, clone_dir, destination))
                .cloned()
                .collect();
            Ok(failed)
        }
    }
}

fn remove_temp_clone(clone_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(clone_dir) {
        warn!("unpack: failed to remove temporary clone {}: {}", clone_dir.display(), e);
    }
}

fn handle_dependencies(
    cloned_package: Option<PackageManifest>,
    destination: &Path,
    request: &UnpackRequest,
    mode: Mode<'_>,
) -> DependencyOutcome {
    let Some(cloned) = cloned_package.filter(PackageManifest::has_dependencies) else {
        println!("\nNo unpacked package dependencies found");
        print_complete();
        return DependencyOutcome::NoDependencies;
    };

    let Some(local) = locate_parent_file::<PackageManifest>(PACKAGE_FILE, destination.parent()) else {
        println!("{}", "\nNo local package.json found".yellow());
        return manual_install(&cloned);
    };
    debug!("handle_dependencies: host project manifest at {}", local.path.display());

    let choices = dependency_choices(&cloned, &local.contents);
    let working_dir = local.dir();

    match mode {
        Mode::Interactive(prompter) => {
            println!("\nUnpacked package.json contains dependencies");
            prompt_and_install(prompter, &choices, working_dir, &cloned)
        }
        Mode::Programmatic => match &request.install_dependencies {
            Some(manager) => {
                let packages: Vec<Dependency> = choices.into_iter().map(|c| c.dependency).collect();
                install(&packages, manager, working_dir)
            }
            None => {
                println!(
                    "{}",
                    "Unpacked dependencies located but installDependencies was not specified".yellow()
                );
                manual_install(&cloned)
            }
        },
    }
}

fn prompt_and_install(
    prompter: &dyn Prompter,
    choices: &[DependencyChoice],
    working_dir: &Path,
    cloned: &PackageManifest,
) -> DependencyOutcome {
    let selected = match prompter.select_dependencies(choices) {
        Ok(indices) => indices,
        Err(e) => {
            warn!("prompt_and_install: dependency prompt unavailable: {}", e);
            return manual_install(cloned);
        }
    };

    let packages: Vec<Dependency> = selected
        .iter()
        .filter_map(|&i| choices.get(i))
        .map(|choice| choice.dependency.clone())
        .collect();

    if packages.is_empty() {
        println!("No dependencies selected");
        print_complete();
        return DependencyOutcome::NoneSelected;
    }

    match prompter.select_package_manager() {
        Ok(manager) => install(&packages, manager.program(), working_dir),
        Err(e) => {
            warn!("prompt_and_install: package manager prompt unavailable: {}", e);
            print_manual_list(&packages);
            print_complete();
            DependencyOutcome::ManualInstall(packages)
        }
    }
}

fn install(packages: &[Dependency], manager: &str, working_dir: &Path) -> DependencyOutcome {
    match install_packages(packages, manager, working_dir) {
        Ok(specs) => {
            print_complete();
            DependencyOutcome::Installed(specs)
        }
        Err(e) => DependencyOutcome::InstallFailed(e.to_string()),
    }
}

fn manual_install(cloned: &PackageManifest) -> DependencyOutcome {
    let dependencies: Vec<Dependency> = cloned
        .dependency_ranges()
        .into_iter()
        .map(|(name, range)| Dependency::from_range(name, range))
        .collect();

    print_manual_list(&dependencies);
    print_complete();
    DependencyOutcome::ManualInstall(dependencies)
}

fn print_manual_list(dependencies: &[Dependency]) {
    println!("Consider manually installing the following unpacked dependencies:");
    let last = dependencies.len().saturating_sub(1);
    for (i, dependency) in dependencies.iter().enumerate() {
        let branch = if i == last { "└──" } else { "├──" };
        println!("{} {}", branch, dependency);
    }
}

fn print_complete() {
    println!("{}", "\nUnpack complete".green());
}
