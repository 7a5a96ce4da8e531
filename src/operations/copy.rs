use colored::Colorize;
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::sanitize::sanitize_relative_path;
use crate::manifest::FileEntry;

/// Resolve a manifest entry to `(label, from, to)` absolute paths.
/// Returns `None` for a mapping with fewer than two paths.
fn resolve_entry(entry: &FileEntry, source_root: &Path, dest_root: &Path) -> Option<(String, PathBuf, PathBuf)> {
    match entry {
        FileEntry::Path(path) => {
            let path = sanitize_relative_path(path);
            Some((path.clone(), source_root.join(&path), dest_root.join(&path)))
        }
        FileEntry::Mapping(paths) => {
            let paths: Vec<String> = paths.iter().map(|p| sanitize_relative_path(p)).collect();
            if paths.len() < 2 {
                return None;
            }
            Some((
                paths[0].clone(),
                source_root.join(&paths[0]),
                dest_root.join(&paths[1]),
            ))
        }
    }
}

/// Copy one manifest entry from the clone into the destination.
///
/// Failures are reported and logged but never propagated, so one bad entry
/// does not stop the rest of the batch.
pub fn copy_entry(entry: &FileEntry, source_root: &Path, dest_root: &Path) -> bool {
    let Some((label, from, to)) = resolve_entry(entry, source_root, dest_root) else {
        warn!("copy_entry: mapping {:?} needs both a source and a target", entry);
        println!("{} {:?}", "Error copying:".red(), entry);
        return false;
    };

    match copy_path(&from, &to) {
        Ok(()) => {
            debug!("copy_entry: {} -> {}", from.display(), to.display());
            println!("Unpacked {} to {}", label.cyan(), to.display().to_string().cyan());
            true
        }
        Err(e) => {
            warn!("copy_entry: failed to copy {}: {}", from.display(), e);
            println!("{} {}", "Error copying:".red(), label.cyan());
            false
        }
    }
}

/// Recursively copy a file or directory tree. Missing parent directories are
/// created and existing directories are merged into.
pub fn copy_path(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(from)?;

    if !metadata.is_dir() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        return copy_file(from, to, metadata.file_type().is_symlink());
    }

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target, file_type.is_symlink())?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_file(from: &Path, to: &Path, is_symlink: bool) -> io::Result<()> {
    if is_symlink {
        let link = fs::read_link(from)?;
        if fs::symlink_metadata(to).is_ok() {
            fs::remove_file(to)?;
        }
        return std::os::unix::fs::symlink(link, to);
    }
    fs::copy(from, to).map(|_| ())
}

#[cfg(not(unix))]
fn copy_file(from: &Path, to: &Path, _is_symlink: bool) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}
