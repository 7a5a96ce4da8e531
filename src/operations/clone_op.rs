use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::shell;
use crate::error::{Result, UnpackrError, process_error_text};

/// Prefix of temporary clone directories
pub const TEMP_CLONE_PREFIX: &str = "unpackr-tmp-";

/// Build a collision-resistant temp clone path under `root`, hashed from the
/// repository, the requested ref and the current time.
pub fn temp_clone_dir(root: &Path, repository: &str, reference: Option<&str>) -> PathBuf {
    let now = Utc::now();
    let stamp = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_millis());

    let mut hasher = Sha256::new();
    hasher.update(repository.as_bytes());
    hasher.update(reference.unwrap_or("").as_bytes());
    hasher.update(stamp.to_string().as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    root.join(format!("{}{}", TEMP_CLONE_PREFIX, &digest[..32]))
}

/// Strip `;`, `&` and whitespace from a branch or tag name. This only blunts
/// the most obvious injection; the ref is also shell-escaped afterwards.
pub fn sanitize_ref(reference: &str) -> String {
    reference
        .chars()
        .filter(|c| !matches!(c, ';' | '&') && !c.is_whitespace())
        .collect()
}

/// Tokens of a shallow `git clone`
pub fn clone_command(repository: &str, reference: Option<&str>, target: &Path) -> Vec<String> {
    let mut command = vec!["git".to_string(), "clone".to_string()];
    if let Some(reference) = reference {
        command.push("-b".to_string());
        command.push(sanitize_ref(reference));
    }
    command.extend([
        "--depth".to_string(),
        "1".to_string(),
        repository.to_string(),
        target.to_string_lossy().into_owned(),
    ]);
    command
}

/// Shallow-clone `repository` at an optional branch or tag into `target`.
/// On failure no directory is left behind at `target`.
pub fn clone_repository(repository: &str, reference: Option<&str>, target: &Path) -> Result<()> {
    info!("clone_repository: cloning '{}' (ref={:?}) -> {}", repository, reference, target.display());

    let command_line = shell::escape_command(&clone_command(repository, reference, target));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Cloning {}", repository));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = shell::run_captured(&command_line);
    spinner.finish_and_clear();

    let reason = match result {
        Ok(output) if output.status.success() => {
            debug!("clone_repository: clone finished at {}", target.display());
            return Ok(());
        }
        Ok(output) => process_error_text(&output.stderr, &output.status.to_string()),
        Err(e) => e.to_string(),
    };

    error!("clone_repository: clone failed for '{}': {}", repository, reason);
    if target.exists() {
        let _ = std::fs::remove_dir_all(target);
    }

    Err(UnpackrError::CloneFailed {
        repository: repository.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_clone_dir_naming() {
        let root = Path::new("/work");
        let dir = temp_clone_dir(root, "https://example.com/repo.git", Some("main"));

        assert_eq!(dir.parent(), Some(root));
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(TEMP_CLONE_PREFIX));
        let hash = &name[TEMP_CLONE_PREFIX.len()..];
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_temp_clone_dir_differs_by_repository() {
        let root = Path::new("/work");
        let a = temp_clone_dir(root, "repo-a", None);
        let b = temp_clone_dir(root, "repo-b", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_ref() {
        assert_eq!(sanitize_ref("main"), "main");
        assert_eq!(sanitize_ref("release/1.2"), "release/1.2");
        assert_eq!(sanitize_ref("v1.0.0; rm -rf ~ &"), "v1.0.0rm-rf~");
    }

    #[test]
    fn test_clone_command_without_ref() {
        let command = clone_command("https://example.com/r.git", None, Path::new("/tmp/x"));
        assert_eq!(
            command,
            vec!["git", "clone", "--depth", "1", "https://example.com/r.git", "/tmp/x"]
        );
    }

    #[test]
    fn test_clone_command_with_ref() {
        let command = clone_command("repo", Some("dev;echo"), Path::new("/tmp/x"));
        assert_eq!(command, vec!["git", "clone", "-b", "devecho", "--depth", "1", "repo", "/tmp/x"]);
    }

    #[test]
    fn test_clone_missing_repository_fails_cleanly() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("clone");
        let missing = temp.path().join("does-not-exist");

        let result = clone_repository(&missing.to_string_lossy(), None, &target);
        assert!(matches!(result, Err(UnpackrError::CloneFailed { .. })));
        assert!(!target.exists());
    }
}
