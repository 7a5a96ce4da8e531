use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnpackrError {
    #[error("Cannot checkout with both branch '{branch}' and tag '{tag}' simultaneously")]
    ConflictingRef { branch: String, tag: String },

    #[error("Destination directory exists: {0}")]
    DestinationExists(PathBuf),

    #[error("An error occurred while cloning repository '{repository}': {reason}")]
    CloneFailed { repository: String, reason: String },

    #[error("Invalid package manager: {0}")]
    InvalidPackageManager(String),

    #[error("No valid packages available to install")]
    NoValidPackages,

    #[error("An error occurred while installing the selected packages: {0}")]
    InstallFailed(String),

    #[error("Prompt failed: {0}")]
    PromptFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UnpackrError>;

/// Trim and flatten process output so it reads as a single error line.
pub fn process_error_text(stderr: &[u8], fallback: &str) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.lines().map(str::trim).collect::<Vec<_>>().join(" ")
    }
}
