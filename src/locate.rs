use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A file found by [`locate_parent_file`], with its parsed contents
#[derive(Debug, Clone)]
pub struct LocatedFile<T> {
    pub path: PathBuf,
    pub contents: T,
}

impl<T> LocatedFile<T> {
    /// Directory containing the located file
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Walk upward from `start_dir` (default: the working directory) looking for
/// `filename`, stopping below the filesystem root.
///
/// The first existing match ends the search: if it fails to parse, the result
/// is `None` rather than continuing upward.
pub fn locate_parent_file<T: DeserializeOwned>(
    filename: &str,
    start_dir: Option<&Path>,
) -> Option<LocatedFile<T>> {
    let start = match start_dir {
        Some(dir) => std::path::absolute(dir),
        None => std::env::current_dir(),
    };
    let start = match start {
        Ok(dir) => dir,
        Err(e) => {
            warn!("locate_parent_file: cannot resolve start directory: {}", e);
            return None;
        }
    };

    let mut current: &Path = &start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            debug!("locate_parent_file: found {}", candidate.display());
            return match read_json::<T>(&candidate) {
                Ok(contents) => Some(LocatedFile {
                    path: candidate,
                    contents,
                }),
                Err(e) => {
                    warn!("locate_parent_file: failed to read {}: {}", candidate.display(), e);
                    None
                }
            };
        }

        // The root itself is never searched
        match current.parent() {
            Some(parent) if parent.parent().is_some() => current = parent,
            _ => break,
        }
    }

    debug!("locate_parent_file: '{}' not found above {}", filename, start.display());
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locate_in_start_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target.json"), r#"{"here": true}"#).unwrap();

        let found = locate_parent_file::<Value>("target.json", Some(temp.path())).unwrap();
        assert_eq!(found.path, temp.path().join("target.json"));
        assert_eq!(found.contents["here"], Value::Bool(true));
        assert_eq!(found.dir(), temp.path());
    }

    #[test]
    fn test_locate_in_ancestor() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let deep = a.join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(a.join("target.json"), r#"{"level": "a"}"#).unwrap();

        let found = locate_parent_file::<Value>("target.json", Some(deep.as_path())).unwrap();
        assert_eq!(found.path, a.join("target.json"));
        assert_eq!(found.contents["level"], "a");
    }

    #[test]
    fn test_locate_nearest_wins() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = a.join("b");
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("target.json"), r#"{"level": "a"}"#).unwrap();
        fs::write(b.join("target.json"), r#"{"level": "b"}"#).unwrap();

        let found = locate_parent_file::<Value>("target.json", Some(b.as_path())).unwrap();
        assert_eq!(found.contents["level"], "b");
    }

    #[test]
    fn test_locate_outside_ancestry() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let sibling = temp.path().join("sibling").join("deeper");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&sibling).unwrap();
        fs::write(a.join("unpackr-locate-test.json"), "{}").unwrap();

        let found = locate_parent_file::<Value>("unpackr-locate-test.json", Some(sibling.as_path()));
        assert!(found.is_none());
    }

    #[test]
    fn test_locate_unparsable_stops_search() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = a.join("b");
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("target.json"), r#"{"level": "a"}"#).unwrap();
        fs::write(b.join("target.json"), "not json").unwrap();

        assert!(locate_parent_file::<Value>("target.json", Some(b.as_path())).is_none());
    }

    #[test]
    fn test_locate_ignores_directories_with_the_name() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = a.join("b");
        fs::create_dir_all(b.join("target.json")).unwrap();
        fs::write(a.join("target.json"), "{}").unwrap();

        let found = locate_parent_file::<Value>("target.json", Some(b.as_path())).unwrap();
        assert_eq!(found.path, a.join("target.json"));
    }

    #[test]
    fn test_read_json_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(read_json::<Value>(&temp.path().join("missing.json")).is_err());
    }
}
