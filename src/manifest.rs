use log::{debug, warn};
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use crate::locate;

/// Name of the unpack manifest looked up at the repository root
pub const MANIFEST_FILE: &str = "unpackr.config.json";

/// Name of the package manifest dependencies are read from
pub const PACKAGE_FILE: &str = "package.json";

/// One `files` entry: a relative path, or a `[from, to]` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Path(String),
    Mapping(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    files: Option<Vec<FileEntry>>,
}

/// How the clone is unpacked into the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    /// Copy the whole clone
    All,
    /// Copy only the listed entries, in order
    Selective(Vec<FileEntry>),
}

/// Why a manifest lookup fell back to copying everything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestStatus {
    Parsed,
    Missing,
    Invalid,
}

impl Manifest {
    /// Load the manifest from a clone root. Never fails: a missing or
    /// malformed file becomes `Manifest::All`.
    pub fn load(root: &Path) -> (Self, ManifestStatus) {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            debug!("Manifest::load: no manifest at {}", path.display());
            return (Manifest::All, ManifestStatus::Missing);
        }

        match locate::read_json::<RawManifest>(&path) {
            Ok(RawManifest { files: Some(files) }) => {
                debug!("Manifest::load: {} entries in {}", files.len(), path.display());
                (Manifest::Selective(files), ManifestStatus::Parsed)
            }
            Ok(RawManifest { files: None }) => {
                warn!("Manifest::load: {} has no files list", path.display());
                (Manifest::All, ManifestStatus::Invalid)
            }
            Err(e) => {
                warn!("Manifest::load: failed to parse {}: {}", path.display(), e);
                (Manifest::All, ManifestStatus::Invalid)
            }
        }
    }
}

/// The subset of `package.json` unpackr reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub dependencies: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PackageManifest {
    /// Declared dependency names with their raw range strings, in file order.
    /// Non-string ranges are kept with an empty range.
    pub fn dependency_ranges(&self) -> Vec<(&str, &str)> {
        self.dependencies
            .iter()
            .flatten()
            .map(|(name, range)| (name.as_str(), range.as_str().unwrap_or("")))
            .collect()
    }

    pub fn has_dependencies(&self) -> bool {
        self.dependencies.as_ref().is_some_and(|deps| !deps.is_empty())
    }

    pub fn declared_range(&self, name: &str) -> Option<&str> {
        self.dependencies
            .as_ref()?
            .get(name)
            .map(|range| range.as_str().unwrap_or(""))
    }
}

/// A package offered for installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub package: String,
    pub version: Option<Version>,
}

impl Dependency {
    pub fn from_range(package: &str, range: &str) -> Self {
        Self {
            package: package.to_string(),
            version: coerce_version(range),
        }
    }

    /// `name@version`, or `None` when the range had no usable version
    pub fn spec(&self) -> Option<String> {
        if self.package.is_empty() {
            return None;
        }
        self.version
            .as_ref()
            .map(|v| format!("{}@{}", self.package, v))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.package, v),
            None => write!(f, "{}", self.package),
        }
    }
}

/// A candidate dependency plus what the host project already declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChoice {
    pub dependency: Dependency,
    pub installed: Option<InstalledVersion>,
}

/// Version already declared by the host project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion(pub Option<Version>);

impl DependencyChoice {
    /// Label used by the dependency picker, e.g. `left-pad - 1.3.0`
    pub fn label(&self) -> String {
        let version = self
            .dependency
            .version
            .as_ref()
            .map(Version::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        format!("{} - {}", self.dependency.package, version)
    }

    /// Suffix shown when the host already declares the package
    pub fn installed_note(&self) -> Option<String> {
        let InstalledVersion(version) = self.installed.as_ref()?;
        let version = version
            .as_ref()
            .map(Version::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        Some(format!("(currently installed - {})", version))
    }
}

/// Dependencies of the unpacked package, annotated against the host project.
pub fn dependency_choices(cloned: &PackageManifest, local: &PackageManifest) -> Vec<DependencyChoice> {
    cloned
        .dependency_ranges()
        .into_iter()
        .map(|(name, range)| DependencyChoice {
            dependency: Dependency::from_range(name, range),
            installed: local
                .declared_range(name)
                .map(|local_range| InstalledVersion(coerce_version(local_range))),
        })
        .collect()
}

/// First `major[.minor[.patch]]` run in a range, each part at most 16 digits
/// and not adjacent to further digits.
static VERSION_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])").unwrap()
});

/// Reduce a version range such as `^1.2`, `~3` or `>=2.0.1 <3` to a concrete
/// version, missing parts set to zero.
pub fn coerce_version(range: &str) -> Option<Version> {
    let caps = VERSION_RUN.captures(range)?;
    let part = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn package(json: &str) -> PackageManifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_coerce_version_ranges() {
        assert_eq!(coerce_version("^1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(coerce_version("~4.17"), Some(Version::new(4, 17, 0)));
        assert_eq!(coerce_version("3"), Some(Version::new(3, 0, 0)));
        assert_eq!(coerce_version(">=2.0.1 <3"), Some(Version::new(2, 0, 1)));
        assert_eq!(coerce_version("v1.0.0-beta.2"), Some(Version::new(1, 0, 0)));
        assert_eq!(coerce_version("1.2.3.4"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_coerce_version_without_digits() {
        assert_eq!(coerce_version("latest"), None);
        assert_eq!(coerce_version("*"), None);
        assert_eq!(coerce_version(""), None);
    }

    #[test]
    fn test_coerce_version_skips_overlong_runs() {
        assert_eq!(coerce_version("12345678901234567 || 1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(coerce_version("12345678901234567"), None);
        assert_eq!(
            coerce_version("1234567890123456"),
            Some(Version::new(1234567890123456, 0, 0))
        );
    }

    #[test]
    fn test_coerce_version_trailing_dot() {
        assert_eq!(coerce_version("1."), Some(Version::new(1, 0, 0)));
        assert_eq!(coerce_version("1.x"), Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_coerce_version_too_many_digits() {
        assert_eq!(coerce_version("12345678901234567"), None);
    }

    #[test]
    fn test_file_entry_parsing() {
        let entries: Vec<FileEntry> =
            serde_json::from_str(r#"["a.txt", ["src/b.txt", "c.txt"]]"#).unwrap();
        assert_eq!(
            entries,
            vec![
                FileEntry::Path("a.txt".to_string()),
                FileEntry::Mapping(vec!["src/b.txt".to_string(), "c.txt".to_string()]),
            ]
        );
    }

    #[test]
    fn test_manifest_load_missing() {
        let temp = TempDir::new().unwrap();
        let (manifest, status) = Manifest::load(temp.path());
        assert_eq!(manifest, Manifest::All);
        assert_eq!(status, ManifestStatus::Missing);
    }

    #[test]
    fn test_manifest_load_without_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), r#"{"other": true}"#).unwrap();

        let (manifest, status) = Manifest::load(temp.path());
        assert_eq!(manifest, Manifest::All);
        assert_eq!(status, ManifestStatus::Invalid);
    }

    #[test]
    fn test_manifest_load_unparsable() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), "{ not json").unwrap();

        let (manifest, status) = Manifest::load(temp.path());
        assert_eq!(manifest, Manifest::All);
        assert_eq!(status, ManifestStatus::Invalid);
    }

    #[test]
    fn test_manifest_load_selective() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{"files": ["README.md", ["lib", "vendor/lib"]]}"#,
        )
        .unwrap();

        let (manifest, status) = Manifest::load(temp.path());
        assert_eq!(status, ManifestStatus::Parsed);
        match manifest {
            Manifest::Selective(files) => assert_eq!(files.len(), 2),
            other => panic!("Expected Selective, got {:?}", other),
        }
    }

    #[test]
    fn test_dependency_ranges_preserve_order() {
        let pkg = package(r#"{"dependencies": {"zeta": "^1.0.0", "alpha": "2.1", "mid": "~0.3.4"}}"#);
        let names: Vec<&str> = pkg.dependency_ranges().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_has_dependencies() {
        assert!(!package("{}").has_dependencies());
        assert!(!package(r#"{"dependencies": {}}"#).has_dependencies());
        assert!(package(r#"{"dependencies": {"a": "1"}}"#).has_dependencies());
    }

    #[test]
    fn test_dependency_choices_mark_installed() {
        let cloned = package(r#"{"dependencies": {"react": "^18.2.0", "lodash": "4.17.21"}}"#);
        let local = package(r#"{"dependencies": {"react": "^17.0.2"}}"#);

        let choices = dependency_choices(&cloned, &local);
        assert_eq!(choices.len(), 2);

        assert_eq!(choices[0].label(), "react - 18.2.0");
        assert_eq!(
            choices[0].installed_note().as_deref(),
            Some("(currently installed - 17.0.2)")
        );

        assert_eq!(choices[1].label(), "lodash - 4.17.21");
        assert!(choices[1].installed_note().is_none());
    }

    #[test]
    fn test_dependency_spec_and_display() {
        let dep = Dependency::from_range("left-pad", "^1.3");
        assert_eq!(dep.spec().as_deref(), Some("left-pad@1.3.0"));
        assert_eq!(dep.to_string(), "left-pad@1.3.0");

        let unversioned = Dependency::from_range("tool", "latest");
        assert!(unversioned.spec().is_none());
        assert_eq!(unversioned.to_string(), "tool");
    }
}
