use regex::Regex;
use std::sync::LazyLock;

static PARENT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\./?").unwrap());
static CURRENT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\./").unwrap());
static HOME_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~/?").unwrap());
static ROOT_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/").unwrap());

/// Strip parent, current, home and root markers from a relative path so it
/// can be joined onto an unpack root.
///
/// This is textual stripping, not canonicalization. Symlinks inside the
/// source tree can still point outside of it.
pub fn sanitize_relative_path(path: &str) -> String {
    let path = PARENT_MARKER.replace_all(path, "");
    let path = CURRENT_MARKER.replace_all(&path, "");
    let path = HOME_MARKER.replace_all(&path, "");
    ROOT_MARKER.replace(&path, "").into_owned()
}
