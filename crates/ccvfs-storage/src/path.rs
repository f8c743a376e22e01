//! Path string helpers
//!
//! Virtual paths are plain strings using `/` as the separator regardless of
//! host platform.

use crate::{Result, StorageError};

/// Separator used by every virtual path
pub const SEPARATOR: char = '/';

/// Collapse repeated separators, drop `.` segments and resolve `..`.
///
/// A leading separator is preserved and a trailing one removed, so
/// `"/a//b/./c/"` becomes `"/a/b/c"` and `"/"` stays `"/"`. A `..` with
/// nothing left to pop is kept. A relative path that collapses to nothing,
/// such as `"a/.."`, becomes `"."`.
pub fn normalize_path(path: &str, sep: char) -> String {
    let normalized = normalize(path, sep, false);
    if normalized.is_empty() && !path.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}

/// Absolute, normalized form of a confinement root.
///
/// A relative root is anchored at the process working directory, so `"."`
/// and `"games/.."` both name the working directory rather than `/`.
pub fn absolute_root(root: &str) -> Result<String> {
    if root.trim().is_empty() {
        return Err(StorageError::InvalidPath(root.to_string()));
    }
    if root.starts_with(SEPARATOR) {
        return Ok(confine_path(root));
    }

    let cwd = std::env::current_dir()?;
    let cwd = cwd
        .to_str()
        .ok_or_else(|| StorageError::InvalidPath(cwd.display().to_string()))?;
    Ok(confine_path(&add_path_component(cwd, root)))
}

/// Normalize `path` as an absolute path that cannot climb above `/`.
///
/// Leading `..` segments are discarded instead of kept, so the result is
/// always `/` or a descendant of it.
pub fn confine_path(path: &str) -> String {
    let normalized = normalize(path, SEPARATOR, true);
    if normalized.starts_with(SEPARATOR) {
        normalized
    } else {
        format!("{SEPARATOR}{normalized}")
    }
}

fn normalize(path: &str, sep: char, clamp: bool) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut components: Vec<&str> = Vec::new();
    for component in path.split(sep) {
        match component {
            "" | "." => {}
            ".." if components.last().is_some_and(|c| *c != "..") => {
                components.pop();
            }
            ".." if clamp => {}
            other => components.push(other),
        }
    }

    let joined = components.join(&sep.to_string());
    if path.starts_with(sep) {
        format!("{sep}{joined}")
    } else {
        joined
    }
}

/// Join `component` onto `path` with exactly one separator between them.
///
/// ```rust
/// use ccvfs_storage::path::add_path_component;
///
/// assert_eq!(add_path_component("/games/foo/", "/bar.txt"), "/games/foo/bar.txt");
/// assert_eq!(add_path_component("/games/foo", "bar.txt"), "/games/foo/bar.txt");
/// ```
pub fn add_path_component(path: &str, component: &str) -> String {
    let path_ends = path.ends_with(SEPARATOR);
    let component_starts = component.starts_with(SEPARATOR);

    if path_ends && component_starts {
        format!("{path}{}", &component[SEPARATOR.len_utf8()..])
    } else if path.is_empty() || path_ends || component.is_empty() || component_starts {
        format!("{path}{component}")
    } else {
        format!("{path}{SEPARATOR}{component}")
    }
}

/// Final component of `path`, ignoring trailing separators.
///
/// Returns an empty string for a path made only of separators.
pub fn last_path_component(path: &str, sep: char) -> &str {
    let trimmed = path.trim_end_matches(sep);
    match trimmed.rfind(sep) {
        Some(i) => &trimmed[i + sep.len_utf8()..],
        None => trimmed,
    }
}
