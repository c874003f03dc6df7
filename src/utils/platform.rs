//! Path helpers for values stored in the manifest.
//!
//! Manifest `file` values are always relative to the manifest directory and
//! always use forward slashes, so the manifest stays portable when the project
//! is moved or checked out on another platform.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path for storage by converting all separators to forward slashes.
///
/// Use this for every path written into the manifest. For user-facing output,
/// `Path::display()` is preferred.
#[must_use]
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Lexically normalizes a path, resolving `.` and `..` without touching the filesystem.
///
/// Leading `..` components of a relative path are kept.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Computes `target` relative to `base`, lexically.
///
/// Both paths are normalized first. When they share no common prefix (e.g.
/// different drives on Windows) the normalized `target` is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use superface_cli::utils::platform::relative_path;
/// use std::path::Path;
///
/// let rel = relative_path(Path::new("/p/superface"), Path::new("/p/profiles/a.supr"));
/// assert_eq!(rel, Path::new("../profiles/a.supr"));
/// ```
#[must_use]
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = normalize_path(base);
    let target = normalize_path(target);

    let base_components: Vec<_> = base.components().collect();
    let target_components: Vec<_> = target.components().collect();

    let common = base_components
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let shares_root = match (base_components.first(), target_components.first()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    if common == 0 && !shares_root {
        return target;
    }

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_for_storage() {
        assert_eq!(normalize_path_for_storage(Path::new("..\\maps\\a.suma")), "../maps/a.suma");
        assert_eq!(normalize_path_for_storage(Path::new("../maps/a.suma")), "../maps/a.suma");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_path(Path::new("../x/../y")), PathBuf::from("../y"));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_relative_path_sibling() {
        let rel = relative_path(Path::new("/p/superface"), Path::new("/p/profiles/a.supr"));
        assert_eq!(rel, PathBuf::from("../profiles/a.supr"));
    }

    #[test]
    fn test_relative_path_inside() {
        let rel = relative_path(Path::new("/p/superface"), Path::new("/p/superface/grid/a.supr"));
        assert_eq!(rel, PathBuf::from("grid/a.supr"));
    }

    #[test]
    fn test_relative_path_with_dot_segments() {
        let rel = relative_path(Path::new("/p/./superface"), Path::new("/p/x/../a.supr"));
        assert_eq!(rel, PathBuf::from("../a.supr"));
    }

    #[test]
    fn test_relative_path_same_dir() {
        let rel = relative_path(Path::new("/p"), Path::new("/p"));
        assert_eq!(rel, PathBuf::new());
    }
}
