//! Lexical path normalization.
//!
//! Import candidates are compared and indexed as absolute paths, but they
//! may not exist on disk yet (synthetic units, unresolved imports), so
//! normalization must not touch the filesystem.

use std::path::{Component, Path, PathBuf};

/// Absolutize and lexically clean a path: `.` segments are dropped and
/// `..` pops the previous component. No symlink resolution.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// The file name of a path as a `String`, empty if there is none.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_dot_segments() {
        assert_eq!(
            normalize_path(Path::new("/a/b/./c/../d.sol")),
            PathBuf::from("/a/b/d.sol")
        );
    }

    #[test]
    fn test_normalize_keeps_absolute_root() {
        assert_eq!(
            normalize_path(Path::new("/a/../../x.sol")),
            PathBuf::from("/x.sol")
        );
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename(Path::new("/a/b/Token.sol")), "Token.sol");
        assert_eq!(basename(Path::new("/")), "");
    }
}
