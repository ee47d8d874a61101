//! Lexical path normalization used as source file identity.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path without touching the file system.
///
/// Relative paths are made absolute against the current directory, `.`
/// components are dropped and `..` removes the preceding component. Symlinks
/// are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
