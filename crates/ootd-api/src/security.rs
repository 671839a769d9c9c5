//! Input sanitization for caller-supplied media paths.
//!
//! Assembly requests name files relative to the media root. Anything that
//! could step outside of it is rejected before the path reaches a process.

use std::path::{Component, Path, PathBuf};

/// Maximum accepted length of a relative media path.
pub const MAX_MEDIA_PATH_LENGTH: usize = 512;

/// Why a media path was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPathError {
    Empty,
    TooLong,
    Absolute,
    ParentTraversal,
    InvalidCharacter,
}

impl std::fmt::Display for MediaPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            MediaPathError::Empty => "path is empty",
            MediaPathError::TooLong => "path is too long",
            MediaPathError::Absolute => "path must be relative to the media root",
            MediaPathError::ParentTraversal => "path must not contain '..'",
            MediaPathError::InvalidCharacter => "path contains control characters",
        };
        f.write_str(reason)
    }
}

/// Resolve `relative` under `root`, refusing anything that escapes it.
pub fn resolve_media_path(root: &Path, relative: &str) -> Result<PathBuf, MediaPathError> {
    let relative = relative.trim();
    if relative.is_empty() {
        return Err(MediaPathError::Empty);
    }
    if relative.len() > MAX_MEDIA_PATH_LENGTH {
        return Err(MediaPathError::TooLong);
    }
    if relative.chars().any(|c| c.is_control()) {
        return Err(MediaPathError::InvalidCharacter);
    }
    // Windows-style separators are treated as traversal attempts too
    if relative.contains('\\') && relative.split('\\').any(|part| part == "..") {
        return Err(MediaPathError::ParentTraversal);
    }

    let mut resolved = root.to_path_buf();
    let mut pushed = false;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(MediaPathError::ParentTraversal),
            Component::RootDir | Component::Prefix(_) => return Err(MediaPathError::Absolute),
        }
    }

    if !pushed {
        return Err(MediaPathError::Empty);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_under_root() {
        let root = Path::new("/srv/media");
        assert_eq!(
            resolve_media_path(root, "sources/abc.mp4").unwrap(),
            PathBuf::from("/srv/media/sources/abc.mp4")
        );
        assert_eq!(
            resolve_media_path(root, "./final/abc.mp4").unwrap(),
            PathBuf::from("/srv/media/final/abc.mp4")
        );
    }

    #[test]
    fn test_rejects_escapes() {
        let root = Path::new("/srv/media");
        assert_eq!(resolve_media_path(root, ""), Err(MediaPathError::Empty));
        assert_eq!(resolve_media_path(root, "  "), Err(MediaPathError::Empty));
        assert_eq!(resolve_media_path(root, "."), Err(MediaPathError::Empty));
        assert_eq!(resolve_media_path(root, "/etc/passwd"), Err(MediaPathError::Absolute));
        assert_eq!(
            resolve_media_path(root, "sources/../../etc/passwd"),
            Err(MediaPathError::ParentTraversal)
        );
        assert_eq!(
            resolve_media_path(root, "..\\secrets.mp4"),
            Err(MediaPathError::ParentTraversal)
        );
        assert_eq!(
            resolve_media_path(root, "a\nb.mp4"),
            Err(MediaPathError::InvalidCharacter)
        );
        assert_eq!(
            resolve_media_path(root, &"a".repeat(600)),
            Err(MediaPathError::TooLong)
        );
    }
}
