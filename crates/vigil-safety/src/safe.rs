use crate::visited::VisitedPaths;
use std::path::Path;
use vigil_common::VigilError;

/// `stat`s `path` without following symlinks and classifies it unsafe when:
/// a circular symlink (already visited this scan), a symlink resolving
/// outside `root`, a broken symlink, a special file (device/socket/pipe),
/// permission denied, or missing (spec.md §4.1).
pub fn is_safe_path(
    path: &Path,
    root: Option<&Path>,
    visited: &VisitedPaths,
) -> Result<(), VigilError> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VigilError::PathUnsafe {
                reason: "missing".into(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(VigilError::PathUnsafe {
                reason: "permission denied".into(),
            })
        }
        Err(e) => {
            return Err(VigilError::PathUnsafe {
                reason: format!("stat failed: {e}"),
            })
        }
    };

    let file_type = meta.file_type();

    if file_type.is_symlink() {
        if !visited.visit(path) {
            return Err(VigilError::PathUnsafe {
                reason: "circular symlink".into(),
            });
        }

        let target = match std::fs::canonicalize(path) {
            Ok(t) => t,
            Err(_) => {
                return Err(VigilError::PathUnsafe {
                    reason: "broken symlink".into(),
                })
            }
        };

        if let Some(root) = root {
            let canonical_root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
            if !target.starts_with(&canonical_root) {
                return Err(VigilError::PathUnsafe {
                    reason: "symlink escapes root".into(),
                });
            }
        }

        return is_safe_path(&target, root, visited);
    }

    if !file_type.is_file() && !file_type.is_dir() {
        return Err(VigilError::PathUnsafe {
            reason: "special file (device/socket/pipe)".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_path_is_unsafe() {
        let visited = VisitedPaths::new();
        let err = is_safe_path(Path::new("/definitely/does/not/exist"), None, &visited)
            .expect_err("missing path should be unsafe");
        assert_eq!(err.tag(), "path_unsafe");
    }

    #[test]
    fn plain_file_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();
        let visited = VisitedPaths::new();
        assert!(is_safe_path(&file, None, &visited).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_outside_root_is_unsafe() {
        use std::os::unix::fs::symlink;

        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("secret.txt");
        fs::write(&target, b"secret").unwrap();

        let link = root.path().join("link.txt");
        symlink(&target, &link).unwrap();

        let visited = VisitedPaths::new();
        let err = is_safe_path(&link, Some(root.path()), &visited)
            .expect_err("symlink escaping root should be unsafe");
        assert_eq!(err.tag(), "path_unsafe");
    }

    #[cfg(unix)]
    #[test]
    fn circular_symlink_is_detected() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        symlink(&b, &a).unwrap();
        symlink(&a, &b).unwrap();

        let visited = VisitedPaths::new();
        // First hop records `a`, follows to `b`; second hop should detect the
        // cycle once `b` (or `a` again) reappears.
        let result = is_safe_path(&a, None, &visited);
        assert!(result.is_err());
    }
}
