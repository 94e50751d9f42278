use std::path::{Component, Path, PathBuf};

/// Strip null bytes, expand a leading `~`/`~/`, normalize `.`/`..` segments,
/// and convert to an absolute path. Idempotent: `sanitize(sanitize(p)) ==
/// sanitize(p)` for all non-empty `p` (spec.md §8 invariant 1).
pub fn sanitize_path(input: &str) -> PathBuf {
    let no_nulls: String = input.chars().filter(|&c| c != '\0').collect();

    let expanded = expand_home(&no_nulls);

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(expanded)
    };

    normalize(&absolute)
}

fn expand_home(input: &str) -> PathBuf {
    if input == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Resolve `.`/`..` components lexically (no filesystem access, so this also
/// works for paths that don't exist yet).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::RootDir);
    }
    out
}
