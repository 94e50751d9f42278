//! Recursive file enumeration honoring the skip-dir blacklist and the
//! file-type allowlist (spec.md §4.5 "Plan").

use std::path::{Path, PathBuf};

use vigil_safety::{is_safe_path, VisitedPaths};

const SKIP_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "__pycache__"];
const ARCHIVE_EXTENSIONS: &[&str] = &["crx", "xpi", "zip"];
const ALLOWED_EXTENSIONS: &[&str] = &[
    "md", "mdx", "json", "py", "rs", "c", "cc", "cpp", "h", "hpp", "java", "rb", "go", "ts", "tsx",
    "js", "jsx", "mjs", "cjs", "sh", "bash", "zsh", "yml", "yaml",
];
const ALLOWED_BASENAMES: &[&str] = &["SKILL.md", "manifest.json", "package.json"];
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "woff", "woff2", "ttf", "otf", "wasm",
];

/// Walk `root`, skipping blacklisted directory names at every depth and
/// archive-like files unconditionally. `include_binary` widens the
/// allowlist to the binary extensions, for when the loaded rule set
/// carries rules indexed under `FileType::Binary`.
pub fn collect_files(root: &Path, include_binary: bool) -> Vec<PathBuf> {
    let visited = VisitedPaths::new();
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(e) => e,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if is_safe_path(&path, Some(root), &visited).is_err() {
                continue;
            }

            if path.is_dir() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if SKIP_DIRS.contains(&name) {
                    continue;
                }
                stack.push(path);
                continue;
            }

            if is_allowed_file(&path, include_binary) {
                out.push(path);
            }
        }
    }

    out
}

fn is_allowed_file(path: &Path, include_binary: bool) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if let Some(e) = &ext {
        if ARCHIVE_EXTENSIONS.contains(&e.as_str()) {
            return false;
        }
    }

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if ALLOWED_BASENAMES.contains(&name) {
            return true;
        }
    }

    match ext.as_deref() {
        Some(e) if ALLOWED_EXTENSIONS.contains(&e) => true,
        Some(e) if include_binary && BINARY_EXTENSIONS.contains(&e) => true,
        _ => false,
    }
}
