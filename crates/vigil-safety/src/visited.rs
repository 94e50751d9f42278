use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// Tracks symlink targets already visited during the current scan, so a
/// circular symlink chain is detected rather than followed forever.
/// Reset once per scan root; concurrent insertions are synchronized
/// (spec.md §4.1, §5 "Shared resources").
#[derive(Default)]
pub struct VisitedPaths {
    seen: Mutex<HashSet<PathBuf>>,
}

impl VisitedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Returns `true` if `path` had not been seen before (and records it).
    pub fn visit(&self, path: &std::path::Path) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_path_buf())
    }
}
