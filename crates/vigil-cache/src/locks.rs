use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

/// Per-path serialization for cache reads/writes (spec.md §4.4, §9
/// "Per-path lock map"). The teacher's dependency graph carries no
/// concurrent hash map crate, so this follows its own pattern of a plain
/// `std::sync::Mutex`-guarded map of per-key async mutexes
/// (`assay-registry::cache_next`'s per-pack boundary, generalized from a
/// directory-per-pack scheme to one lock per scanned path).
#[derive(Default)]
pub struct PathLocks {
    inner: StdMutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `path`, creating it on first use. Stale entries
    /// accumulate for the process lifetime of a single scan run, which is
    /// bounded by the number of distinct files scanned.
    pub fn get(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().expect("path lock map poisoned");
        map.entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
