use std::path::PathBuf;

pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Eviction and location policy for the cache, sourced from the
/// `SCANNER_CACHE_*` environment variables by the CLI layer (spec.md §6)
/// and passed down already-resolved so this crate stays free of env lookups.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: Option<PathBuf>,
    pub ttl_secs: i64,
    pub max_entries: usize,
    pub max_size_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}
