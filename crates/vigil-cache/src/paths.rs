use std::path::{Path, PathBuf};
use vigil_common::VigilError;

/// `~/Library/Caches/vigil/scan-cache.json` (or the platform equivalent via
/// `dirs::cache_dir`) unless overridden (spec.md §6 "Persisted state layout").
pub fn default_cache_file() -> Result<PathBuf, VigilError> {
    let base = dirs::cache_dir().ok_or_else(|| VigilError::CacheIoError {
        detail: "could not determine the platform cache directory".to_string(),
    })?;
    Ok(base.join("vigil").join("scan-cache.json"))
}

pub fn resolve_cache_file(configured_dir: Option<&Path>) -> Result<PathBuf, VigilError> {
    match configured_dir {
        Some(dir) => Ok(dir.join("scan-cache.json")),
        None => default_cache_file(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_dir_overrides_the_platform_default() {
        let path = resolve_cache_file(Some(Path::new("/tmp/custom-cache"))).unwrap();
        assert_eq!(path, Path::new("/tmp/custom-cache/scan-cache.json"));
    }
}
