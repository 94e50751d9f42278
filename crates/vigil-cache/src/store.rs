use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::hash::hash_file_or_synth;
use crate::locks::PathLocks;
use crate::paths::resolve_cache_file;
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use vigil_common::{Finding, VigilError};

/// Content-addressed per-file result cache (spec.md §4.4). A single logical
/// owner with internal locking, safe for concurrent use from the scan pool
/// (spec.md §5 "Shared resources").
pub struct ScanCache {
    file_path: PathBuf,
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
    locks: PathLocks,
    dirty: AtomicBool,
}

impl ScanCache {
    /// Read the persisted map, dropping entries whose `rule_version` differs
    /// from the live catalog's or whose age exceeds the TTL (spec.md §4.4
    /// "Load"). A missing or corrupt cache file starts empty rather than
    /// failing the run.
    pub async fn load(config: CacheConfig, rule_version: &str) -> Self {
        let file_path = match resolve_cache_file(config.dir.as_deref()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "could not resolve cache path, caching disabled for this run");
                PathBuf::new()
            }
        };

        let mut entries = HashMap::new();
        if !file_path.as_os_str().is_empty() {
            if let Ok(bytes) = tokio::fs::read(&file_path).await {
                match serde_json::from_slice::<HashMap<String, CacheEntry>>(&bytes) {
                    Ok(loaded) => {
                        entries = loaded
                            .into_iter()
                            .filter(|(_, entry)| !entry.is_stale(rule_version, config.ttl_secs))
                            .collect();
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "cache file is corrupt, starting with an empty cache");
                    }
                }
            }
        }

        Self {
            file_path,
            config,
            entries: Mutex::new(entries),
            locks: PathLocks::new(),
            dirty: AtomicBool::new(false),
        }
    }

    /// Await the per-path lock, then check rule version, age, and content
    /// hash; a mismatch on any of them evicts the entry and misses
    /// (spec.md §4.4 "Read").
    pub async fn get_cached(&self, path: &Path, rule_version: &str) -> Option<Vec<Finding>> {
        let key = path.to_string_lossy().to_string();
        let path_lock = self.locks.get(path);
        let _guard = path_lock.lock().await;

        let candidate = {
            let entries = self.entries.lock().await;
            entries.get(&key).cloned()?
        };

        if candidate.is_stale(rule_version, self.config.ttl_secs) {
            self.entries.lock().await.remove(&key);
            return None;
        }

        let current_hash = hash_file_or_synth(path).await;
        if current_hash != candidate.sha256 {
            self.entries.lock().await.remove(&key);
            return None;
        }

        Some(candidate.findings)
    }

    /// Acquire the per-path lock, hash the file, evict under the entry-count
    /// or byte-budget cap if needed, then insert (spec.md §4.4 "Write").
    pub async fn set_cached(&self, path: &Path, findings: Vec<Finding>, rule_version: &str) {
        let key = path.to_string_lossy().to_string();
        let path_lock = self.locks.get(path);
        let _guard = path_lock.lock().await;

        let sha256 = hash_file_or_synth(path).await;
        let entry = CacheEntry {
            sha256,
            findings,
            timestamp: Utc::now(),
            rule_version: rule_version.to_string(),
        };

        let mut entries = self.entries.lock().await;
        evict_until_within_budget(&mut entries, &self.config, Some(&key));
        entries.insert(key, entry);
        self.dirty.store(true, Ordering::Release);
    }

    /// Write the map to disk atomically if dirty (spec.md §4.4 "Persist").
    /// Failure is logged, never propagated.
    pub async fn persist(&self) -> Result<(), VigilError> {
        if !self.dirty.load(Ordering::Acquire) || self.file_path.as_os_str().is_empty() {
            return Ok(());
        }

        let entries = self.entries.lock().await;
        let json = serde_json::to_vec_pretty(&*entries).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to serialize cache: {e}"),
        })?;
        drop(entries);

        if let Some(parent) = self.file_path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return Err(VigilError::CacheIoError {
                    detail: format!("failed to create cache directory: {e}"),
                });
            }
        }

        let temp_path = self.file_path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| VigilError::CacheIoError {
                detail: format!("failed to write temp cache file: {e}"),
            })?;
        tokio::fs::rename(&temp_path, &self.file_path)
            .await
            .map_err(|e| VigilError::CacheIoError {
                detail: format!("failed to rename temp cache file: {e}"),
            })?;

        self.dirty.store(false, Ordering::Release);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Evict the entry with the oldest timestamp while the map is at or over
/// either cap, skipping `protect` (the key about to be (re-)inserted) so a
/// write never evicts its own target (spec.md §4.4 "LRU-by-creation").
fn evict_until_within_budget(
    entries: &mut HashMap<String, CacheEntry>,
    config: &CacheConfig,
    protect: Option<&str>,
) {
    loop {
        let over_count = entries.len() + usize::from(protect.map(|k| !entries.contains_key(k)).unwrap_or(true)) > config.max_entries;
        let estimated_bytes = estimate_size(entries);
        let over_size = estimated_bytes >= config.max_size_bytes;
        if !over_count && !over_size {
            return;
        }

        let oldest_key = entries
            .iter()
            .filter(|(k, _)| Some(k.as_str()) != protect)
            .min_by_key(|(_, e)| e.timestamp)
            .map(|(k, _)| k.clone());

        match oldest_key {
            Some(k) => {
                entries.remove(&k);
            }
            None => return,
        }
    }
}

fn estimate_size(entries: &HashMap<String, CacheEntry>) -> u64 {
    entries
        .values()
        .map(|e| serde_json::to_vec(e).map(|v| v.len() as u64).unwrap_or(0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::{FindingSource, Severity};

    fn sample_finding() -> Finding {
        Finding {
            rule_id: "R1".into(),
            severity: Severity::High,
            message: "m".into(),
            file: "/a.py".into(),
            line: Some(1),
            category: None,
            remediation: None,
            source: FindingSource::Signature,
            confidence: None,
            confidence_reason: None,
        }
    }

    async fn cache_at(dir: &Path) -> ScanCache {
        let config = CacheConfig {
            dir: Some(dir.to_path_buf()),
            ..Default::default()
        };
        ScanCache::load(config, "v1").await
    }

    #[tokio::test]
    async fn round_trip_hit_for_unchanged_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.py");
        tokio::fs::write(&file, b"print(1)").await.unwrap();
        let cache = cache_at(tmp.path()).await;

        cache.set_cached(&file, vec![sample_finding()], "v1").await;
        let hit = cache.get_cached(&file, "v1").await;
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn miss_after_the_file_is_modified() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.py");
        tokio::fs::write(&file, b"print(1)").await.unwrap();
        let cache = cache_at(tmp.path()).await;

        cache.set_cached(&file, vec![sample_finding()], "v1").await;
        tokio::fs::write(&file, b"print(2)").await.unwrap();
        assert!(cache.get_cached(&file, "v1").await.is_none());
    }

    #[tokio::test]
    async fn miss_when_rule_version_changed() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.py");
        tokio::fs::write(&file, b"print(1)").await.unwrap();
        let cache = cache_at(tmp.path()).await;

        cache.set_cached(&file, vec![sample_finding()], "v1").await;
        assert!(cache.get_cached(&file, "v2").await.is_none());
    }

    #[tokio::test]
    async fn persist_and_reload_round_trips_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.py");
        tokio::fs::write(&file, b"print(1)").await.unwrap();
        let cache = cache_at(tmp.path()).await;
        cache.set_cached(&file, vec![sample_finding()], "v1").await;
        cache.persist().await.unwrap();

        let reloaded = cache_at(tmp.path()).await;
        assert_eq!(reloaded.len().await, 1);
    }

    #[tokio::test]
    async fn eviction_respects_max_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            dir: Some(tmp.path().to_path_buf()),
            max_entries: 2,
            ..Default::default()
        };
        let cache = ScanCache::load(config, "v1").await;

        for i in 0..3 {
            let file = tmp.path().join(format!("f{i}.py"));
            tokio::fs::write(&file, format!("x{i}")).await.unwrap();
            cache.set_cached(&file, vec![sample_finding()], "v1").await;
        }

        assert!(cache.len().await <= 2);
    }
}
