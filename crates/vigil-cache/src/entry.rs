use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_common::Finding;

/// A single cached file's findings, keyed externally by absolute path
/// (spec.md §4.4 "Key: absolute file path. Value: {sha256, findings,
/// timestamp, rule_version}").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub sha256: String,
    pub findings: Vec<Finding>,
    pub timestamp: DateTime<Utc>,
    pub rule_version: String,
}

impl CacheEntry {
    pub fn is_stale(&self, rule_version: &str, ttl_secs: i64) -> bool {
        if self.rule_version != rule_version {
            return true;
        }
        let age = Utc::now().signed_duration_since(self.timestamp);
        age.num_seconds() >= ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rule_version: &str, age_secs: i64) -> CacheEntry {
        CacheEntry {
            sha256: "abc".into(),
            findings: vec![],
            timestamp: Utc::now() - chrono::Duration::seconds(age_secs),
            rule_version: rule_version.into(),
        }
    }

    #[test]
    fn fresh_entry_with_matching_version_is_not_stale() {
        assert!(!entry("v1", 5).is_stale("v1", 3600));
    }

    #[test]
    fn mismatched_rule_version_is_always_stale() {
        assert!(entry("v1", 0).is_stale("v2", 3600));
    }

    #[test]
    fn entry_older_than_ttl_is_stale() {
        assert!(entry("v1", 7200).is_stale("v1", 3600));
    }
}
