//! Per-file scan: safety checks, cache-first lookup, engine dispatch, and
//! the per-file finding cap (spec.md §4.5 "Scan one file").

use std::path::Path;

use vigil_common::{FileType, Finding, ScanWarning, VigilError};
use vigil_engine::{scan_content, EngineOptions};
use vigil_rules::IndexedRuleEngine;
use vigil_safety::{check_size, is_binary, is_safe_path, VisitedPaths, MAX_SCAN_BYTES};

use crate::budget::FindingBudget;

pub const DEFAULT_MAX_FINDINGS_PER_FILE: usize = 100;

pub struct FileScanOutcome {
    pub findings: Vec<Finding>,
    pub warnings: Vec<ScanWarning>,
    /// Whether the file actually reached the engine (false for anything
    /// rejected or skipped before that point).
    pub scanned: bool,
}

/// Safety-checks, reads, and scans a single file, consulting the cache
/// first and writing results back on a miss. Never returns `Err`: every
/// rejection becomes a `ScanWarning` and an empty outcome, per spec.md §7
/// ("per-file failures never abort a run").
pub async fn scan_one_file(
    path: &Path,
    visited: &VisitedPaths,
    rules: &IndexedRuleEngine,
    cache: &vigil_cache::ScanCache,
    engine_opts: &EngineOptions,
    max_findings_per_file: usize,
    budget: &FindingBudget,
) -> FileScanOutcome {
    let file_str = path.to_string_lossy().to_string();
    let mut warnings = Vec::new();

    if let Err(e) = is_safe_path(path, None, visited) {
        warnings.push(ScanWarning::from_error(&e, Some(file_str)));
        return FileScanOutcome {
            findings: Vec::new(),
            warnings,
            scanned: false,
        };
    }

    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) => {
            warnings.push(ScanWarning::from_error(
                &VigilError::PathUnsafe {
                    reason: format!("stat failed: {e}"),
                },
                Some(file_str),
            ));
            return FileScanOutcome {
                findings: Vec::new(),
                warnings,
                scanned: false,
            };
        }
    };

    if let Err(e) = check_size(metadata.len(), MAX_SCAN_BYTES) {
        warnings.push(ScanWarning::from_error(&e, Some(file_str)));
        return FileScanOutcome {
            findings: Vec::new(),
            warnings,
            scanned: false,
        };
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) => {
            warnings.push(ScanWarning::from_error(
                &VigilError::PathUnsafe {
                    reason: format!("read failed: {e}"),
                },
                Some(file_str),
            ));
            return FileScanOutcome {
                findings: Vec::new(),
                warnings,
                scanned: false,
            };
        }
    };

    if is_binary(&bytes) {
        // Binary content is skipped silently (spec.md §4.1, §8 invariant 7).
        return FileScanOutcome {
            findings: Vec::new(),
            warnings,
            scanned: false,
        };
    }

    if let Some(cached) = cache.get_cached(path, &rules.version).await {
        let (findings, truncated) = cap_findings(cached, max_findings_per_file);
        if truncated {
            warnings.push(truncation_warning(&file_str, max_findings_per_file));
        }
        let (kept, warn) = reserve_against_budget(findings, budget, &file_str);
        warnings.extend(warn);
        return FileScanOutcome {
            findings: kept,
            warnings,
            scanned: true,
        };
    }

    let content = String::from_utf8_lossy(&bytes).into_owned();
    let file_type = FileType::detect(path);
    let outcome = scan_content(rules, &content, &file_str, &file_type, engine_opts);

    for rule_id in &outcome.timed_out_rules {
        warnings.push(ScanWarning::from_error(
            &VigilError::RegexTimeout {
                rule_id: rule_id.clone(),
            },
            Some(file_str.clone()),
        ));
    }

    cache
        .set_cached(path, outcome.findings.clone(), &rules.version)
        .await;

    let (findings, truncated) = cap_findings(outcome.findings, max_findings_per_file);
    if truncated {
        warnings.push(truncation_warning(&file_str, max_findings_per_file));
    }

    let (kept, warn) = reserve_against_budget(findings, budget, &file_str);
    warnings.extend(warn);

    FileScanOutcome {
        findings: kept,
        warnings,
        scanned: true,
    }
}

fn cap_findings(mut findings: Vec<Finding>, max: usize) -> (Vec<Finding>, bool) {
    let truncated = findings.len() > max;
    findings.truncate(max);
    (findings, truncated)
}

fn truncation_warning(file: &str, cap: usize) -> ScanWarning {
    ScanWarning {
        tag: "findings_truncated".into(),
        message: format!("findings truncated to {cap} for this file"),
        file: Some(file.to_string()),
    }
}

/// Reserves budget slots for `findings` and drops any that don't fit,
/// emitting one warning if the global cap clipped this file's results.
fn reserve_against_budget(
    findings: Vec<Finding>,
    budget: &FindingBudget,
    file: &str,
) -> (Vec<Finding>, Vec<ScanWarning>) {
    let granted = budget.reserve(findings.len());
    if granted >= findings.len() {
        return (findings, Vec::new());
    }

    let mut warnings = Vec::new();
    if granted < findings.len() {
        warnings.push(ScanWarning {
            tag: "finding_budget_exceeded".into(),
            message: "global finding budget reached while scanning this file".into(),
            file: Some(file.to_string()),
        });
    }
    let mut findings = findings;
    findings.truncate(granted);
    (findings, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_cache::{CacheConfig, ScanCache};
    use vigil_rules::RuleCatalog;

    async fn test_cache(dir: &std::path::Path) -> ScanCache {
        ScanCache::load(
            CacheConfig {
                dir: Some(dir.to_path_buf()),
                ..CacheConfig::default()
            },
            "v1",
        )
        .await
    }

    fn engine() -> IndexedRuleEngine {
        IndexedRuleEngine::build(RuleCatalog::load(
            "- id: R1\n  category: test\n  severity: HIGH\n  patterns: [\"needle\"]\n  file_types: [\"any\"]\n",
        ))
    }

    #[tokio::test]
    async fn binary_files_are_skipped_without_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.bin");
        std::fs::write(&file, [0u8, 1, 2, 3]).unwrap();

        let cache = test_cache(dir.path()).await;
        let visited = VisitedPaths::new();
        let budget = FindingBudget::new(1000);
        let outcome = scan_one_file(
            &file,
            &visited,
            &engine(),
            &cache,
            &EngineOptions::default(),
            100,
            &budget,
        )
        .await;

        assert!(!outcome.scanned);
        assert!(outcome.findings.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn matching_content_produces_a_finding() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "needle\n").unwrap();

        let cache = test_cache(dir.path()).await;
        let visited = VisitedPaths::new();
        let budget = FindingBudget::new(1000);
        let outcome = scan_one_file(
            &file,
            &visited,
            &engine(),
            &cache,
            &EngineOptions::default(),
            100,
            &budget,
        )
        .await;

        assert!(outcome.scanned);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].rule_id, "R1");
    }

    #[tokio::test]
    async fn exhausted_budget_drops_findings_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "needle\n").unwrap();

        let cache = test_cache(dir.path()).await;
        let visited = VisitedPaths::new();
        let budget = FindingBudget::new(0);
        let outcome = scan_one_file(
            &file,
            &visited,
            &engine(),
            &cache,
            &EngineOptions::default(),
            100,
            &budget,
        )
        .await;

        assert!(outcome.findings.is_empty());
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.tag == "finding_budget_exceeded"));
    }

    #[tokio::test]
    async fn missing_file_yields_a_warning_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.py");

        let cache = test_cache(dir.path()).await;
        let visited = VisitedPaths::new();
        let budget = FindingBudget::new(1000);
        let outcome = scan_one_file(
            &file,
            &visited,
            &engine(),
            &cache,
            &EngineOptions::default(),
            100,
            &budget,
        )
        .await;

        assert!(!outcome.scanned);
        assert_eq!(outcome.warnings[0].tag, "path_unsafe");
    }
}
