//! Top-level scan entry point: walks each target, fans file-scanning work
//! out across a bounded pool, then runs the aggregate post-pass
//! (spec.md §4.5 "Orchestrator", modeled on
//! `assay-core::engine::runner_next::execute::run_suite_impl`'s
//! `Semaphore` + `JoinSet` pattern).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use vigil_cache::ScanCache;
use vigil_common::{Finding, ScanWarning, Target, TargetKind};
use vigil_engine::EngineOptions;
use vigil_rules::IndexedRuleEngine;
use vigil_safety::VisitedPaths;

use crate::budget::{FindingBudget, DEFAULT_MAX_TOTAL_FINDINGS};
use crate::chunk;
use crate::concurrency::{bounded_concurrency_limit, chunk_count, DEFAULT_PARALLEL_THRESHOLD};
use crate::events::{emit, EventSink, ScanEvent};
use crate::postpass;
use crate::scan_file::{scan_one_file, DEFAULT_MAX_FINDINGS_PER_FILE};
use crate::walk::collect_files;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub parallel_threshold: usize,
    pub max_findings_per_file: usize,
    pub max_total_findings: usize,
    pub engine: EngineOptions,
    pub enable_meta_dedup: bool,
    pub attach_confidence: bool,
    pub min_confidence: Option<f64>,
    pub fix: bool,
    pub include_binary: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_findings_per_file: DEFAULT_MAX_FINDINGS_PER_FILE,
            max_total_findings: DEFAULT_MAX_TOTAL_FINDINGS,
            engine: EngineOptions::default(),
            enable_meta_dedup: false,
            attach_confidence: false,
            min_confidence: None,
            fix: false,
            include_binary: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub path: String,
    pub kind: TargetKind,
    pub files_scanned: usize,
}

pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub warnings: Vec<ScanWarning>,
    pub scanned_files: usize,
    pub targets: Vec<TargetOutcome>,
    pub confidence_dropped: Option<usize>,
    pub fix_summaries: Vec<vigil_fix::FixSummary>,
}

/// Scans every target in order, respecting `cancel` between targets and
/// between chunks, then runs the aggregate post-pass over everything
/// collected so far (spec.md §4.5 "Post-pass", §5 "Cancellation").
pub async fn run_scan(
    targets: &[Target],
    rules: Arc<IndexedRuleEngine>,
    cache: Arc<ScanCache>,
    opts: &PipelineOptions,
    cancel: Arc<AtomicBool>,
    events: Option<EventSink>,
) -> ScanOutcome {
    let budget = Arc::new(FindingBudget::new(opts.max_total_findings));
    let visited = Arc::new(VisitedPaths::new());

    let mut all_findings = Vec::new();
    let mut warnings = Vec::new();
    let mut target_outcomes = Vec::new();
    let mut scanned_files = 0usize;

    for target in targets {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        if budget.is_exhausted() {
            warnings.push(ScanWarning {
                tag: "finding_budget_exceeded".into(),
                message: "global finding budget exhausted, skipping remaining targets".into(),
                file: None,
            });
            emit(events.as_ref(), ScanEvent::FindingBudgetExceeded);
            break;
        }

        let target_str = target.path.clone();
        emit(
            events.as_ref(),
            ScanEvent::TargetStarted {
                target: target_str.clone(),
            },
        );

        let files = collect_files(&PathBuf::from(&target.path), opts.include_binary);
        let (findings, file_warnings, scanned) = scan_files(
            files,
            Arc::clone(&rules),
            Arc::clone(&cache),
            Arc::clone(&visited),
            opts,
            Arc::clone(&budget),
            Arc::clone(&cancel),
            events.as_ref(),
        )
        .await;

        scanned_files += scanned;
        all_findings.extend(findings);
        warnings.extend(file_warnings);
        target_outcomes.push(TargetOutcome {
            path: target_str.clone(),
            kind: target.kind,
            files_scanned: scanned,
        });
        emit(
            events.as_ref(),
            ScanEvent::TargetFinished {
                target: target_str,
                files: scanned,
            },
        );
    }

    if opts.enable_meta_dedup {
        all_findings = postpass::dedup(all_findings);
    }
    if opts.attach_confidence {
        vigil_engine::attach_confidence(&mut all_findings);
    }

    let mut confidence_dropped = None;
    if let Some(min) = opts.min_confidence {
        let outcome = postpass::filter_by_confidence(all_findings, min);
        confidence_dropped = Some(outcome.dropped);
        all_findings = outcome.kept;
    }

    let fix_summaries = if opts.fix {
        postpass::run_fix_pass(&all_findings)
    } else {
        Vec::new()
    };

    if let Err(e) = cache.persist().await {
        tracing::warn!(error = %e, "failed to persist scan cache");
        warnings.push(ScanWarning::from_error(&e, None));
    }

    ScanOutcome {
        findings: all_findings,
        warnings,
        scanned_files,
        targets: target_outcomes,
        confidence_dropped,
        fix_summaries,
    }
}

/// Branches per spec.md §4.5 "Plan": a big file list is partitioned into
/// a handful of chunks scanned concurrently (each chunk's files scanned in
/// sequence, keeping per-task overhead low); a small one spawns one task
/// per file under a looser concurrency bound.
#[allow(clippy::too_many_arguments)]
async fn scan_files(
    files: Vec<PathBuf>,
    rules: Arc<IndexedRuleEngine>,
    cache: Arc<ScanCache>,
    visited: Arc<VisitedPaths>,
    opts: &PipelineOptions,
    budget: Arc<FindingBudget>,
    cancel: Arc<AtomicBool>,
    events: Option<&EventSink>,
) -> (Vec<Finding>, Vec<ScanWarning>, usize) {
    let engine_opts = Arc::new(opts.engine.clone());
    let max_per_file = opts.max_findings_per_file;

    if files.len() >= opts.parallel_threshold {
        let n = chunk_count(files.len());
        let chunks = chunk::partition(files, n);
        let mut join_set = JoinSet::new();

        for group in chunks {
            let rules = Arc::clone(&rules);
            let cache = Arc::clone(&cache);
            let visited = Arc::clone(&visited);
            let engine_opts = Arc::clone(&engine_opts);
            let budget = Arc::clone(&budget);
            let cancel = Arc::clone(&cancel);

            join_set.spawn(async move {
                let mut findings = Vec::new();
                let mut warnings = Vec::new();
                let mut scanned = 0usize;
                for path in group {
                    if cancel.load(Ordering::SeqCst) || budget.is_exhausted() {
                        break;
                    }
                    let outcome = scan_one_file(
                        &path,
                        &visited,
                        &rules,
                        &cache,
                        &engine_opts,
                        max_per_file,
                        &budget,
                    )
                    .await;
                    if outcome.scanned {
                        scanned += 1;
                    }
                    findings.extend(outcome.findings);
                    warnings.extend(outcome.warnings);
                }
                (findings, warnings, scanned)
            });
        }

        collect_join_results(join_set, events).await
    } else {
        let limit = bounded_concurrency_limit();
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut join_set = JoinSet::new();

        for path in files {
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            let rules = Arc::clone(&rules);
            let cache = Arc::clone(&cache);
            let visited = Arc::clone(&visited);
            let engine_opts = Arc::clone(&engine_opts);
            let budget = Arc::clone(&budget);

            join_set.spawn(async move {
                let _permit = permit;
                let outcome = scan_one_file(
                    &path,
                    &visited,
                    &rules,
                    &cache,
                    &engine_opts,
                    max_per_file,
                    &budget,
                )
                .await;
                let scanned = usize::from(outcome.scanned);
                (outcome.findings, outcome.warnings, scanned)
            });
        }

        collect_join_results(join_set, events).await
    }
}

async fn collect_join_results(
    mut join_set: JoinSet<(Vec<Finding>, Vec<ScanWarning>, usize)>,
    events: Option<&EventSink>,
) -> (Vec<Finding>, Vec<ScanWarning>, usize) {
    let mut findings = Vec::new();
    let mut warnings = Vec::new();
    let mut scanned = 0usize;

    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((f, w, s)) => {
                scanned += s;
                for warning in &w {
                    emit(events, ScanEvent::Warning(warning.clone()));
                }
                findings.extend(f);
                warnings.extend(w);
            }
            Err(e) => {
                warnings.push(ScanWarning {
                    tag: "task_panicked".into(),
                    message: format!("a scan task did not complete: {e}"),
                    file: None,
                });
            }
        }
    }

    (findings, warnings, scanned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_cache::CacheConfig;
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

    #[tokio::test]
    async fn scans_a_small_target_and_finds_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "needle\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "clean\n").unwrap();

        let rules = Arc::new(IndexedRuleEngine::build(RuleCatalog::load(
            "- id: R1\n  category: test\n  severity: HIGH\n  patterns: [\"needle\"]\n  file_types: [\"any\"]\n",
        )));
        let cache = Arc::new(test_cache(dir.path()).await);
        let cancel = Arc::new(AtomicBool::new(false));

        let target = Target::new(TargetKind::Path, "t", dir.path().display().to_string());
        let outcome = run_scan(
            std::slice::from_ref(&target),
            rules,
            cache,
            &PipelineOptions::default(),
            cancel,
            None,
        )
        .await;

        assert_eq!(outcome.scanned_files, 2);
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].rule_id, "R1");
    }

    #[tokio::test]
    async fn cancellation_before_any_target_yields_an_empty_outcome() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "needle\n").unwrap();

        let rules = Arc::new(IndexedRuleEngine::build(RuleCatalog::load("")));
        let cache = Arc::new(test_cache(dir.path()).await);
        let cancel = Arc::new(AtomicBool::new(true));

        let target = Target::new(TargetKind::Path, "t", dir.path().display().to_string());
        let outcome = run_scan(
            std::slice::from_ref(&target),
            rules,
            cache,
            &PipelineOptions::default(),
            cancel,
            None,
        )
        .await;

        assert_eq!(outcome.scanned_files, 0);
        assert!(outcome.findings.is_empty());
    }

    #[tokio::test]
    async fn large_target_takes_the_chunked_branch() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..20 {
            std::fs::write(dir.path().join(format!("f{i}.py")), "needle\n").unwrap();
        }

        let rules = Arc::new(IndexedRuleEngine::build(RuleCatalog::load(
            "- id: R1\n  category: test\n  severity: HIGH\n  patterns: [\"needle\"]\n  file_types: [\"any\"]\n",
        )));
        let cache = Arc::new(test_cache(dir.path()).await);
        let cancel = Arc::new(AtomicBool::new(false));

        let target = Target::new(TargetKind::Path, "t", dir.path().display().to_string());
        let outcome = run_scan(
            std::slice::from_ref(&target),
            rules,
            cache,
            &PipelineOptions::default(),
            cancel,
            None,
        )
        .await;

        assert_eq!(outcome.scanned_files, 20);
        assert_eq!(outcome.findings.len(), 20);
    }
}
