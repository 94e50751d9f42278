//! Post-scan passes: meta-dedup, confidence attachment/filtering, and the
//! fix pass, run once over the aggregated finding set (spec.md §4.5
//! "Post-pass", §3).

use std::collections::HashSet;

use vigil_common::Finding;
use vigil_fix::FixSummary;

/// Drops findings whose `(rule_id, file, line, message)` key repeats,
/// keeping the first occurrence (spec.md §8 invariant 2).
pub fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|f| seen.insert(f.dedup_key()))
        .collect()
}

pub struct ConfidenceFilterOutcome {
    pub kept: Vec<Finding>,
    pub dropped: usize,
}

/// Drops findings whose attached confidence is below `min_confidence`.
/// A finding with no confidence score (confidence scoring disabled) is
/// always kept.
pub fn filter_by_confidence(findings: Vec<Finding>, min_confidence: f64) -> ConfidenceFilterOutcome {
    let total = findings.len();
    let kept: Vec<Finding> = findings
        .into_iter()
        .filter(|f| f.confidence.map(|c| c >= min_confidence).unwrap_or(true))
        .collect();
    let dropped = total - kept.len();
    ConfidenceFilterOutcome { kept, dropped }
}

/// Applies the comment-out fix to every eligible finding, discarding
/// per-file failures (they're already carried as their own `ScanWarning`
/// upstream in a full pipeline; here we only return what succeeded).
pub fn run_fix_pass(findings: &[Finding]) -> Vec<FixSummary> {
    vigil_fix::apply_fixes(findings)
        .into_iter()
        .filter_map(Result::ok)
        .collect()
}
