use crate::confidence;
use crate::heuristics::run_heuristics;
use crate::line_index::LineIndex;
use crate::signature::{run_signature_rules, SignatureOptions};
use vigil_common::{FileType, Finding};
use vigil_rules::IndexedRuleEngine;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub signature: SignatureOptions,
    pub behavioral: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            signature: SignatureOptions::default(),
            behavioral: false,
        }
    }
}

/// Output of scanning a single file's content: its findings in
/// rule-declaration / match-position order (spec.md §4.5 "Ordering
/// guarantees"), plus the rule ids a ReDoS timeout cut short.
pub struct EngineOutcome {
    pub findings: Vec<Finding>,
    pub timed_out_rules: Vec<String>,
}

/// Scan already-read, already-safety-checked file content against the
/// indexed rule catalog and, when behavioral mode is on, every applicable
/// heuristic (spec.md §4.3). Confidence is never attached here — that is a
/// pipeline post-pass (spec.md §4.5 "Post-pass").
pub fn scan_content(
    rules: &IndexedRuleEngine,
    content: &str,
    file: &str,
    file_type: &FileType,
    opts: &EngineOptions,
) -> EngineOutcome {
    let line_index = LineIndex::build(content);
    let applicable = rules.rules_for(file_type);

    let sig_outcome = run_signature_rules(&applicable, content, file, &line_index, &opts.signature);
    let mut findings = sig_outcome.findings;

    if opts.behavioral {
        findings.extend(run_heuristics(content, file, file_type, &line_index));
    }

    EngineOutcome {
        findings,
        timed_out_rules: sig_outcome.timed_out_rules,
    }
}

/// Attach confidence to every finding in place (spec.md §4.3 "Confidence
/// scoring"). Exposed at the crate root so the pipeline's post-pass can call
/// it without reaching into submodules.
pub fn attach_confidence(findings: &mut [Finding]) {
    for finding in findings.iter_mut() {
        let (score, reason) = confidence::score(finding);
        finding.confidence = Some(score);
        finding.confidence_reason = Some(reason.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_rules::RuleCatalog;

    fn engine_with(yaml: &str) -> IndexedRuleEngine {
        IndexedRuleEngine::build(RuleCatalog::load(yaml))
    }

    #[test]
    fn signature_findings_come_before_heuristic_findings() {
        let rules = engine_with(
            "- id: R1\n  category: test\n  severity: HIGH\n  patterns: [\"needle\"]\n  file_types: [\"any\"]\n",
        );
        let content = "needle\neval(x)\n";
        let opts = EngineOptions {
            behavioral: true,
            ..Default::default()
        };
        let outcome = scan_content(&rules, content, "/a.js", &FileType::JavaScript, &opts);
        assert_eq!(outcome.findings[0].rule_id, "R1");
        assert!(outcome.findings[1..].iter().any(|f| f.rule_id == "CODE_JS_EVAL_OR_FUNCTION"));
    }

    #[test]
    fn heuristics_are_skipped_when_behavioral_mode_is_off() {
        let rules = engine_with(
            "- id: R1\n  category: test\n  severity: LOW\n  patterns: [\"zzz\"]\n  file_types: [\"any\"]\n",
        );
        let content = "eval(x)\n";
        let outcome = scan_content(&rules, content, "/a.js", &FileType::JavaScript, &EngineOptions::default());
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn attach_confidence_fills_in_every_finding() {
        let rules = engine_with(
            "- id: R1\n  category: test\n  severity: HIGH\n  patterns: [\"needle\"]\n  file_types: [\"any\"]\n",
        );
        let content = "needle";
        let mut outcome = scan_content(&rules, content, "/a.py", &FileType::Python, &EngineOptions::default());
        attach_confidence(&mut outcome.findings);
        assert!(outcome.findings.iter().all(|f| f.confidence.is_some()));
    }
}
