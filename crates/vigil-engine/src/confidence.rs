use regex::Regex;
use std::sync::OnceLock;
use vigil_common::{Finding, FindingSource, Severity};

const TEST_PATH_MARKERS: &[&str] = &["/test/", "/tests/", "/__tests__/", ".test.", ".spec."];

fn matched_snippet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(matched: (.*)\)$").unwrap())
}

fn entropy_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([0-9]+\.[0-9]+) bits/char").unwrap())
}

/// Attach a confidence score and a human-readable reason band to a finding,
/// never touching the finding's other fields (spec.md §4.3 "Confidence
/// scoring", run strictly post-hoc over the frozen finding list). Returns
/// `(score, reason)`; callers set `finding.confidence`/`confidence_reason`.
pub fn score(finding: &Finding) -> (f64, &'static str) {
    let mut score: f64 = 0.5;

    score += match finding.source {
        FindingSource::Signature => 0.3,
        FindingSource::Heuristic => 0.1,
    };

    score += match finding.severity {
        Severity::Critical => 0.1,
        Severity::High => 0.05,
        Severity::Medium | Severity::Low => 0.0,
    };

    // Reserved hook: the reference never actually computes in-comment
    // status, so this is always `false` (spec.md §9 "Open questions").
    let in_comment = false;
    if in_comment {
        score -= 0.3;
    }

    if TEST_PATH_MARKERS.iter().any(|m| finding.file.contains(m)) {
        score -= 0.2;
    }

    if finding.category.as_deref() == Some("heuristic_secrets") {
        score += match extract_entropy(&finding.message) {
            Some(e) if e >= 4.5 => 0.2,
            Some(e) if e >= 4.2 => 0.1,
            _ => -0.1,
        };
    }

    if let Some(len) = matched_snippet_len(&finding.message) {
        if len > 50 {
            score += 0.1;
        } else if len < 10 {
            score -= 0.1;
        }
    }

    let is_json = finding.file.ends_with(".json");
    let is_bash = finding.file.ends_with(".sh") || finding.file.ends_with(".bash");
    if finding.category.as_deref() == Some("supply_chain") && is_json {
        score += 0.1;
    }
    if finding.category.as_deref() == Some("code_execution") && is_bash {
        score += 0.1;
    }

    let score = score.clamp(0.0, 1.0);
    (score, band(score))
}

fn band(score: f64) -> &'static str {
    if score >= 0.8 {
        "high"
    } else if score >= 0.6 {
        "medium"
    } else if score >= 0.4 {
        "low"
    } else {
        "very-low"
    }
}

fn extract_entropy(message: &str) -> Option<f64> {
    entropy_value_re()
        .captures(message)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn matched_snippet_len(message: &str) -> Option<usize> {
    matched_snippet_re()
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(source: FindingSource, severity: Severity) -> Finding {
        Finding {
            rule_id: "R".into(),
            severity,
            message: "rule R matched: abc".into(),
            file: "/src/main.py".into(),
            line: Some(1),
            category: Some("code_execution".into()),
            remediation: None,
            source,
            confidence: None,
            confidence_reason: None,
        }
    }

    #[test]
    fn signature_scores_higher_than_heuristic_all_else_equal() {
        let sig = base(FindingSource::Signature, Severity::Low);
        let heur = base(FindingSource::Heuristic, Severity::Low);
        assert!(score(&sig).0 > score(&heur).0);
    }

    #[test]
    fn critical_scores_higher_than_low() {
        let crit = base(FindingSource::Signature, Severity::Critical);
        let low = base(FindingSource::Signature, Severity::Low);
        assert!(score(&crit).0 > score(&low).0);
    }

    #[test]
    fn test_path_lowers_confidence() {
        let mut f = base(FindingSource::Signature, Severity::High);
        f.file = "/src/tests/main.py".into();
        let (normal, _) = score(&base(FindingSource::Signature, Severity::High));
        let (lowered, _) = score(&f);
        assert!(lowered < normal);
    }

    #[test]
    fn score_is_always_clamped() {
        let f = base(FindingSource::Heuristic, Severity::Low);
        let (s, _) = score(&f);
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn high_entropy_secret_increases_score() {
        let mut f = base(FindingSource::Heuristic, Severity::High);
        f.category = Some("heuristic_secrets".into());
        f.message = "high-entropy token (4.80 bits/char, 24 chars) looks like a hardcoded secret".into();
        let (s, band_name) = score(&f);
        assert!(s > 0.5);
        assert_eq!(band_name, "high");
    }

    #[test]
    fn band_thresholds_match_spec() {
        assert_eq!(band(0.85), "high");
        assert_eq!(band(0.65), "medium");
        assert_eq!(band(0.45), "low");
        assert_eq!(band(0.1), "very-low");
    }
}
