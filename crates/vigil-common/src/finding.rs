use crate::Severity;
use serde::{Deserialize, Serialize};

/// Where a finding came from: a catalog rule match, or a behavioral heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSource {
    Signature,
    Heuristic,
}

/// A single positive match produced by a rule or heuristic.
///
/// `(rule_id, file, line, message)` is the dedup key used by the
/// meta-analyzer (spec.md §3, §8 invariant 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Absolute path, or an `mcp://host/...` virtual path.
    pub file: String,
    /// 1-based line number, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    pub source: FindingSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_reason: Option<String>,
}

impl Finding {
    pub fn dedup_key(&self) -> (String, String, Option<usize>, String) {
        (
            self.rule_id.clone(),
            self.file.clone(),
            self.line,
            self.message.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(line: Option<usize>, msg: &str) -> Finding {
        Finding {
            rule_id: "R1".into(),
            severity: Severity::High,
            message: msg.into(),
            file: "/a/b.py".into(),
            line,
            category: None,
            remediation: None,
            source: FindingSource::Signature,
            confidence: None,
            confidence_reason: None,
        }
    }

    #[test]
    fn dedup_key_ignores_severity_and_source() {
        let a = sample(Some(3), "x");
        let mut b = sample(Some(3), "x");
        b.severity = Severity::Low;
        b.source = FindingSource::Heuristic;
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn dedup_key_differs_on_line() {
        let a = sample(Some(3), "x");
        let b = sample(Some(4), "x");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }
}
