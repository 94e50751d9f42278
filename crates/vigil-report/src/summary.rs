//! Severity summary and the JSON report envelope's `summary` block
//! (spec.md §6, §8 invariant 5).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vigil_common::{Finding, Severity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub scanned_files: usize,
    pub elapsed_ms: u64,
    pub finding_count: usize,
    pub severities: BTreeMap<String, usize>,
}

pub fn build_summary(findings: &[Finding], scanned_files: usize, elapsed_ms: u64) -> Summary {
    let mut severities = BTreeMap::new();
    for s in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low] {
        severities.insert(s.to_string(), 0);
    }
    for finding in findings {
        *severities.entry(finding.severity.to_string()).or_insert(0) += 1;
    }

    Summary {
        scanned_files,
        elapsed_ms,
        finding_count: findings.len(),
        severities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::FindingSource;

    fn finding(sev: Severity) -> Finding {
        Finding {
            rule_id: "R1".into(),
            severity: sev,
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

    #[test]
    fn counts_every_severity_bucket_even_when_zero() {
        let summary = build_summary(&[finding(Severity::High)], 10, 500);
        assert_eq!(summary.severities["HIGH"], 1);
        assert_eq!(summary.severities["LOW"], 0);
        assert_eq!(summary.finding_count, 1);
        assert_eq!(summary.scanned_files, 10);
    }
}
