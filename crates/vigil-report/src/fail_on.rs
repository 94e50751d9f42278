//! Exit-code decision for `--fail-on` (spec.md §6, §7).

use vigil_common::{Finding, Severity};

/// `0` unless a threshold is given and at least one finding meets or
/// exceeds it, in which case `2`.
pub fn exit_code(findings: &[Finding], fail_on: Option<Severity>) -> u8 {
    match fail_on {
        None => 0,
        Some(threshold) => {
            if findings.iter().any(|f| f.severity >= threshold) {
                2
            } else {
                0
            }
        }
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
    fn no_threshold_never_fails() {
        assert_eq!(exit_code(&[finding(Severity::Critical)], None), 0);
    }

    #[test]
    fn meeting_the_threshold_exactly_fails() {
        assert_eq!(exit_code(&[finding(Severity::High)], Some(Severity::High)), 2);
    }

    #[test]
    fn below_threshold_does_not_fail() {
        assert_eq!(exit_code(&[finding(Severity::Low)], Some(Severity::High)), 0);
    }

    #[test]
    fn empty_findings_never_fail() {
        assert_eq!(exit_code(&[], Some(Severity::Low)), 0);
    }
}
