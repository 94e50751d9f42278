//! The JSON report envelope (spec.md §6 abridged shape).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vigil_common::Finding;

use crate::summary::{build_summary, Summary};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McpObjectCounts {
    pub tools: usize,
    pub prompts: usize,
    pub resources: usize,
    pub instructions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McpDetected {
    pub servers: usize,
    pub objects: McpObjectCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Detected {
    pub target_kinds: Vec<String>,
    pub sources: Vec<String>,
    pub rules: Vec<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp: Option<McpDetected>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetMeta {
    pub path: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEnvelope {
    pub summary: Summary,
    pub detected: Detected,
    pub targets: Vec<TargetMeta>,
    pub findings: Vec<Finding>,
}

pub fn build_detected(
    findings: &[Finding],
    target_kinds: Vec<String>,
    sources: Vec<String>,
    mcp: Option<McpDetected>,
) -> Detected {
    let rules: BTreeSet<String> = findings.iter().map(|f| f.rule_id.clone()).collect();
    let categories: BTreeSet<String> = findings.iter().filter_map(|f| f.category.clone()).collect();

    Detected {
        target_kinds,
        sources,
        rules: rules.into_iter().collect(),
        categories: categories.into_iter().collect(),
        mcp,
    }
}

pub fn build_envelope(
    findings: Vec<Finding>,
    targets: Vec<TargetMeta>,
    scanned_files: usize,
    elapsed_ms: u64,
    target_kinds: Vec<String>,
    sources: Vec<String>,
    mcp: Option<McpDetected>,
) -> ReportEnvelope {
    let summary = build_summary(&findings, scanned_files, elapsed_ms);
    let detected = build_detected(&findings, target_kinds, sources, mcp);
    ReportEnvelope {
        summary,
        detected,
        targets,
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::{FindingSource, Severity};

    fn finding(rule_id: &str, category: Option<&str>) -> Finding {
        Finding {
            rule_id: rule_id.into(),
            severity: Severity::High,
            message: "m".into(),
            file: "/a.py".into(),
            line: Some(1),
            category: category.map(String::from),
            remediation: None,
            source: FindingSource::Signature,
            confidence: None,
            confidence_reason: None,
        }
    }

    #[test]
    fn detected_rules_and_categories_are_deduped_and_sorted() {
        let findings = vec![
            finding("B", Some("x")),
            finding("A", Some("x")),
            finding("A", Some("y")),
        ];
        let detected = build_detected(&findings, vec!["path".into()], vec!["fs".into()], None);
        assert_eq!(detected.rules, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(detected.categories, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn envelope_serializes_with_camel_case_summary_fields() {
        let envelope = build_envelope(vec![finding("A", None)], vec![], 3, 12, vec![], vec![], None);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json["summary"]["scannedFiles"].is_number());
        assert!(json["summary"]["findingCount"].is_number());
    }
}
