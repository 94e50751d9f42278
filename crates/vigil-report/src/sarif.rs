//! SARIF 2.1.0 production (spec.md §6, §8 invariant 6). Mirrors
//! `assay-evidence::lint::sarif::to_sarif`'s rules-array-plus-results shape
//! and `partialFingerprints` block, scaled down to this crate's single
//! generic tool driver the way `assay-core::report::sarif` keeps things
//! simpler than its `assay-evidence` sibling.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use vigil_common::Finding;

pub const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";

#[derive(Debug, Clone, Default)]
pub struct SarifOptions {
    pub tool_name: Option<String>,
    pub tool_version: Option<String>,
}

pub fn to_sarif(findings: &[Finding]) -> Value {
    to_sarif_with_options(findings, &SarifOptions::default())
}

pub fn to_sarif_with_options(findings: &[Finding], options: &SarifOptions) -> Value {
    let tool_name = options.tool_name.as_deref().unwrap_or("Security Scanner");

    let mut rule_descriptions: BTreeMap<&str, (&str, Option<&str>)> = BTreeMap::new();
    for f in findings {
        rule_descriptions
            .entry(f.rule_id.as_str())
            .or_insert((f.message.as_str(), f.remediation.as_deref()));
    }

    let rules: Vec<Value> = rule_descriptions
        .iter()
        .map(|(id, (desc, help))| {
            let mut rule = json!({
                "id": id,
                "shortDescription": { "text": desc },
            });
            if let Some(help_text) = help {
                rule.as_object_mut()
                    .unwrap()
                    .insert("help".into(), json!({ "text": help_text }));
            }
            rule
        })
        .collect();

    let results: Vec<Value> = findings
        .iter()
        .map(|f| {
            let mut region = json!({});
            if let Some(line) = f.line {
                region.as_object_mut().unwrap().insert("startLine".into(), json!(line));
            }

            let location = json!({
                "physicalLocation": {
                    "artifactLocation": { "uri": f.file },
                    "region": region,
                }
            });

            let fingerprint = format!("{}:{}:{}", f.rule_id, f.file, f.line.unwrap_or(0));

            json!({
                "ruleId": f.rule_id,
                "level": f.severity.as_sarif_level(),
                "message": { "text": f.message },
                "locations": [location],
                "partialFingerprints": {
                    "vigilFindingFingerprint/v1": fingerprint,
                },
            })
        })
        .collect();

    let driver = json!({
        "name": tool_name,
        "version": options.tool_version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION")),
        "rules": rules,
    });

    json!({
        "$schema": SARIF_SCHEMA,
        "version": "2.1.0",
        "runs": [{
            "tool": { "driver": driver },
            "results": results,
        }]
    })
}
