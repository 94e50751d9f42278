use crate::line_index::LineIndex;
use regex::Regex;
use std::sync::OnceLock;
use vigil_common::{Finding, FindingSource, Severity};

/// Python and shell behavioral heuristics (spec.md §4.3 "Python heuristics",
/// "Shell heuristic"). These intentionally overlap with the YAML rules
/// `CODE_PY_SHELL_TRUE`, `CODE_PY_UNSAFE_DESERIALIZE`, and
/// `CODE_SH_REMOTE_PIPE` — the same relationship the spec calls out between
/// the JS `eval`/`new Function` heuristic and `CODE_EXECUTION_GENERIC`
/// (spec.md §9 "Open questions").
fn shell_true_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"subprocess\.(run|call|Popen|check_output)\([^)]*shell\s*=\s*True").unwrap())
}

fn pickle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pickle\.loads?\(").unwrap())
}

fn shell_pipe_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(curl|wget)[^\n|]*\|\s*(sudo\s+)?(sh|bash|zsh)\b").unwrap())
}

pub fn scan_python(content: &str, file: &str, line_index: &LineIndex) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(m) = shell_true_re().find(content) {
        findings.push(Finding {
            rule_id: "CODE_PY_SHELL_TRUE".to_string(),
            severity: Severity::High,
            message: "subprocess invocation with shell=True allows shell-metacharacter injection".to_string(),
            file: file.to_string(),
            line: Some(line_index.line_at(m.start())),
            category: Some("code_execution".to_string()),
            remediation: Some("Pass argument lists instead of shell strings, and avoid shell=True.".to_string()),
            source: FindingSource::Heuristic,
            confidence: None,
            confidence_reason: None,
        });
    }

    if let Some(m) = pickle_re().find(content) {
        findings.push(Finding {
            rule_id: "CODE_PY_UNSAFE_DESERIALIZE".to_string(),
            severity: Severity::High,
            message: "pickle deserialization of untrusted data can execute arbitrary code".to_string(),
            file: file.to_string(),
            line: Some(line_index.line_at(m.start())),
            category: Some("code_execution".to_string()),
            remediation: Some("Use a safe serialization format (json, protobuf) for untrusted input.".to_string()),
            source: FindingSource::Heuristic,
            confidence: None,
            confidence_reason: None,
        });
    }

    findings
}

pub fn scan_shell(content: &str, file: &str, line_index: &LineIndex) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Some(m) = shell_pipe_re().find(content) {
        findings.push(Finding {
            rule_id: "CODE_SH_REMOTE_PIPE".to_string(),
            severity: Severity::Critical,
            message: "a downloaded script is piped directly into a shell interpreter".to_string(),
            file: file.to_string(),
            line: Some(line_index.line_at(m.start())),
            category: Some("supply_chain".to_string()),
            remediation: Some("Download, review, and checksum scripts before execution instead of piping curl/wget into a shell.".to_string()),
            source: FindingSource::Heuristic,
            confidence: None,
            confidence_reason: None,
        });
    }

    findings
}
