use crate::line_index::LineIndex;
use crate::redos::{RedosGuard, DEFAULT_REGEX_TIMEOUT_MS};
use vigil_common::{Finding, FindingSource};
use vigil_rules::Rule;

/// Default per-rule, per-file finding cap (spec.md §4.3 step 6).
pub const DEFAULT_MAX_FINDINGS_PER_RULE_PER_FILE: usize = 20;

#[derive(Debug, Clone)]
pub struct SignatureOptions {
    pub regex_timeout_ms: u64,
    pub max_findings_per_rule: usize,
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            regex_timeout_ms: DEFAULT_REGEX_TIMEOUT_MS,
            max_findings_per_rule: DEFAULT_MAX_FINDINGS_PER_RULE_PER_FILE,
        }
    }
}

/// Findings plus the rule ids that were cut short by the ReDoS guard, so the
/// caller can surface a `RegexTimeout` warning per spec.md §7.
pub struct SignatureOutcome {
    pub findings: Vec<Finding>,
    pub timed_out_rules: Vec<String>,
}

/// Run every rule already indexed as applicable to this file against its
/// content (spec.md §4.3 "Per-rule loop"). Findings are emitted in
/// rule-declaration order and, within a rule, in match-position order
/// (spec.md §4.5 "Ordering guarantees").
pub fn run_signature_rules(
    rules: &[&Rule],
    content: &str,
    file: &str,
    line_index: &LineIndex,
    opts: &SignatureOptions,
) -> SignatureOutcome {
    let mut findings = Vec::new();
    let mut timed_out_rules = Vec::new();

    for rule in rules {
        let mut guard = RedosGuard::new(opts.regex_timeout_ms);
        let mut hits_for_rule = 0usize;

        'patterns: for pattern in &rule.patterns {
            guard.start_pattern();
            let mut cursor = 0usize;

            while cursor <= content.len() {
                if !content.is_char_boundary(cursor) {
                    cursor += 1;
                    continue;
                }
                let Some(m) = pattern.find_at(content, cursor) else {
                    break;
                };
                if guard.tick() {
                    timed_out_rules.push(rule.id.clone());
                    break 'patterns;
                }

                let matched = m.as_str();
                let next_cursor = if m.end() > m.start() {
                    m.end()
                } else {
                    m.end() + 1
                };

                let excluded = rule.exclude_patterns.iter().any(|ex| ex.is_match(matched));
                if !excluded {
                    findings.push(Finding {
                        rule_id: rule.id.clone(),
                        severity: rule.severity,
                        message: rule_message(rule, matched),
                        file: file.to_string(),
                        line: Some(line_index.line_at(m.start())),
                        category: Some(rule.category.clone()),
                        remediation: rule.remediation.clone(),
                        source: FindingSource::Signature,
                        confidence: None,
                        confidence_reason: None,
                    });
                    hits_for_rule += 1;
                    if hits_for_rule >= opts.max_findings_per_rule {
                        break 'patterns;
                    }
                }

                cursor = next_cursor;
            }
        }
    }

    SignatureOutcome {
        findings,
        timed_out_rules,
    }
}

fn rule_message(rule: &Rule, matched: &str) -> String {
    let snippet = truncate(matched, 80);
    match &rule.description {
        Some(desc) => format!("{desc} (matched: {snippet})"),
        None => format!("rule {} matched: {snippet}", rule.id),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_rules::RuleCatalog;

    fn one_rule(yaml: &str) -> vigil_rules::Rule {
        RuleCatalog::load(yaml).rules.into_iter().next().unwrap()
    }

    #[test]
    fn emits_a_finding_with_the_correct_line_number() {
        let rule = one_rule(
            "- id: R1\n  category: test\n  severity: HIGH\n  patterns: [\"needle\"]\n  file_types: [\"any\"]\n",
        );
        let content = "line one\nline with needle here\nline three";
        let idx = LineIndex::build(content);
        let outcome =
            run_signature_rules(&[&rule], content, "/a.py", &idx, &SignatureOptions::default());
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].line, Some(2));
        assert_eq!(outcome.findings[0].source, FindingSource::Signature);
    }

    #[test]
    fn stops_after_the_per_rule_cap() {
        let rule = one_rule(
            "- id: R1\n  category: test\n  severity: LOW\n  patterns: [\"x\"]\n  file_types: [\"any\"]\n",
        );
        let content = "x".repeat(50);
        let idx = LineIndex::build(&content);
        let opts = SignatureOptions {
            max_findings_per_rule: 5,
            ..Default::default()
        };
        let outcome = run_signature_rules(&[&rule], &content, "/a.py", &idx, &opts);
        assert_eq!(outcome.findings.len(), 5);
    }

    #[test]
    fn exclude_pattern_suppresses_the_hit() {
        let rule = one_rule(
            "- id: R1\n  category: test\n  severity: LOW\n  patterns: [\"secret=\\\\w+\"]\n  exclude_patterns: [\"changeme\"]\n  file_types: [\"any\"]\n",
        );
        let content = "secret=changeme";
        let idx = LineIndex::build(content);
        let outcome =
            run_signature_rules(&[&rule], content, "/a.py", &idx, &SignatureOptions::default());
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn zero_length_match_does_not_loop_forever() {
        let rule = one_rule(
            "- id: R1\n  category: test\n  severity: LOW\n  patterns: [\"x*\"]\n  file_types: [\"any\"]\n",
        );
        let content = "abc";
        let idx = LineIndex::build(content);
        let outcome =
            run_signature_rules(&[&rule], content, "/a.py", &idx, &SignatureOptions::default());
        // "x*" matches an empty string at every position; the cap still bounds it.
        assert!(outcome.findings.len() <= DEFAULT_MAX_FINDINGS_PER_RULE_PER_FILE);
    }

    #[test]
    fn findings_within_a_rule_are_in_match_position_order() {
        let rule = one_rule(
            "- id: R1\n  category: test\n  severity: LOW\n  patterns: [\"n\\\\d\"]\n  file_types: [\"any\"]\n",
        );
        let content = "n1 and n2 and n3";
        let idx = LineIndex::build(content);
        let outcome =
            run_signature_rules(&[&rule], content, "/a.py", &idx, &SignatureOptions::default());
        let messages: Vec<&str> = outcome.findings.iter().map(|f| f.message.as_str()).collect();
        assert!(messages[0].contains("n1"));
        assert!(messages[1].contains("n2"));
        assert!(messages[2].contains("n3"));
    }
}
