use crate::line_index::LineIndex;
use vigil_common::{Finding, FindingSource, Severity};

/// Minimum candidate token length (spec.md §4.3 "Shannon-entropy secret detector").
const MIN_TOKEN_LEN: usize = 20;
/// Stop extracting once this many candidates have been collected, so a
/// pathological file cannot blow up scan time.
const MAX_CANDIDATES: usize = 2000;
/// Shannon-entropy threshold (base 2) above which a token looks secret-like.
const ENTROPY_THRESHOLD: f64 = 4.2;
/// Per-file cap on heuristic findings from this detector.
const MAX_HEURISTIC_FINDINGS: usize = 10;

pub fn scan(content: &str, file: &str, line_index: &LineIndex) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut candidates = 0usize;

    for (start, token) in candidate_tokens(content) {
        if candidates >= MAX_CANDIDATES {
            break;
        }
        candidates += 1;

        let entropy = shannon_entropy(token);
        if entropy < ENTROPY_THRESHOLD {
            continue;
        }

        findings.push(Finding {
            rule_id: "HEURISTIC_ENTROPY_SECRET".to_string(),
            severity: Severity::High,
            message: format!(
                "high-entropy token ({:.2} bits/char, {} chars) looks like a hardcoded secret",
                entropy,
                token.len()
            ),
            file: file.to_string(),
            line: Some(line_index.line_at(start)),
            category: Some("heuristic_secrets".to_string()),
            remediation: Some(
                "Move the value to an environment variable or secret manager.".to_string(),
            ),
            source: FindingSource::Heuristic,
            confidence: None,
            confidence_reason: None,
        });

        if findings.len() >= MAX_HEURISTIC_FINDINGS {
            break;
        }
    }

    findings
}

/// Unicode-letter/number/`+/_=-` runs of at least [`MIN_TOKEN_LEN`] bytes.
fn candidate_tokens(content: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut token_start: Option<usize> = None;

    let is_token_char = |c: char| c.is_alphanumeric() || matches!(c, '+' | '/' | '_' | '=' | '-');

    for (i, c) in content.char_indices() {
        if is_token_char(c) {
            if token_start.is_none() {
                token_start = Some(i);
            }
        } else if let Some(start) = token_start.take() {
            push_if_long_enough(&mut out, content, start, i);
        }
    }
    if let Some(start) = token_start {
        push_if_long_enough(&mut out, content, start, content.len());
    }

    out
}

fn push_if_long_enough<'a>(out: &mut Vec<(usize, &'a str)>, content: &'a str, start: usize, end: usize) {
    let token = &content[start..end];
    if token.len() >= MIN_TOKEN_LEN {
        out.push((start, token));
    }
}

/// Base-2 Shannon entropy over the token's bytes.
fn shannon_entropy(token: &str) -> f64 {
    let mut counts = [0u32; 256];
    for b in token.bytes() {
        counts[b as usize] += 1;
    }
    let len = token.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = f64::from(c) / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_same_character_has_zero_entropy() {
        let s = "a".repeat(40);
        assert_eq!(shannon_entropy(&s), 0.0);
    }

    #[test]
    fn uniform_alphabet_approaches_log2_of_alphabet_size() {
        let alphabet: String = (0..16u8).map(|i| (b'a' + i) as char).collect();
        let s = alphabet.repeat(4); // 64 chars, each of 16 symbols equally often
        let entropy = shannon_entropy(&s);
        assert!((entropy - 4.0).abs() < 0.01);
    }

    #[test]
    fn short_tokens_are_ignored() {
        let content = "key=abcdefgh12345\n";
        let idx = LineIndex::build(content);
        assert!(scan(content, "/a.py", &idx).is_empty());
    }

    #[test]
    fn high_entropy_token_above_minimum_length_is_flagged() {
        let token = "aZ9kQ2mN7pX1wL4vR8sT3c";
        assert!(token.len() >= MIN_TOKEN_LEN);
        let content = format!("const key = \"{token}\";\n");
        let idx = LineIndex::build(&content);
        let findings = scan(&content, "/a.js", &idx);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category.as_deref(), Some("heuristic_secrets"));
    }

    #[test]
    fn low_entropy_long_token_is_not_flagged() {
        let token = "a".repeat(30);
        let content = format!("x = \"{token}\"\n");
        let idx = LineIndex::build(&content);
        assert!(scan(&content, "/a.py", &idx).is_empty());
    }
}
