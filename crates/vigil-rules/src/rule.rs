use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use vigil_common::{FileType, Severity};

/// Either a concrete file-type tag or the `any` wildcard that matches every
/// type (spec.md §3 "File type tag").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTypeMatch {
    Any,
    Tag(FileType),
}

impl FileTypeMatch {
    fn parse(raw: &str) -> Self {
        if raw == "any" {
            FileTypeMatch::Any
        } else {
            FileTypeMatch::Tag(FileType::from_tag(raw))
        }
    }
}

/// An immutable, compiled catalog rule. Invariant: every pattern in
/// `patterns` compiles; compile failures are dropped silently at load time
/// (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub category: String,
    pub severity: Severity,
    pub patterns: Vec<Regex>,
    pub exclude_patterns: Vec<Regex>,
    pub file_types: Vec<FileTypeMatch>,
    pub description: Option<String>,
    pub remediation: Option<String>,
}

impl Rule {
    pub fn matches_any_type(&self) -> bool {
        self.file_types.iter().any(|t| *t == FileTypeMatch::Any)
    }

    pub fn applies_to(&self, ty: &FileType) -> bool {
        self.file_types.iter().any(|t| match t {
            FileTypeMatch::Any => true,
            FileTypeMatch::Tag(tag) => tag == ty,
        })
    }

    /// `true` once every pattern failed to compile and the rule carries no
    /// further semantics of its own (spec.md §3: "a rule with zero compiled
    /// patterns is retained only if heuristics reference it, otherwise
    /// inert"). Heuristic-anchor rules use the `heuristic` category and are
    /// never dropped even with zero patterns, since their real logic lives
    /// in `vigil-engine`'s heuristic detectors, not in `patterns`.
    pub fn is_inert(&self) -> bool {
        self.patterns.is_empty() && self.category != "heuristic"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawRule {
    pub id: String,
    pub category: String,
    pub severity: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub remediation: Option<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl RawRule {
    /// `Some(rule)` unless a required field is missing/empty, in which case
    /// the entry is skipped entirely (spec.md §4.2).
    pub(crate) fn compile(self) -> Option<Rule> {
        if self.id.is_empty()
            || self.category.is_empty()
            || self.patterns.is_empty()
            || self.file_types.is_empty()
        {
            return None;
        }
        let severity = Severity::parse(&self.severity)?;

        let patterns: Vec<Regex> = self
            .patterns
            .iter()
            .filter_map(|p| compile_pattern(p, &self.id))
            .collect();

        let exclude_patterns: Vec<Regex> = self
            .exclude_patterns
            .iter()
            .filter_map(|p| compile_pattern(p, &self.id))
            .collect();

        let file_types = self.file_types.iter().map(|s| FileTypeMatch::parse(s)).collect();

        Some(Rule {
            id: self.id,
            category: self.category,
            severity,
            patterns,
            exclude_patterns,
            file_types,
            description: self.description,
            remediation: self.remediation,
        })
    }
}

/// Translate the PCRE `(?i)` flag to a case-insensitive `RegexBuilder`
/// option and compile with default (non-overlapping, global-iteration)
/// semantics. Compile failures are logged and dropped, never propagated
/// (spec.md §4.2, §9 "Regex flag translation").
pub(crate) fn compile_pattern(raw: &str, rule_id: &str) -> Option<Regex> {
    let case_insensitive = raw.contains("(?i)");
    let cleaned = raw.replace("(?i)", "");

    match RegexBuilder::new(&cleaned)
        .case_insensitive(case_insensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(rule_id, pattern = raw, error = %e, "dropping uncompilable rule pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(patterns: Vec<&str>, file_types: Vec<&str>) -> RawRule {
        RawRule {
            id: "R1".into(),
            category: "test".into(),
            severity: "HIGH".into(),
            patterns: patterns.into_iter().map(String::from).collect(),
            file_types: file_types.into_iter().map(String::from).collect(),
            description: None,
            remediation: None,
            exclude_patterns: vec![],
        }
    }

    #[test]
    fn missing_required_field_is_dropped() {
        let mut r = raw(vec!["foo"], vec!["python"]);
        r.id = String::new();
        assert!(r.compile().is_none());
    }

    #[test]
    fn case_insensitive_flag_is_translated() {
        let rule = raw(vec!["(?i)eval\\("], vec!["any"]).compile().unwrap();
        assert_eq!(rule.patterns.len(), 1);
        assert!(rule.patterns[0].is_match("EVAL("));
    }

    #[test]
    fn bad_pattern_is_dropped_but_rule_with_other_valid_patterns_survives() {
        let rule = raw(vec!["good", "(unterminated"], vec!["any"])
            .compile()
            .unwrap();
        assert_eq!(rule.patterns.len(), 1);
    }

    #[test]
    fn any_wildcard_matches_every_type() {
        let rule = raw(vec!["x"], vec!["any"]).compile().unwrap();
        assert!(rule.applies_to(&FileType::Python));
        assert!(rule.applies_to(&FileType::Markdown));
    }
}
