use crate::catalog::RuleCatalog;
use crate::rule::Rule;
use std::collections::HashMap;
use vigil_common::FileType;

/// Partitions rules into a `file_type -> rules[]` map plus a `universal`
/// list for rules whose `file_types` contains `any` (spec.md §4.2
/// "Indexing"). Read-only after construction, shared freely across worker
/// tasks (spec.md §5 "Shared resources").
pub struct IndexedRuleEngine {
    by_type: HashMap<FileType, Vec<Rule>>,
    universal: Vec<Rule>,
    pub version: String,
}

impl IndexedRuleEngine {
    pub fn build(catalog: RuleCatalog) -> Self {
        let mut by_type: HashMap<FileType, Vec<Rule>> = HashMap::new();
        let mut universal = Vec::new();

        for rule in catalog.rules {
            if rule.matches_any_type() {
                universal.push(rule);
                continue;
            }
            for ft in &rule.file_types {
                if let crate::rule::FileTypeMatch::Tag(tag) = ft {
                    by_type.entry(tag.clone()).or_default().push(rule.clone());
                }
            }
        }

        Self {
            by_type,
            universal,
            version: catalog.version,
        }
    }

    /// `universal + map[type]`. A rule whose `file_types` lists both `any`
    /// and a concrete tag is retained once (in `universal`) since we branch
    /// on `matches_any_type()` above rather than indexing it twice.
    pub fn rules_for(&self, ty: &FileType) -> Vec<&Rule> {
        let mut out: Vec<&Rule> = self.universal.iter().collect();
        if let Some(specific) = self.by_type.get(ty) {
            out.extend(specific.iter());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.universal.len() + self.by_type.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
- id: UNIVERSAL
  category: test
  severity: LOW
  patterns: ["x"]
  file_types: ["any"]
- id: PY_ONLY
  category: test
  severity: LOW
  patterns: ["y"]
  file_types: ["python"]
- id: JS_ONLY
  category: test
  severity: LOW
  patterns: ["z"]
  file_types: ["javascript"]
"#;

    #[test]
    fn universal_rules_apply_to_every_type() {
        let engine = IndexedRuleEngine::build(RuleCatalog::load(YAML));
        let py_rules = engine.rules_for(&FileType::Python);
        assert!(py_rules.iter().any(|r| r.id == "UNIVERSAL"));
        assert!(py_rules.iter().any(|r| r.id == "PY_ONLY"));
        assert!(!py_rules.iter().any(|r| r.id == "JS_ONLY"));
    }

    #[test]
    fn type_specific_rules_do_not_leak_across_types() {
        let engine = IndexedRuleEngine::build(RuleCatalog::load(YAML));
        let md_rules = engine.rules_for(&FileType::Markdown);
        assert!(md_rules.iter().any(|r| r.id == "UNIVERSAL"));
        assert_eq!(md_rules.len(), 1);
    }

    #[test]
    fn len_counts_every_loaded_rule_once() {
        let engine = IndexedRuleEngine::build(RuleCatalog::load(YAML));
        assert_eq!(engine.len(), 3);
    }
}
