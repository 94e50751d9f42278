use crate::rule::{RawRule, Rule};
use sha2::{Digest, Sha256};

/// The default rule catalog bundled into the binary so `vigil scan` works
/// with zero configuration (SPEC_FULL.md "Rule Catalog" ambient addition).
pub const DEFAULT_RULES_YAML: &str = include_str!("../default_rules.yaml");

/// A loaded, compiled rule catalog plus its version tag.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    pub rules: Vec<Rule>,
    pub version: String,
}

impl RuleCatalog {
    /// Parse a YAML sequence of rule objects, compiling each, and silently
    /// skipping entries missing a required field (spec.md §4.2).
    pub fn load(yaml: &str) -> Self {
        let raw: Vec<RawRule> = serde_yaml::from_str(yaml).unwrap_or_default();
        let rules: Vec<Rule> = raw
            .into_iter()
            .filter_map(RawRule::compile)
            .filter(|r| !r.is_inert())
            .collect();
        let version = rule_version(yaml);
        Self { rules, version }
    }

    /// Load the bundled default catalog, optionally merged with a
    /// user-authored YAML file whose rule `id`s take precedence over the
    /// default's (SPEC_FULL.md "Rule Catalog").
    pub fn load_default(override_yaml: Option<&str>) -> Self {
        let mut base = Self::load(DEFAULT_RULES_YAML);
        if let Some(extra_yaml) = override_yaml {
            let extra = Self::load(extra_yaml);
            for rule in extra.rules {
                base.rules.retain(|r| r.id != rule.id);
                base.rules.push(rule);
            }
            base.version = rule_version(&format!("{DEFAULT_RULES_YAML}\n{extra_yaml}"));
        }
        base
    }
}

/// A stable identifier that changes whenever the rule catalog text changes;
/// used to invalidate cache entries (spec.md §3 "Rule version").
fn rule_version(raw_yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_yaml.as_bytes());
    hex::encode(hasher.finalize())
}
