use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The logical kind of thing being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    Skill,
    Extension,
    IdeExtension,
    Mcp,
    Path,
}

/// Open-ended metadata a target carries, keyed by kind. Mirrors the
/// teacher's preference (`assay-core` target/finding metadata) for a sum
/// type with typed variants plus a small open `extras` map for the
/// genuinely dynamic fields, rather than an untyped JSON blob everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ide: Option<IdeMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcp: Option<McpMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub extras: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserMeta {
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeMeta {
    pub family: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpMeta {
    pub url: String,
    pub tools: usize,
    pub prompts: usize,
    pub resources: usize,
}

/// A logical scan unit. `path` may be a filesystem directory, or an MCP URL
/// for `TargetKind::Mcp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub meta: TargetMeta,
}

impl Target {
    pub fn new(kind: TargetKind, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            meta: TargetMeta::default(),
        }
    }
}
