use serde::{Deserialize, Serialize};
use std::path::Path;

/// File-type tag used to index the rule catalog and pick heuristics.
///
/// Several languages fold onto `Python` because the rule catalog's
/// command-injection / deserialization patterns are regex-compatible across
/// them; see spec.md §3 and §9 ("the reference collapses several dissimilar
/// languages ... onto the `python` rule bucket"). Changing this mapping
/// silently changes which rules run against a file, so it is centralized
/// here rather than duplicated at each call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Markdown,
    Json,
    Manifest,
    Python,
    TypeScript,
    JavaScript,
    Bash,
    Binary,
    Text,
    /// User-authored tag from a custom rule file's `file_types` list.
    Other(String),
}

impl FileType {
    pub fn as_str(&self) -> &str {
        match self {
            FileType::Markdown => "markdown",
            FileType::Json => "json",
            FileType::Manifest => "manifest",
            FileType::Python => "python",
            FileType::TypeScript => "typescript",
            FileType::JavaScript => "javascript",
            FileType::Bash => "bash",
            FileType::Binary => "binary",
            FileType::Text => "text",
            FileType::Other(s) => s.as_str(),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "markdown" => FileType::Markdown,
            "json" => FileType::Json,
            "manifest" => FileType::Manifest,
            "python" => FileType::Python,
            "typescript" => FileType::TypeScript,
            "javascript" => FileType::JavaScript,
            "bash" => FileType::Bash,
            "binary" => FileType::Binary,
            "text" => FileType::Text,
            other => FileType::Other(other.to_string()),
        }
    }

    /// Detect by basename override first, then extension, folding languages
    /// that only have `python`-class regex rules onto `Python`.
    pub fn detect(path: &Path) -> Self {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            match name {
                "SKILL.md" => return FileType::Markdown,
                "manifest.json" | "package.json" => return FileType::Manifest,
                _ => {}
            }
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("md") | Some("mdx") => FileType::Markdown,
            Some("json") => FileType::Json,
            Some("py") | Some("rs") | Some("c") | Some("cc") | Some("cpp") | Some("h")
            | Some("hpp") | Some("java") | Some("rb") | Some("go") => FileType::Python,
            Some("ts") | Some("tsx") => FileType::TypeScript,
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => FileType::JavaScript,
            Some("sh") | Some("bash") | Some("zsh") | Some("yml") | Some("yaml") => {
                FileType::Bash
            }
            Some(
                "png" | "jpg" | "jpeg" | "gif" | "ico" | "woff" | "woff2" | "ttf" | "otf" | "wasm",
            ) => FileType::Binary,
            _ => FileType::Text,
        }
    }
}
