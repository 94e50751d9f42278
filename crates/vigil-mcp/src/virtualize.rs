//! Synthesizes virtual `mcp://<host>/...` file paths from a collected
//! snapshot so the existing rule engine can scan MCP surfaces unmodified
//! (spec.md §4.6 "Virtualization").

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::collect::Collected;

const MAX_SEGMENT_LEN: usize = 120;

#[derive(Debug, Clone)]
pub struct VirtualFile {
    pub path: String,
    pub content: String,
}

/// Replace any byte outside `[A-Za-z0-9._-]` with `_` and cap length, so a
/// tool/prompt name or host can never escape the synthesized path prefix.
pub fn safe_segment(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    out.truncate(MAX_SEGMENT_LEN);
    if out.is_empty() {
        "_".to_string()
    } else {
        out
    }
}

/// Unpadded URL-safe base64, used to make a resource URI safe as a single
/// path segment without losing information the way `safe_segment` would.
pub fn url_safe_base64(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(input.as_bytes())
}

fn ext_for_mime(mime: Option<&str>) -> &'static str {
    match mime {
        Some("application/json") => "json",
        Some("text/html") => "html",
        Some(m) if m.starts_with("text/") => "txt",
        _ => "txt",
    }
}

pub fn build_virtual_files(collected: &Collected) -> Vec<VirtualFile> {
    let mut files = Vec::new();
    let host = safe_segment(&collected.host);
    let base = format!("mcp://{host}");

    if let Some(instructions) = &collected.instructions {
        files.push(VirtualFile {
            path: format!("{base}/instructions.md"),
            content: instructions.clone(),
        });
    }

    for tool in &collected.tools {
        let name = tool.get("name").and_then(|v| v.as_str()).unwrap_or("unnamed");
        let safe_name = safe_segment(name);
        if let Some(desc) = tool.get("description").and_then(|v| v.as_str()) {
            files.push(VirtualFile {
                path: format!("{base}/tools/{safe_name}/description.md"),
                content: desc.to_string(),
            });
        }
        if let Some(schema) = tool.get("inputSchema") {
            files.push(VirtualFile {
                path: format!("{base}/tools/{safe_name}/schema.json"),
                content: serde_json::to_string_pretty(schema).unwrap_or_default(),
            });
        }
        files.push(VirtualFile {
            path: format!("{base}/tools/{safe_name}/tool.json"),
            content: serde_json::to_string_pretty(tool).unwrap_or_default(),
        });
    }

    for prompt in &collected.prompts {
        let name = prompt.get("name").and_then(|v| v.as_str()).unwrap_or("unnamed");
        let safe_name = safe_segment(name);
        if let Some(desc) = prompt.get("description").and_then(|v| v.as_str()) {
            files.push(VirtualFile {
                path: format!("{base}/prompts/{safe_name}/description.md"),
                content: desc.to_string(),
            });
        }
        files.push(VirtualFile {
            path: format!("{base}/prompts/{safe_name}/prompt.json"),
            content: serde_json::to_string_pretty(prompt).unwrap_or_default(),
        });
    }

    for resource in &collected.resources {
        let encoded_uri = url_safe_base64(&resource.uri);
        let metadata = serde_json::json!({
            "uri": resource.uri,
            "mimeType": resource.mime_type,
            "name": resource.name,
        });
        files.push(VirtualFile {
            path: format!("{base}/resources/{encoded_uri}/metadata.json"),
            content: serde_json::to_string_pretty(&metadata).unwrap_or_default(),
        });
        if let Some(content) = &resource.content {
            let ext = ext_for_mime(resource.mime_type.as_deref());
            files.push(VirtualFile {
                path: format!("{base}/resources/{encoded_uri}/content.{ext}"),
                content: content.clone(),
            });
        }
    }

    files
}
