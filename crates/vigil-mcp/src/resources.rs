//! Resource content reading gated by mime allowlist and byte cap (spec.md
//! §4.6 "Resources").

use serde_json::{json, Value};
use vigil_common::VigilError;

use crate::transport::McpClient;

pub const DEFAULT_MAX_RESOURCE_BYTES: usize = 1024 * 1024;

/// Whether a resource's declared mime type passes the allowlist. `None`
/// (no filter configured) and a resource with no declared mime type both
/// pass, matching an unset allowlist meaning "read everything".
pub fn mime_allowed(mime: Option<&str>, allowed: Option<&[String]>) -> bool {
    match (mime, allowed) {
        (_, None) => true,
        (None, Some(_)) => true,
        (Some(m), Some(allow)) => allow.iter().any(|a| a == m),
    }
}

/// Read and concatenate a resource's text contents, truncated to
/// `max_bytes` on a UTF-8 boundary.
pub async fn read_resource_content(
    client: &McpClient,
    uri: &str,
    max_bytes: usize,
) -> Result<Option<String>, VigilError> {
    let result = client.call("resources/read", json!({ "uri": uri })).await?;
    let Some(contents) = result.get("contents").and_then(Value::as_array) else {
        return Ok(None);
    };

    let mut combined = String::new();
    for item in contents {
        if let Some(text) = item.get("text").and_then(Value::as_str) {
            combined.push_str(text);
            combined.push('\n');
        }
    }

    if combined.is_empty() {
        return Ok(None);
    }
    Ok(Some(truncate_utf8(&combined, max_bytes)))
}

fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_allowlist_passes_everything() {
        assert!(mime_allowed(Some("application/json"), None));
    }

    #[test]
    fn allowlist_rejects_unlisted_mime() {
        let allow = vec!["text/plain".to_string()];
        assert!(!mime_allowed(Some("application/json"), Some(&allow)));
    }

    #[test]
    fn allowlist_accepts_a_missing_mime_type() {
        let allow = vec!["text/plain".to_string()];
        assert!(mime_allowed(None, Some(&allow)));
    }

    #[test]
    fn truncate_utf8_respects_char_boundaries() {
        let s = "a".repeat(10) + "é";
        let truncated = truncate_utf8(&s, 11);
        assert!(s.as_bytes().len() >= truncated.as_bytes().len());
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
    }
}
