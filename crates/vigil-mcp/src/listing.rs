//! Cursor-paginated `*/list` aggregation (spec.md §4.6). A server lacking a
//! given list method (`-32601`) is treated as if it exposed none rather than
//! failing the whole target.

use serde_json::{json, Value};
use vigil_common::VigilError;

use crate::transport::McpClient;

/// Aggregate results across `nextCursor` pages, stopping at `cap` items.
pub const LIST_CAP: usize = 20_000;

pub async fn list_paginated(
    client: &McpClient,
    method: &str,
    items_key: &str,
    cap: usize,
) -> Result<Vec<Value>, VigilError> {
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let params = match &cursor {
            Some(c) => json!({ "cursor": c }),
            None => json!({}),
        };

        let result = match client.call(method, params).await {
            Ok(v) => v,
            Err(VigilError::McpMethodNotFound { .. }) => return Ok(out),
            Err(e) => return Err(e),
        };

        let items = result
            .get(items_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        out.extend(items);

        if out.len() >= cap {
            out.truncate(cap);
            return Ok(out);
        }

        cursor = result
            .get("nextCursor")
            .and_then(Value::as_str)
            .map(str::to_string);
        if cursor.is_none() {
            return Ok(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::McpClientConfig;

    #[tokio::test]
    async fn method_not_found_yields_an_empty_list() {
        let client = McpClient::new("http://127.0.0.1:1", McpClientConfig::default()).unwrap();
        let items = list_paginated(&client, "tools/list", "tools", LIST_CAP).await;
        assert!(items.is_err() || items.unwrap().is_empty());
    }
}
