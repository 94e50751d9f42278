//! Best-effort `initialize` handshake (spec.md §4.6). Failure here never
//! aborts a scan; the caller proceeds without instructions or server
//! metadata.

use serde_json::{json, Value};

use crate::transport::McpClient;

const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, Default)]
pub struct InitializeResult {
    pub instructions: Option<String>,
    pub protocol_version: Option<String>,
    pub server_info: Option<Value>,
}

pub async fn initialize(
    client: &McpClient,
    client_name: &str,
    client_version: &str,
) -> Option<InitializeResult> {
    let params = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": client_name,
            "version": client_version,
        },
    });

    match client.call("initialize", params).await {
        Ok(v) => Some(InitializeResult {
            instructions: v.get("instructions").and_then(Value::as_str).map(String::from),
            protocol_version: v
                .get("protocolVersion")
                .and_then(Value::as_str)
                .map(String::from),
            server_info: v.get("serverInfo").cloned(),
        }),
        Err(e) => {
            tracing::debug!(error = %e, "initialize failed, continuing best-effort");
            None
        }
    }
}
