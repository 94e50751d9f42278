//! Orchestrates one MCP target into a flat collected snapshot: best-effort
//! handshake, then whichever of tools/prompts/resources/instructions the
//! caller asked to scan (spec.md §4.6).

use serde_json::Value;
use vigil_common::VigilError;

use crate::initialize::initialize;
use crate::listing::{list_paginated, LIST_CAP};
use crate::resources::{mime_allowed, read_resource_content, DEFAULT_MAX_RESOURCE_BYTES};
use crate::transport::McpClient;

/// Which MCP surfaces a target should be scanned for, mirroring the CLI's
/// `--scan tools,prompts,resources,instructions` selector.
#[derive(Debug, Clone)]
pub struct ScanTargets {
    pub tools: bool,
    pub prompts: bool,
    pub resources: bool,
    pub instructions: bool,
}

impl Default for ScanTargets {
    fn default() -> Self {
        Self {
            tools: true,
            prompts: true,
            resources: true,
            instructions: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub client_name: String,
    pub client_version: String,
    pub read_resources: bool,
    pub allowed_resource_mimes: Option<Vec<String>>,
    pub max_resource_bytes: usize,
    pub targets: ScanTargets,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            client_name: "vigil".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            read_resources: true,
            allowed_resource_mimes: None,
            max_resource_bytes: DEFAULT_MAX_RESOURCE_BYTES,
            targets: ScanTargets::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub uri: String,
    pub mime_type: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub host: String,
    pub instructions: Option<String>,
    pub tools: Vec<Value>,
    pub prompts: Vec<Value>,
    pub resources: Vec<ResourceEntry>,
}

pub async fn collect(
    client: &McpClient,
    host: &str,
    opts: &CollectOptions,
) -> Result<Collected, VigilError> {
    let init = initialize(client, &opts.client_name, &opts.client_version).await;
    let instructions = if opts.targets.instructions {
        init.and_then(|i| i.instructions)
    } else {
        None
    };

    let tools = if opts.targets.tools {
        list_paginated(client, "tools/list", "tools", LIST_CAP).await?
    } else {
        Vec::new()
    };

    let prompts = if opts.targets.prompts {
        list_paginated(client, "prompts/list", "prompts", LIST_CAP).await?
    } else {
        Vec::new()
    };

    let resources = if opts.targets.resources {
        let listed = list_paginated(client, "resources/list", "resources", LIST_CAP).await?;
        let mut entries = Vec::with_capacity(listed.len());
        for r in listed {
            let uri = r.get("uri").and_then(Value::as_str).unwrap_or_default().to_string();
            let mime_type = r.get("mimeType").and_then(Value::as_str).map(String::from);
            let name = r.get("name").and_then(Value::as_str).map(String::from);

            let content = if opts.read_resources
                && mime_allowed(mime_type.as_deref(), opts.allowed_resource_mimes.as_deref())
            {
                read_resource_content(client, &uri, opts.max_resource_bytes)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::debug!(uri = %uri, error = %e, "failed to read resource, skipping");
                        None
                    })
            } else {
                None
            };

            entries.push(ResourceEntry {
                uri,
                mime_type,
                name,
                content,
            });
        }
        entries
    } else {
        Vec::new()
    };

    Ok(Collected {
        host: host.to_string(),
        instructions,
        tools,
        prompts,
        resources,
    })
}
