//! Bridges a collected MCP target into the same engine path used for
//! filesystem scans, by virtualizing its surfaces into synthetic files
//! first (spec.md §4.6).

use std::path::Path;

use vigil_common::{FileType, Finding, VigilError};
use vigil_engine::{scan_content, EngineOptions};
use vigil_mcp::{build_virtual_files, collect, CollectOptions, McpClient};
use vigil_rules::IndexedRuleEngine;

pub struct McpScanOutcome {
    pub findings: Vec<Finding>,
    pub virtual_file_count: usize,
    pub tool_count: usize,
    pub prompt_count: usize,
    pub resource_count: usize,
    pub has_instructions: bool,
}

pub async fn scan_mcp_target(
    client: &McpClient,
    host: &str,
    collect_opts: &CollectOptions,
    rules: &IndexedRuleEngine,
    engine_opts: &EngineOptions,
) -> Result<McpScanOutcome, VigilError> {
    let collected = collect(client, host, collect_opts).await?;
    let tool_count = collected.tools.len();
    let prompt_count = collected.prompts.len();
    let resource_count = collected.resources.len();
    let has_instructions = collected.instructions.is_some();

    let virtual_files = build_virtual_files(&collected);

    let mut findings = Vec::with_capacity(virtual_files.len());
    for vf in &virtual_files {
        let file_type = FileType::detect(Path::new(&vf.path));
        let outcome = scan_content(rules, &vf.content, &vf.path, &file_type, engine_opts);
        findings.extend(outcome.findings);
    }

    Ok(McpScanOutcome {
        findings,
        virtual_file_count: virtual_files.len(),
        tool_count,
        prompt_count,
        resource_count,
        has_instructions,
    })
}
