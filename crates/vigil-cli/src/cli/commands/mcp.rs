use std::sync::Arc;
use std::time::Instant;

use vigil_common::Severity;
use vigil_engine::EngineOptions;
use vigil_mcp::{CollectOptions, McpClient, ScanTargets};
use vigil_pipeline::scan_mcp_target;
use vigil_report::{build_envelope, McpDetected, McpObjectCounts, TargetMeta};
use vigil_rules::{IndexedRuleEngine, RuleCatalog};

use crate::cli::args::McpTargetArgs;
use crate::cli::commands::render::render;
use crate::config;
use crate::exit_codes::{EXIT_SUCCESS, EXIT_USAGE_ERROR};

pub async fn run(args: &McpTargetArgs) -> i32 {
    let fail_on = match &args.fail_on {
        Some(raw) => match Severity::parse(raw) {
            Some(s) => Some(s),
            None => {
                eprintln!("error: invalid --fail-on value: {raw}");
                return EXIT_USAGE_ERROR;
            }
        },
        None => None,
    };

    let headers = match parse_headers(&args.headers) {
        Ok(h) => h,
        Err(bad) => {
            eprintln!("error: invalid --header value (expected \"Key: Value\"): {bad}");
            return EXIT_USAGE_ERROR;
        }
    };

    let client_config = config::mcp_client_config_from_env(args.bearer_token.clone(), headers);
    let client = match McpClient::new(args.url.clone(), client_config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: could not build MCP client: {e}");
            return EXIT_USAGE_ERROR;
        }
    };

    let catalog = RuleCatalog::load_default(None);
    let rules = IndexedRuleEngine::build(catalog);

    let targets = parse_scan_targets(&args.scan);
    let collect_opts = CollectOptions {
        client_name: "vigil".to_string(),
        client_version: env!("CARGO_PKG_VERSION").to_string(),
        read_resources: args.read_resources,
        allowed_resource_mimes: args
            .mime_types
            .as_ref()
            .map(|s| s.split(',').map(|m| m.trim().to_string()).collect()),
        max_resource_bytes: args
            .max_resource_bytes
            .unwrap_or(vigil_mcp::DEFAULT_MAX_RESOURCE_BYTES),
        targets,
    };

    let started = Instant::now();
    let outcome = match scan_mcp_target(&client, &args.url, &collect_opts, &rules, &EngineOptions::default()).await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: MCP scan failed: {e}");
            return EXIT_USAGE_ERROR;
        }
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let target_meta = vec![TargetMeta {
        path: args.url.clone(),
        kind: "mcp".to_string(),
        error: None,
    }];

    let mcp_detected = McpDetected {
        servers: 1,
        objects: McpObjectCounts {
            tools: outcome.tool_count,
            prompts: outcome.prompt_count,
            resources: outcome.resource_count,
            instructions: usize::from(outcome.has_instructions),
        },
    };

    let envelope = build_envelope(
        outcome.findings.clone(),
        target_meta,
        outcome.virtual_file_count,
        elapsed_ms,
        vec!["mcp".to_string()],
        vec!["mcp".to_string()],
        Some(mcp_detected),
    );

    render(&envelope, args.format, args.output.as_deref(), false);

    match fail_on {
        Some(threshold) => i32::from(vigil_report::exit_code(&outcome.findings, Some(threshold))),
        None => EXIT_SUCCESS,
    }
}

fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>, String> {
    raw.iter()
        .map(|h| {
            h.split_once(':')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| h.clone())
        })
        .collect()
}

fn parse_scan_targets(raw: &str) -> ScanTargets {
    let wanted: Vec<&str> = raw.split(',').map(str::trim).collect();
    ScanTargets {
        tools: wanted.contains(&"tools"),
        prompts: wanted.contains(&"prompts"),
        resources: wanted.contains(&"resources"),
        instructions: wanted.contains(&"instructions"),
    }
}
