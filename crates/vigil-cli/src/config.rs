//! Layered tunable resolution: CLI flag, then the `SCANNER_*` environment
//! variables from spec.md §6 (read verbatim, not renamed), then the
//! crate-level default.

use std::path::PathBuf;
use std::time::Duration;

use vigil_cache::{CacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_SIZE_BYTES, DEFAULT_TTL_SECS};
use vigil_mcp::McpClientConfig;
use vigil_pipeline::{DEFAULT_MAX_TOTAL_FINDINGS, DEFAULT_PARALLEL_THRESHOLD};

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"),
        Err(_) => default,
    }
}

pub struct PipelineTunables {
    pub parallel_enabled: bool,
    pub parallel_threshold: usize,
    pub max_total_findings: usize,
    pub max_findings_per_file: usize,
    pub regex_timeout_ms: u64,
}

pub fn pipeline_tunables_from_env() -> PipelineTunables {
    PipelineTunables {
        parallel_enabled: env_bool("SCANNER_PARALLEL_ENABLED", true),
        parallel_threshold: env_usize("SCANNER_PARALLEL_THRESHOLD", DEFAULT_PARALLEL_THRESHOLD),
        max_total_findings: env_usize("SCANNER_MAX_TOTAL_FINDINGS", DEFAULT_MAX_TOTAL_FINDINGS),
        max_findings_per_file: env_usize(
            "SCANNER_MAX_FINDINGS_PER_FILE",
            vigil_pipeline::DEFAULT_MAX_FINDINGS_PER_FILE,
        ),
        regex_timeout_ms: env_u64("SCANNER_REGEX_TIMEOUT_MS", vigil_engine::DEFAULT_REGEX_TIMEOUT_MS),
    }
}

pub fn cache_config_from_env() -> CacheConfig {
    let dir = std::env::var("SCANNER_CACHE_DIR").ok().map(PathBuf::from);
    let max_size_mb = env_u64("SCANNER_CACHE_MAX_SIZE_MB", DEFAULT_MAX_SIZE_BYTES / (1024 * 1024));
    CacheConfig {
        dir,
        ttl_secs: env_i64("SCANNER_CACHE_MAX_AGE", DEFAULT_TTL_SECS),
        max_entries: env_usize("SCANNER_CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
        max_size_bytes: max_size_mb * 1024 * 1024,
    }
}

pub fn cache_enabled_from_env() -> bool {
    env_bool("SCANNER_CACHE_ENABLED", true)
}

pub fn mcp_client_config_from_env(bearer_token: Option<String>, headers: Vec<(String, String)>) -> McpClientConfig {
    McpClientConfig {
        bearer_token,
        extra_headers: headers,
        max_retries: env_usize("SCANNER_MCP_MAX_RETRIES", 3) as u32,
        timeout: Duration::from_millis(env_u64("SCANNER_MCP_TIMEOUT_MS", 30_000)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_unset() {
        std::env::remove_var("SCANNER_PARALLEL_THRESHOLD");
        let t = pipeline_tunables_from_env();
        assert_eq!(t.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }
}
