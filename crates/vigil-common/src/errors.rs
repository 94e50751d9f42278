use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The failure taxonomy from spec.md §7. All variants are recoverable
/// locally unless otherwise noted on the variant; propagation policy is
/// enforced by callers (per-file and per-rule failures never cross their
/// boundary — see `vigil-engine` and `vigil-pipeline`).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VigilError {
    #[error("path is unsafe: {reason}")]
    PathUnsafe { reason: String },

    #[error("file too large: {bytes} bytes")]
    FileTooLarge { bytes: u64 },

    #[error("binary content detected")]
    BinaryDetected,

    #[error("rule {rule_id} timed out on this file")]
    RegexTimeout { rule_id: String },

    #[error("rule pattern failed to compile: {pattern}")]
    RuleCompileError { pattern: String },

    #[error("cache I/O error: {detail}")]
    CacheIoError { detail: String },

    #[error("MCP method not found: {method}")]
    McpMethodNotFound { method: String },

    #[error("MCP RPC error {code}: {message}")]
    McpRpcError { code: i64, message: String },

    #[error("MCP network error: {detail}")]
    McpNetworkError { detail: String },

    #[error("usage error: {detail}")]
    UsageError { detail: String },

    #[error("finding budget exceeded (cap {cap})")]
    FindingBudgetExceeded { cap: usize },
}

impl VigilError {
    /// A short, stable tag usable as a machine-readable error code, mirroring
    /// the teacher's `RunErrorKind` discriminant used for diagnostics output.
    pub fn tag(&self) -> &'static str {
        match self {
            VigilError::PathUnsafe { .. } => "path_unsafe",
            VigilError::FileTooLarge { .. } => "file_too_large",
            VigilError::BinaryDetected => "binary_detected",
            VigilError::RegexTimeout { .. } => "regex_timeout",
            VigilError::RuleCompileError { .. } => "rule_compile_error",
            VigilError::CacheIoError { .. } => "cache_io_error",
            VigilError::McpMethodNotFound { .. } => "mcp_method_not_found",
            VigilError::McpRpcError { .. } => "mcp_rpc_error",
            VigilError::McpNetworkError { .. } => "mcp_network_error",
            VigilError::UsageError { .. } => "usage_error",
            VigilError::FindingBudgetExceeded { .. } => "finding_budget_exceeded",
        }
    }

    /// Whether this error is fatal for the whole run (spec.md §7: "Only
    /// usage errors and 'no targets' conditions halt the whole run").
    pub fn is_fatal(&self) -> bool {
        matches!(self, VigilError::UsageError { .. })
    }
}

/// A non-fatal condition surfaced to the user but not propagated as a hard
/// failure; attached to a scan result or a target's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanWarning {
    pub tag: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ScanWarning {
    pub fn from_error(err: &VigilError, file: Option<String>) -> Self {
        Self {
            tag: err.tag().to_string(),
            message: err.to_string(),
            file,
        }
    }
}
