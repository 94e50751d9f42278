//! Orchestrates a full scan: file enumeration, bounded-concurrency
//! dispatch to the engine and cache, MCP-target bridging, the aggregate
//! post-pass, and graceful cancellation (spec.md §4.5, §5).

mod budget;
mod chunk;
mod concurrency;
mod events;
mod mcp_bridge;
mod orchestrator;
mod postpass;
mod scan_file;
mod signal;
mod walk;

pub use budget::{FindingBudget, DEFAULT_MAX_TOTAL_FINDINGS};
pub use concurrency::{bounded_concurrency_limit, chunk_count, DEFAULT_PARALLEL_THRESHOLD};
pub use events::{emit, EventSink, ScanEvent};
pub use mcp_bridge::{scan_mcp_target, McpScanOutcome};
pub use orchestrator::{run_scan, PipelineOptions, ScanOutcome, TargetOutcome};
pub use postpass::{dedup, filter_by_confidence, run_fix_pass, ConfidenceFilterOutcome};
pub use scan_file::{scan_one_file, FileScanOutcome, DEFAULT_MAX_FINDINGS_PER_FILE};
pub use signal::install as install_signal_handler;
pub use walk::collect_files;
