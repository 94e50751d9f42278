//! Scanning engine: line indexing, per-rule regex evaluation with ReDoS
//! bounds, behavioral heuristics, and post-hoc confidence scoring
//! (spec.md §4.3).

mod confidence;
mod engine;
mod heuristics;
mod line_index;
mod redos;
mod signature;

pub use engine::{attach_confidence, scan_content, EngineOptions, EngineOutcome};
pub use line_index::LineIndex;
pub use redos::{RedosGuard, DEFAULT_REGEX_TIMEOUT_MS};
pub use signature::{
    run_signature_rules, SignatureOptions, SignatureOutcome, DEFAULT_MAX_FINDINGS_PER_RULE_PER_FILE,
};
