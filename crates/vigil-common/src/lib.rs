//! Shared domain types used by every other `vigil-*` crate: severities,
//! file-type tags, findings, targets, and the error taxonomy.

mod errors;
mod file_type;
mod finding;
mod severity;
mod target;

pub use errors::{ScanWarning, VigilError};
pub use file_type::FileType;
pub use finding::{Finding, FindingSource};
pub use severity::Severity;
pub use target::{BrowserMeta, IdeMeta, McpMeta, Target, TargetKind, TargetMeta};
