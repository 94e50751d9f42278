//! Report envelope, SARIF production, fail-on exit-code decision, and the
//! sink/storage seams external collaborators (HTML/CSV writers, a real
//! history backend) would implement against (spec.md §6).

mod envelope;
mod fail_on;
mod sarif;
mod sink;
mod storage;
mod summary;

pub use envelope::{build_detected, build_envelope, Detected, McpDetected, McpObjectCounts, ReportEnvelope, TargetMeta};
pub use fail_on::exit_code;
pub use sarif::{to_sarif, to_sarif_with_options, SarifOptions, SARIF_SCHEMA};
pub use sink::{sink_for, FileSink, ReportSink, StdoutSink};
pub use storage::{JsonlStorage, ScanStorage};
pub use summary::{build_summary, Summary};
