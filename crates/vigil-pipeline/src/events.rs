//! Progress events a caller (the CLI's status line, a future TUI) can
//! subscribe to without coupling to the orchestrator's internals, mirroring
//! the teacher's report-progress channel.

use vigil_common::ScanWarning;

#[derive(Debug, Clone)]
pub enum ScanEvent {
    FileScanned { path: String, findings: usize },
    Warning(ScanWarning),
    TargetStarted { target: String },
    TargetFinished { target: String, files: usize },
    FindingBudgetExceeded,
}

pub type EventSink = tokio::sync::mpsc::UnboundedSender<ScanEvent>;

/// Sends `event`, ignoring a disconnected receiver. Progress events are
/// advisory; a scan must never fail because nobody was listening.
pub fn emit(sink: Option<&EventSink>, event: ScanEvent) {
    if let Some(sink) = sink {
        let _ = sink.send(event);
    }
}
