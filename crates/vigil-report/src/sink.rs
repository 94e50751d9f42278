//! Where a produced report goes: stdout or a file (spec.md §6 `--output`).
//! HTML/CSV sinks are external collaborators; this module only defines the
//! trait they would implement against, plus the JSON/SARIF sinks this crate
//! ships.

use std::io::Write;
use std::path::Path;

use serde_json::Value;
use vigil_common::VigilError;

pub trait ReportSink {
    fn write(&self, document: &Value) -> Result<(), VigilError>;
}

pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn write(&self, document: &Value) -> Result<(), VigilError> {
        let text = serde_json::to_string_pretty(document).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to serialize report: {e}"),
        })?;
        println!("{text}");
        Ok(())
    }
}

pub struct FileSink {
    pub path: std::path::PathBuf,
}

impl ReportSink for FileSink {
    fn write(&self, document: &Value) -> Result<(), VigilError> {
        let text = serde_json::to_string_pretty(document).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to serialize report: {e}"),
        })?;
        let mut file = std::fs::File::create(&self.path).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to create {}: {e}", self.path.display()),
        })?;
        file.write_all(text.as_bytes()).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to write {}: {e}", self.path.display()),
        })
    }
}

pub fn sink_for(output: Option<&Path>) -> Box<dyn ReportSink> {
    match output {
        Some(path) => Box::new(FileSink { path: path.to_path_buf() }),
        None => Box::new(StdoutSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_writes_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let sink = FileSink { path: path.clone() };
        sink.write(&serde_json::json!({"ok": true})).unwrap();

        let read_back: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read_back["ok"], true);
    }

    #[test]
    fn sink_for_none_output_is_boxed_stdout_sink() {
        let sink = sink_for(None);
        assert!(sink.write(&serde_json::json!({})).is_ok());
    }
}
