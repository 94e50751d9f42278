//! `ScanStorage` is the seam an external history backend (JSON-file or
//! SQLite, per spec.md §6) would implement against. This crate ships only a
//! minimal JSON-lines reference implementation, exercised by its own tests,
//! not a production history store.

use std::path::{Path, PathBuf};

use vigil_common::VigilError;

use crate::envelope::ReportEnvelope;

pub trait ScanStorage {
    fn save(&self, id: &str, envelope: &ReportEnvelope) -> Result<(), VigilError>;
    fn load(&self, id: &str) -> Result<Option<ReportEnvelope>, VigilError>;
}

/// One JSON-lines file per scan, keyed by `id` as the filename stem.
pub struct JsonlStorage {
    pub dir: PathBuf,
}

impl JsonlStorage {
    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.jsonl"))
    }
}

impl ScanStorage for JsonlStorage {
    fn save(&self, id: &str, envelope: &ReportEnvelope) -> Result<(), VigilError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to create history dir: {e}"),
        })?;
        let line = serde_json::to_string(envelope).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to serialize scan: {e}"),
        })?;
        std::fs::write(self.path_for(id), line).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to write scan history: {e}"),
        })
    }

    fn load(&self, id: &str) -> Result<Option<ReportEnvelope>, VigilError> {
        let path = self.path_for(id);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| VigilError::CacheIoError {
            detail: format!("failed to read scan history: {e}"),
        })?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| VigilError::CacheIoError {
                detail: format!("failed to parse scan history: {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{build_envelope, Detected};

    #[test]
    fn round_trips_an_envelope_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonlStorage { dir: dir.path().to_path_buf() };
        let envelope = build_envelope(vec![], vec![], 1, 1, vec![], vec![], None);

        storage.save("scan-1", &envelope).unwrap();
        let loaded = storage.load("scan-1").unwrap().unwrap();
        assert_eq!(loaded.summary.scanned_files, 1);
        let _: &Detected = &loaded.detected;
    }

    #[test]
    fn missing_scan_id_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonlStorage { dir: dir.path().to_path_buf() };
        assert!(storage.load("missing").unwrap().is_none());
    }
}
