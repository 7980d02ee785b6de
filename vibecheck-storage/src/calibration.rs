//! Persistence for verifier calibration buckets (`calibration.json`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use vibecheck_core::types::calibration::CalibrationBucket;
use vibecheck_core::FxHashMap;

use crate::json::{read_json_or_default, write_json_atomic};
use crate::paths;

/// Buckets keyed by `"<claim_type>:<source>"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationData {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub buckets: FxHashMap<String, Vec<CalibrationBucket>>,
}

fn default_version() -> u32 {
    1
}

/// Loads and saves `calibration.json`.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            path: paths::calibration_path(project_root),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Best-effort load; a missing or corrupt file starts fresh.
    pub fn load(&self) -> CalibrationData {
        read_json_or_default(&self.path)
    }

    pub fn save(&self, data: &CalibrationData) -> std::io::Result<()> {
        write_json_atomic(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::at(dir.path().join("calibration.json"));
        let mut data = CalibrationData::default();
        let mut bucket = CalibrationBucket::new(0.8, 0.9);
        bucket.record(true);
        data.buckets.insert("import:ast".to_string(), vec![bucket]);
        store.save(&data).unwrap();
        let back = store.load();
        assert_eq!(back.buckets["import:ast"][0].total, 1);
    }
}
