//! Atomic JSON read/write helpers shared by every store.

use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Write `value` as pretty JSON: temp file in the same directory, fsync,
/// rename over the target. Last writer wins.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        file.write_all(&body)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)
}

/// Read JSON from `path`. `Ok(None)` when the file is missing; `Err` when
/// it exists but cannot be parsed (callers decide whether to discard).
pub fn read_json<T: DeserializeOwned>(path: &Path) -> std::io::Result<Option<T>> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Best-effort read: missing or unparseable files yield the default and a
/// debug log. Partial writes are discarded, not propagated.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "discarding unreadable store");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");
        write_json_atomic(&path, &vec![1u32, 2, 3]).unwrap();
        let back: Option<Vec<u32>> = read_json(&path).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = read_json(&dir.path().join("nope.json")).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn partial_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{\"version\": 1, \"routes\": [").unwrap();
        let value: Vec<u32> = read_json_or_default(&path);
        assert!(value.is_empty());
    }
}
