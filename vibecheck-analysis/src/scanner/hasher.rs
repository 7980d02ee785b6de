//! Content fingerprints: truncated SHA-256 over file bytes.

use std::path::Path;

use rayon::prelude::*;

use vibecheck_core::types::fingerprint::{content_hash, FileFingerprint};

use super::types::DiscoveredFile;

/// Hash one file. Returns `""` on read failure; downstream treats the
/// empty hash as distinct from every real hash.
pub fn hash_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => content_hash(&bytes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "hash failed");
            String::new()
        }
    }
}

/// Fingerprint a discovered file (reads the file once).
pub fn fingerprint(file: &DiscoveredFile) -> FileFingerprint {
    FileFingerprint {
        relative_path: file.rel_path.clone(),
        content_hash: hash_file(&file.path),
        byte_size: file.file_size,
        mtime_ms: file.mtime_ms,
    }
}

/// Fingerprint from bytes already in memory.
pub fn fingerprint_bytes(file: &DiscoveredFile, bytes: &[u8]) -> FileFingerprint {
    FileFingerprint {
        relative_path: file.rel_path.clone(),
        content_hash: content_hash(bytes),
        byte_size: file.file_size,
        mtime_ms: file.mtime_ms,
    }
}

/// Hash many files in parallel batches. Batch size bounds the rayon task
/// granularity so progress checks stay responsive on large trees.
pub fn hash_files_batched(
    files: &[DiscoveredFile],
    batch_size: usize,
) -> Vec<(String, String)> {
    let batch = batch_size.max(1);
    files
        .par_chunks(batch)
        .flat_map_iter(|chunk| {
            chunk
                .iter()
                .map(|file| (file.rel_path.clone(), hash_file(&file.path)))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_file_hashes_empty() {
        let hash = hash_file(Path::new("/definitely/not/here.ts"));
        assert_eq!(hash, "");
    }

    #[test]
    fn hash_is_stable_and_16_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        std::fs::write(&path, "const x = 1;\n").unwrap();
        let first = hash_file(&path);
        let second = hash_file(&path);
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
