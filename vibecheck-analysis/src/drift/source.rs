//! Source collection for the drift sub-detectors.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use vibecheck_core::config::ScanConfig;
use vibecheck_core::errors::DriftError;

use crate::scanner::walker;

/// One readable source file, already in memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub rel_path: String,
    pub content: String,
}

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

fn is_drift_input(rel_path: &str) -> bool {
    let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    if file_name.starts_with(".env") {
        return true;
    }
    let extension = file_name.rsplit('.').next().unwrap_or("");
    SOURCE_EXTENSIONS.contains(&extension)
}

/// Walk the tree and read every drift-relevant file under the size cap.
/// Oversized and unreadable files are skipped, not fatal.
pub fn collect_sources(root: &Path, max_file_bytes: u64) -> Result<Vec<SourceFile>, DriftError> {
    let config = ScanConfig {
        max_file_size: Some(max_file_bytes),
        ..Default::default()
    };
    let cancelled = AtomicBool::new(false);
    let files = walker::walk_directory(root, &config, &cancelled).map_err(|e| {
        DriftError::Io(std::io::Error::other(e.to_string()))
    })?;

    let mut sources = Vec::new();
    for file in files {
        if !is_drift_input(&file.rel_path) {
            continue;
        }
        if file.file_size > max_file_bytes {
            continue;
        }
        match std::fs::read_to_string(&file.path) {
            Ok(content) => sources.push(SourceFile {
                rel_path: file.rel_path,
                content,
            }),
            Err(e) => {
                tracing::debug!(path = %file.path.display(), error = %e, "skipping unreadable file");
            }
        }
    }
    Ok(sources)
}
