//! Scanner data types.

use std::path::PathBuf;

/// One file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated.
    pub rel_path: String,
    pub file_size: u64,
    pub mtime_ms: u64,
}
