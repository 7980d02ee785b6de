//! Streaming scan events.
//!
//! Invariants enforced by the dispatcher:
//! exactly one `Started` precedes everything and exactly one `Complete`
//! terminates; every `Finding` for a file precedes that file's
//! `FileComplete`; `Progress` is throttled to the configured interval.

use serde::{Deserialize, Serialize};

use crate::types::finding::Finding;

/// Rolled-up counts delivered with `Complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub files_total: usize,
    pub files_scanned: usize,
    pub files_from_cache: usize,
    pub findings_total: usize,
    pub errors: usize,
    pub duration_ms: u64,
    pub cancelled: bool,
}

/// The event vocabulary for streaming delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    Started {
        root: String,
        total_files: usize,
    },
    Progress {
        processed: usize,
        total: usize,
        percentage: f64,
        current_file: String,
        elapsed_ms: u64,
        estimated_remaining_ms: u64,
    },
    Finding(Finding),
    FileComplete {
        path: String,
        findings: usize,
        from_cache: bool,
    },
    Error {
        path: String,
        message: String,
        recoverable: bool,
    },
    Complete {
        summary: ScanSummary,
    },
}

impl ScanEvent {
    /// Event name as emitted in JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            ScanEvent::Started { .. } => "started",
            ScanEvent::Progress { .. } => "progress",
            ScanEvent::Finding(_) => "finding",
            ScanEvent::FileComplete { .. } => "file_complete",
            ScanEvent::Error { .. } => "error",
            ScanEvent::Complete { .. } => "complete",
        }
    }
}
