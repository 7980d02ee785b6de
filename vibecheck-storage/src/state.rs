//! Incremental scan state: content hashes, dependency graph, and cached
//! findings, persisted as one versioned JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use vibecheck_core::errors::StateError;
use vibecheck_core::time::now_ms;
use vibecheck_core::types::finding::Finding;
use vibecheck_core::{FileFingerprint, FxHashMap, FxHashSet};

use crate::json::{read_json, write_json_atomic};
use crate::paths;

/// Current state schema version.
pub const STATE_VERSION: u32 = 1;

/// The persisted incremental state.
///
/// Invariants restored on load:
/// every `cached_findings` key also appears in `file_hashes`, and every
/// dependency edge points at a path present in `file_hashes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalState {
    pub version: u32,
    pub last_scan_ms: u64,
    pub file_hashes: FxHashMap<String, FileFingerprint>,
    /// `path -> paths it imports` (forward edges).
    pub dep_graph: FxHashMap<String, FxHashSet<String>>,
    pub cached_findings: FxHashMap<String, Vec<Finding>>,
    pub project_root: String,
}

impl IncrementalState {
    /// Fresh state for a project.
    pub fn new(project_root: &str) -> Self {
        Self {
            version: STATE_VERSION,
            last_scan_ms: 0,
            file_hashes: FxHashMap::default(),
            dep_graph: FxHashMap::default(),
            cached_findings: FxHashMap::default(),
            project_root: project_root.to_string(),
        }
    }

    /// Re-establish the cross-map invariants after deserialization.
    fn normalize(&mut self) {
        let known: FxHashSet<String> = self.file_hashes.keys().cloned().collect();
        self.cached_findings.retain(|path, _| known.contains(path));
        self.dep_graph.retain(|path, _| known.contains(path));
        for deps in self.dep_graph.values_mut() {
            deps.retain(|dep| known.contains(dep));
        }
    }

    /// Remove paths from all three maps.
    pub fn remove_paths(&mut self, paths: &[String]) {
        for path in paths {
            self.file_hashes.remove(path);
            self.cached_findings.remove(path);
            self.dep_graph.remove(path);
        }
        for deps in self.dep_graph.values_mut() {
            for path in paths {
                deps.remove(path);
            }
        }
    }
}

/// Loads and saves the state file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            path: paths::state_path(project_root),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load state, rejecting it when the project root differs or the state
    /// is older than `max_age_ms`. Rejected and unreadable states are
    /// discarded silently (the caller re-seeds).
    pub fn load(&self, project_root: &str, max_age_ms: u64) -> Option<IncrementalState> {
        let mut state: IncrementalState = match read_json(&self.path) {
            Ok(Some(state)) => state,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e,
                    "discarding unreadable incremental state");
                let _ = std::fs::remove_file(&self.path);
                return None;
            }
        };

        if state.project_root != project_root {
            tracing::debug!(
                expected = project_root,
                found = %state.project_root,
                "incremental state belongs to another project, discarding"
            );
            return None;
        }

        let age = now_ms().saturating_sub(state.last_scan_ms);
        if state.last_scan_ms > 0 && age > max_age_ms {
            tracing::debug!(age_ms = age, max_age_ms, "incremental state too old, discarding");
            return None;
        }

        state.normalize();
        Some(state)
    }

    /// Atomic persist.
    pub fn save(&self, state: &IncrementalState) -> Result<(), StateError> {
        write_json_atomic(&self.path, state)?;
        Ok(())
    }
}
