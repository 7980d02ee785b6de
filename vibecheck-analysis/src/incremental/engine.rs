//! The incremental engine: compute {added, modified, deleted, affected}
//! change sets and maintain the persisted state between scans.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use vibecheck_core::config::IncrementalConfig;
use vibecheck_core::errors::StateError;
use vibecheck_core::time::now_ms;
use vibecheck_core::types::finding::Finding;
use vibecheck_core::types::fingerprint::FileFingerprint;
use vibecheck_core::{FxHashMap, FxHashSet};
use vibecheck_storage::state::{IncrementalState, StateStore};

use crate::scanner::hasher;
use crate::scanner::types::DiscoveredFile;

use super::deps;

/// The computed change sets, all as relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    /// Transitive reverse-dependents of `added ∪ modified`, minus the
    /// primary change set.
    pub affected: Vec<String>,
    pub unchanged: Vec<String>,
}

impl ChangeSet {
    /// Paths that need re-scanning: primary changes plus affected.
    pub fn to_scan(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .added
            .iter()
            .chain(self.modified.iter())
            .chain(self.affected.iter())
            .cloned()
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

/// One scanned file's contribution to the next state.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub fingerprint: FileFingerprint,
    pub findings: Vec<Finding>,
    /// Raw relative-import specifiers harvested from the content.
    pub import_specs: Vec<String>,
}

/// Owns the persisted incremental state for one project.
pub struct IncrementalEngine {
    root: PathBuf,
    root_key: String,
    config: IncrementalConfig,
    store: StateStore,
    state: IncrementalState,
    has_previous_scan: bool,
}

impl IncrementalEngine {
    /// Load persisted state (if valid) or start fresh.
    pub fn initialize(root: &Path, config: IncrementalConfig) -> Self {
        let root_key = root.to_string_lossy().replace('\\', "/");
        let store = StateStore::for_project(root);
        let loaded = store.load(&root_key, config.effective_max_cache_age_ms());
        let has_previous_scan = loaded.is_some();
        let state = loaded.unwrap_or_else(|| IncrementalState::new(&root_key));
        Self {
            root: root.to_path_buf(),
            root_key,
            config,
            store,
            state,
            has_previous_scan,
        }
    }

    /// Whether a usable previous scan exists.
    pub fn has_previous_scan(&self) -> bool {
        self.has_previous_scan
    }

    pub fn tracked_files(&self) -> usize {
        self.state.file_hashes.len()
    }

    /// Cached findings for an unchanged path.
    pub fn cached_findings(&self, rel_path: &str) -> Option<&[Finding]> {
        self.state.cached_findings.get(rel_path).map(Vec::as_slice)
    }

    /// Cached content hash for a path.
    pub fn cached_hash(&self, rel_path: &str) -> Option<&str> {
        self.state
            .file_hashes
            .get(rel_path)
            .map(|fp| fp.content_hash.as_str())
    }

    /// Compute the change set for the current file listing.
    ///
    /// Without usable previous state (or when forced) every file is added.
    /// With git-diff mode enabled and a repository present, git statuses
    /// seed the candidate set and "modified" is re-verified by hash so
    /// touch-only changes do not re-scan. Otherwise hashes are compared in
    /// parallel batches.
    pub fn compute_changes(&self, files: &[DiscoveredFile], force_full: bool) -> ChangeSet {
        if force_full || !self.has_previous_scan {
            return ChangeSet {
                added: files.iter().map(|f| f.rel_path.clone()).collect(),
                ..Default::default()
            };
        }

        let current: FxHashMap<&str, &DiscoveredFile> =
            files.iter().map(|f| (f.rel_path.as_str(), f)).collect();

        let deleted: Vec<String> = self
            .state
            .file_hashes
            .keys()
            .filter(|path| !current.contains_key(path.as_str()))
            .cloned()
            .collect();

        let (added, modified, unchanged) = if self.config.effective_use_git_diff() {
            match self.git_changes(files) {
                Some(sets) => sets,
                None => self.hash_changes(files),
            }
        } else {
            self.hash_changes(files)
        };

        let affected = self.propagate(&added, &modified, &current);

        let mut change_set = ChangeSet {
            added,
            modified,
            deleted,
            affected,
            unchanged,
        };
        change_set.added.sort();
        change_set.modified.sort();
        change_set.deleted.sort();
        change_set.affected.sort();
        change_set.unchanged.sort();
        change_set
    }

    /// Hash-compare fallback: batches of `hash_batch_size` in parallel.
    fn hash_changes(
        &self,
        files: &[DiscoveredFile],
    ) -> (Vec<String>, Vec<String>, Vec<String>) {
        let batch = self.config.effective_hash_batch_size();
        let hashes = hasher::hash_files_batched(files, batch);

        let mut added = Vec::new();
        let mut modified = Vec::new();
        let mut unchanged = Vec::new();
        for (rel_path, hash) in hashes {
            match self.state.file_hashes.get(&rel_path) {
                None => added.push(rel_path),
                Some(cached) if cached.content_hash == hash => unchanged.push(rel_path),
                Some(_) => modified.push(rel_path),
            }
        }
        (added, modified, unchanged)
    }

    /// Git-status seed. Returns `None` when no repository is usable, so
    /// the caller falls back to hash comparison.
    fn git_changes(
        &self,
        files: &[DiscoveredFile],
    ) -> Option<(Vec<String>, Vec<String>, Vec<String>)> {
        let repo = git2::Repository::discover(&self.root).ok()?;
        let mut options = git2::StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        let statuses = repo.statuses(Some(&mut options)).ok()?;

        let mut dirty: FxHashSet<String> = FxHashSet::default();
        for entry in statuses.iter() {
            if let Some(path) = entry.path() {
                dirty.insert(path.to_string());
            }
        }

        let mut added = Vec::new();
        let mut modified = Vec::new();
        let mut unchanged = Vec::new();
        for file in files {
            match self.state.file_hashes.get(&file.rel_path) {
                None => added.push(file.rel_path.clone()),
                Some(cached) => {
                    if dirty.contains(&file.rel_path) {
                        // Re-verify by hash: a touch without a content
                        // change is not a modification.
                        let hash = hasher::hash_file(&file.path);
                        if hash == cached.content_hash {
                            unchanged.push(file.rel_path.clone());
                        } else {
                            modified.push(file.rel_path.clone());
                        }
                    } else {
                        unchanged.push(file.rel_path.clone());
                    }
                }
            }
        }
        Some((added, modified, unchanged))
    }

    /// Follow reverse dependency edges to the transitive closure of the
    /// primary change set.
    fn propagate(
        &self,
        added: &[String],
        modified: &[String],
        current: &FxHashMap<&str, &DiscoveredFile>,
    ) -> Vec<String> {
        // Reverse edges: dependency -> dependents.
        let mut reverse: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        for (from, to_set) in &self.state.dep_graph {
            for to in to_set {
                reverse.entry(to.as_str()).or_default().push(from.as_str());
            }
        }

        let primary: FxHashSet<&str> = added
            .iter()
            .chain(modified.iter())
            .map(String::as_str)
            .collect();

        let mut affected: FxHashSet<String> = FxHashSet::default();
        let mut queue: Vec<&str> = primary.iter().copied().collect();
        while let Some(path) = queue.pop() {
            if let Some(dependents) = reverse.get(path) {
                for dependent in dependents {
                    if primary.contains(dependent) || !current.contains_key(dependent) {
                        continue;
                    }
                    if affected.insert((*dependent).to_string()) {
                        queue.push(dependent);
                    }
                }
            }
        }
        affected.into_iter().collect()
    }

    /// Rewrite state for the scanned paths, drop deleted ones, refresh the
    /// dependency graph for scanned paths only, and persist atomically.
    pub fn update_state(
        &mut self,
        scanned: Vec<ScannedFile>,
        deleted: &[String],
        current_files: &[DiscoveredFile],
    ) -> Result<(), StateError> {
        self.state.remove_paths(deleted);

        let known: FxHashSet<String> = current_files
            .iter()
            .map(|f| f.rel_path.clone())
            .collect();

        for file in scanned {
            let rel_path = file.fingerprint.relative_path.clone();
            let resolved: FxHashSet<String> = file
                .import_specs
                .iter()
                .filter_map(|spec| deps::resolve_import(&rel_path, spec, &known))
                .collect();
            self.state.dep_graph.insert(rel_path.clone(), resolved);
            self.state
                .cached_findings
                .insert(rel_path.clone(), file.findings);
            self.state.file_hashes.insert(rel_path, file.fingerprint);
        }

        self.state.last_scan_ms = now_ms();
        self.store.save(&self.state)?;
        self.has_previous_scan = true;
        Ok(())
    }

    /// Drop paths from all three maps (no persist).
    pub fn invalidate(&mut self, paths: &[String]) {
        self.state.remove_paths(paths);
    }

    /// The project root key persisted in the state.
    pub fn root_key(&self) -> &str {
        &self.root_key
    }
}

/// Parallel-batch dependency extraction for scanned files, used when the
/// orchestrator already holds file contents.
pub fn extract_import_specs(content: &str) -> Vec<String> {
    deps::extract_relative_imports(content)
}
