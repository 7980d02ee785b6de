//! Scan orchestrator: change detection → cache probe → worker pool →
//! merge → persist, with deterministic output ordering and streaming
//! event delivery.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use vibecheck_core::config::VibeConfig;
use vibecheck_core::errors::{PoolError, ScanError};
use vibecheck_core::events::{ScanEvent, ScanSummary};
use vibecheck_core::types::finding::{Finding, FindingCategory};
use vibecheck_core::types::fingerprint::content_hash;
use vibecheck_core::{CancellationToken, FxHashSet};
use vibecheck_storage::allowlist::Allowlist;
use vibecheck_storage::{paths, MultiLevelCache};

use crate::filter;
use crate::incremental::{deps, IncrementalEngine, ScannedFile};
use crate::patterns::PatternRegistry;
use crate::pool::WorkerPool;
use crate::scanner::{hasher, walker, DiscoveredFile};
use crate::stream::EventDispatcher;

/// Wall-clock spent per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimings {
    pub walk_ms: u64,
    pub diff_ms: u64,
    pub scan_ms: u64,
    pub persist_ms: u64,
}

/// Change-set counts surfaced in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCounts {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub affected: usize,
    pub unchanged: usize,
}

/// The scan result: deterministic findings plus metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub summary: ScanSummary,
    pub changes: ChangeCounts,
    pub phases: PhaseTimings,
}

struct PoolUnit {
    rel_path: String,
    abs_path: PathBuf,
}

/// Scan one file's content against the registry through the filter.
///
/// Within a file, at most one finding per `(category, line)` — the first
/// registered pattern to match wins.
pub fn scan_content(registry: &PatternRegistry, rel_path: &str, content: &str) -> Vec<Finding> {
    let file_context = filter::context::classify_path(rel_path);
    let mut findings = Vec::new();
    let mut claimed: FxHashSet<(FindingCategory, u32)> = FxHashSet::default();

    for (line_index, line) in content.lines().enumerate() {
        // Pathologically long lines (generated bundles that slipped past
        // the walker globs) are skipped, not scanned.
        if line.len() > 5_000 {
            continue;
        }
        let line_no = (line_index + 1) as u32;
        for pattern in registry.enabled() {
            let key = (pattern.def.category, line_no);
            if claimed.contains(&key) {
                continue;
            }
            let Some((value, column)) = pattern.first_match(line) else {
                continue;
            };
            let Some(accepted) = filter::evaluate(pattern, line, value, file_context) else {
                continue;
            };
            claimed.insert(key);
            findings.push(Finding {
                id: Finding::stable_id(pattern.def.id, rel_path, line_no, &accepted.redacted),
                pattern_id: pattern.def.id.to_string(),
                path: rel_path.to_string(),
                line: line_no,
                column: (column + 1) as u32,
                severity: accepted.severity,
                category: pattern.def.category,
                confidence: accepted.confidence,
                redacted_evidence: accepted.redacted,
                suggested_fix: pattern.def.default_fix.map(str::to_string),
                autofixable: pattern.def.category == FindingCategory::Debug,
            });
        }
    }
    findings
}

pub struct ScanOrchestrator {
    root: PathBuf,
    config: VibeConfig,
    registry: Arc<PatternRegistry>,
    cache: MultiLevelCache,
    incremental: IncrementalEngine,
    allowlist: Allowlist,
}

impl ScanOrchestrator {
    /// Open the per-invocation context: compiled registry, both cache
    /// tiers, incremental state, and the allowlist.
    pub fn new(root: &Path, config: VibeConfig) -> Result<Self, ScanError> {
        let root = root
            .canonicalize()
            .map_err(|e| ScanError::InvalidInput {
                message: format!("{}: {e}", root.display()),
            })?;
        let cache = MultiLevelCache::open(&paths::cache_dir(&root), &config.cache)
            .map_err(|e| ScanError::Walk {
                message: e.to_string(),
            })?;
        let incremental = IncrementalEngine::initialize(&root, config.incremental.clone());
        let allowlist = Allowlist::for_project(&root);
        Ok(Self {
            root,
            registry: Arc::new(PatternRegistry::with_builtin_catalog()),
            cache,
            incremental,
            allowlist,
            config,
        })
    }

    /// Replace the registry (tests, custom catalogs).
    pub fn with_registry(mut self, registry: PatternRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn cache_stats(&self) -> vibecheck_storage::CacheStats {
        self.cache.stats()
    }

    /// Run one scan. Events stream over `events` when provided; the
    /// returned report carries the deterministically sorted findings.
    ///
    /// On cancellation the report is returned with `cancelled` set and
    /// neither the cache nor the incremental state is updated. On
    /// whole-scan timeout the typed error propagates and partial state is
    /// discarded.
    pub fn scan(
        &mut self,
        cancel: &CancellationToken,
        events: Option<Sender<ScanEvent>>,
    ) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let deadline = self
            .config
            .scan
            .timeout_ms
            .map(|ms| start + Duration::from_millis(ms));
        self.check_memory()?;

        // Phase 1: discovery.
        let files = walker::walk_directory(&self.root, &self.config.scan, cancel.as_atomic())?;
        let walk_ms = start.elapsed().as_millis() as u64;
        if cancel.is_cancelled() {
            return Ok(self.cancelled_report(files.len(), walk_ms, events));
        }

        // Phase 2: change set.
        let diff_start = Instant::now();
        let force_full = self.config.scan.effective_force_full()
            || !self.config.incremental.effective_enabled();
        let changes = self.incremental.compute_changes(&files, force_full);
        let diff_ms = diff_start.elapsed().as_millis() as u64;

        let change_counts = ChangeCounts {
            added: changes.added.len(),
            modified: changes.modified.len(),
            deleted: changes.deleted.len(),
            affected: changes.affected.len(),
            unchanged: changes.unchanged.len(),
        };
        tracing::debug!(
            added = change_counts.added,
            modified = change_counts.modified,
            deleted = change_counts.deleted,
            affected = change_counts.affected,
            unchanged = change_counts.unchanged,
            "change set computed"
        );

        let mut dispatcher = events.map(|tx| {
            let mut dispatcher = EventDispatcher::new(
                tx,
                files.len(),
                Duration::from_millis(self.config.stream.effective_progress_interval_ms()),
            );
            dispatcher.start(&self.root.to_string_lossy());
            dispatcher
        });

        let scan_start = Instant::now();
        let mut all_findings: Vec<Finding> = Vec::new();
        let mut scanned_records: Vec<ScannedFile> = Vec::new();
        let mut files_from_cache = 0usize;
        let mut files_scanned = 0usize;
        let mut errors = 0usize;
        let mut cancelled = false;

        // Phase 3: cached findings for unchanged paths.
        let mut needs_scan: Vec<String> = changes.to_scan();
        for rel_path in &changes.unchanged {
            match self.incremental.cached_findings(rel_path) {
                Some(findings) => {
                    if let Some(dispatcher) = dispatcher.as_mut() {
                        for finding in findings {
                            dispatcher.finding(finding);
                        }
                        dispatcher.file_complete(rel_path, findings.len(), true, Duration::ZERO);
                    }
                    all_findings.extend_from_slice(findings);
                    files_from_cache += 1;
                }
                // Unchanged but with no cached findings (pruned state):
                // re-scan it.
                None => needs_scan.push(rel_path.clone()),
            }
        }

        // Phase 4: multi-level cache probe keyed by content hash.
        let by_rel: vibecheck_core::FxHashMap<&str, &DiscoveredFile> =
            files.iter().map(|f| (f.rel_path.as_str(), f)).collect();
        let mut pool_units: Vec<PoolUnit> = Vec::new();
        for rel_path in &needs_scan {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let Some(discovered) = by_rel.get(rel_path.as_str()) else {
                continue;
            };
            let bytes = match std::fs::read(&discovered.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    errors += 1;
                    if let Some(dispatcher) = dispatcher.as_mut() {
                        dispatcher.file_error(rel_path, &e.to_string());
                    }
                    continue;
                }
            };
            let hash = content_hash(&bytes);
            let cache_key = format!("scan:{rel_path}:{hash}");
            if let Some(findings) = self.cache.get_json::<Vec<Finding>>(&cache_key) {
                if let Some(dispatcher) = dispatcher.as_mut() {
                    for finding in &findings {
                        dispatcher.finding(finding);
                    }
                    dispatcher.file_complete(rel_path, findings.len(), true, Duration::ZERO);
                }
                let content = String::from_utf8_lossy(&bytes);
                scanned_records.push(ScannedFile {
                    fingerprint: hasher::fingerprint_bytes(discovered, &bytes),
                    findings: findings.clone(),
                    import_specs: deps::extract_relative_imports(&content),
                });
                all_findings.extend(findings);
                files_from_cache += 1;
            } else {
                pool_units.push(PoolUnit {
                    rel_path: rel_path.clone(),
                    abs_path: discovered.path.clone(),
                });
            }
        }

        // Phase 5: worker pool over the remaining paths.
        if !pool_units.is_empty() && !cancelled {
            let registry = Arc::clone(&self.registry);
            let pool = WorkerPool::with_cancellation(
                &self.config.pool,
                cancel.clone(),
                move |unit: PoolUnit, ctx| {
                    ctx.checkpoint()?;
                    let bytes =
                        std::fs::read(&unit.abs_path).map_err(|e| PoolError::Failed {
                            message: e.to_string(),
                        })?;
                    let fingerprint = vibecheck_core::types::fingerprint::FileFingerprint {
                        relative_path: unit.rel_path.clone(),
                        content_hash: content_hash(&bytes),
                        byte_size: bytes.len() as u64,
                        mtime_ms: 0,
                    };
                    // Binary files carry no scannable lines.
                    if bytes.contains(&0) {
                        return Ok(ScannedFile {
                            fingerprint,
                            findings: Vec::new(),
                            import_specs: Vec::new(),
                        });
                    }
                    let content = String::from_utf8_lossy(&bytes);
                    ctx.checkpoint()?;
                    let findings = scan_content(&registry, &unit.rel_path, &content);
                    Ok(ScannedFile {
                        fingerprint,
                        findings,
                        import_specs: deps::extract_relative_imports(&content),
                    })
                },
            );

            let expected = pool_units.len();
            let unit_paths: Vec<String> =
                pool_units.iter().map(|u| u.rel_path.clone()).collect();
            let rx = pool.submit_stream(pool_units);
            let mut received = 0usize;
            while received < expected {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        pool.cancel();
                        pool.shutdown();
                        return Err(ScanError::Timeout {
                            elapsed_ms: start.elapsed().as_millis() as u64,
                        });
                    }
                }
                let Ok((index, result)) = rx.recv() else {
                    break;
                };
                received += 1;
                let rel_path = &unit_paths[index];
                match result {
                    Ok(scanned) => {
                        // mtime is patched from discovery metadata; the
                        // pool only knows bytes.
                        let mut scanned = scanned;
                        if let Some(discovered) = by_rel.get(rel_path.as_str()) {
                            scanned.fingerprint.mtime_ms = discovered.mtime_ms;
                        }
                        if let Some(dispatcher) = dispatcher.as_mut() {
                            for finding in &scanned.findings {
                                dispatcher.finding(finding);
                            }
                            dispatcher.file_complete(
                                rel_path,
                                scanned.findings.len(),
                                false,
                                Duration::ZERO,
                            );
                        }
                        all_findings.extend(scanned.findings.iter().cloned());
                        files_scanned += 1;
                        scanned_records.push(scanned);
                    }
                    Err(PoolError::Cancelled) => {
                        cancelled = true;
                    }
                    Err(e) => {
                        errors += 1;
                        if let Some(dispatcher) = dispatcher.as_mut() {
                            dispatcher.file_error(rel_path, &e.to_string());
                        }
                    }
                }
                if cancel.is_cancelled() {
                    cancelled = true;
                }
            }
            pool.shutdown();
        }
        cancelled |= cancel.is_cancelled();
        let scan_ms = scan_start.elapsed().as_millis() as u64;

        // Phase 6: merge — allowlist suppression, global dedup, sort.
        all_findings.retain(|f| !self.allowlist.contains(&f.allowlist_fingerprint()));
        let mut seen_keys = FxHashSet::default();
        all_findings.retain(|f| seen_keys.insert(f.dedup_key()));
        all_findings.sort_by_key(|f| f.sort_key());

        // Phase 7: persist cache + incremental state. Skipped entirely on
        // cancellation so a partial scan never poisons the next one.
        let persist_start = Instant::now();
        if !cancelled {
            for record in &scanned_records {
                let key = format!(
                    "scan:{}:{}",
                    record.fingerprint.relative_path, record.fingerprint.content_hash
                );
                self.cache.set_json(&key, &record.findings, None);
            }
            self.incremental
                .update_state(scanned_records, &changes.deleted, &files)?;
        }
        let persist_ms = persist_start.elapsed().as_millis() as u64;

        let summary = ScanSummary {
            files_total: files.len(),
            files_scanned,
            files_from_cache,
            findings_total: all_findings.len(),
            errors,
            duration_ms: start.elapsed().as_millis() as u64,
            cancelled,
        };
        if let Some(dispatcher) = dispatcher {
            dispatcher.complete(summary.clone());
        }

        Ok(ScanReport {
            findings: all_findings,
            summary,
            changes: change_counts,
            phases: PhaseTimings {
                walk_ms,
                diff_ms,
                scan_ms,
                persist_ms,
            },
        })
    }

    fn cancelled_report(
        &self,
        files_total: usize,
        walk_ms: u64,
        events: Option<Sender<ScanEvent>>,
    ) -> ScanReport {
        let summary = ScanSummary {
            files_total,
            cancelled: true,
            duration_ms: walk_ms,
            ..Default::default()
        };
        if let Some(tx) = events {
            let mut dispatcher = EventDispatcher::new(tx, files_total, Duration::from_millis(250));
            dispatcher.start(&self.root.to_string_lossy());
            dispatcher.complete(summary.clone());
        }
        ScanReport {
            findings: Vec::new(),
            summary,
            changes: ChangeCounts::default(),
            phases: PhaseTimings {
                walk_ms,
                ..Default::default()
            },
        }
    }

    /// Memory guard: refuse to start when available memory is below the
    /// configured floor. Best-effort (Linux `/proc/meminfo`); platforms
    /// without a probe skip the check.
    fn check_memory(&self) -> Result<(), ScanError> {
        let Some(required) = self.config.scan.min_free_memory_bytes else {
            return Ok(());
        };
        if let Some(available) = available_memory_bytes() {
            if available < required {
                return Err(ScanError::OutOfMemory {
                    available,
                    required,
                });
            }
        }
        Ok(())
    }

    /// The project root after canonicalization.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(target_os = "linux")]
fn available_memory_bytes() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix("MemAvailable:") {
            let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn available_memory_bytes() -> Option<u64> {
    None
}
