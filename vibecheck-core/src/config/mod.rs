//! Configuration for every subsystem, loadable from `vibecheck.toml`.
//!
//! Each struct keeps raw `Option` fields so a TOML file can set any subset;
//! `effective_*` accessors apply the documented defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ScanError;
use crate::types::claim::EvidenceSource;
use crate::types::score::ScoreWeights;

/// File scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Include glob patterns — if non-empty, only matching paths scan.
    pub include: Vec<String>,
    /// Extra exclude patterns beyond the built-in defaults.
    pub exclude: Vec<String>,
    /// Maximum file size in bytes. Default: 1 MiB.
    pub max_file_size: Option<u64>,
    /// Walker/pool thread count. 0 = auto-detect.
    pub threads: Option<usize>,
    /// Follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Whole-scan timeout in milliseconds. Default: none.
    pub timeout_ms: Option<u64>,
    /// Force a full rescan, ignoring incremental state. Default: false.
    pub force_full: Option<bool>,
    /// Minimum free memory required before scanning. Default: disabled.
    pub min_free_memory_bytes: Option<u64>,
}

impl ScanConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(1_048_576)
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    pub fn effective_force_full(&self) -> bool {
        self.force_full.unwrap_or(false)
    }
}

/// Multi-level cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// L1 byte ceiling. Default: 50 MiB.
    pub memory_max_bytes: Option<u64>,
    /// L2 byte ceiling. Default: 256 MiB.
    pub disk_max_bytes: Option<u64>,
    /// Default TTL in milliseconds. Default: 1 hour.
    pub default_ttl_ms: Option<u64>,
    /// Re-promote L2 hits into L1. Default: true.
    pub promote_on_access: Option<bool>,
    /// Write entries through to L2. Default: true.
    pub write_through: Option<bool>,
    /// Effective age subtracted per hit in the L1 eviction score, in
    /// ms-equivalent per hit. Default: 1000.
    pub hit_bonus_ms: Option<u64>,
    /// TTL sweep interval. Default: 60 s.
    pub cleanup_interval_ms: Option<u64>,
}

impl CacheConfig {
    pub fn effective_memory_max_bytes(&self) -> u64 {
        self.memory_max_bytes.unwrap_or(50 * 1024 * 1024)
    }

    pub fn effective_disk_max_bytes(&self) -> u64 {
        self.disk_max_bytes.unwrap_or(256 * 1024 * 1024)
    }

    pub fn effective_default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms.unwrap_or(3_600_000)
    }

    pub fn effective_promote_on_access(&self) -> bool {
        self.promote_on_access.unwrap_or(true)
    }

    pub fn effective_write_through(&self) -> bool {
        self.write_through.unwrap_or(true)
    }

    pub fn effective_hit_bonus_ms(&self) -> u64 {
        self.hit_bonus_ms.unwrap_or(1000)
    }

    pub fn effective_cleanup_interval_ms(&self) -> u64 {
        self.cleanup_interval_ms.unwrap_or(60_000)
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Worker slots. 0 = `max(1, cpus − 1)`.
    pub workers: Option<usize>,
    /// Pending queue capacity. Default: 1000.
    pub queue_capacity: Option<usize>,
    /// Stable priority ordering. Default: false (FIFO).
    pub priority: Option<bool>,
    /// Per-task timeout fallback. Default: 30 s.
    pub default_timeout_ms: Option<u64>,
}

impl PoolConfig {
    pub fn effective_workers(&self) -> usize {
        match self.workers {
            Some(n) if n > 0 => n,
            _ => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                cpus.saturating_sub(1).max(1)
            }
        }
    }

    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(1000)
    }

    pub fn effective_priority(&self) -> bool {
        self.priority.unwrap_or(false)
    }

    pub fn effective_default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms.unwrap_or(30_000)
    }
}

/// Incremental engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncrementalConfig {
    /// Enable incremental change detection. Default: true.
    pub enabled: Option<bool>,
    /// Prefer git name-status over hash comparison. Default: true.
    pub use_git_diff: Option<bool>,
    /// Maximum accepted state age. Default: 7 days.
    pub max_cache_age_ms: Option<u64>,
    /// Hash-comparison batch size. Default: 50.
    pub hash_batch_size: Option<usize>,
}

impl IncrementalConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_use_git_diff(&self) -> bool {
        self.use_git_diff.unwrap_or(true)
    }

    pub fn effective_max_cache_age_ms(&self) -> u64 {
        self.max_cache_age_ms.unwrap_or(7 * 24 * 60 * 60 * 1000)
    }

    pub fn effective_hash_batch_size(&self) -> usize {
        self.hash_batch_size.unwrap_or(50)
    }
}

/// Streaming dispatcher configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Minimum gap between progress events. Default: 250 ms.
    pub progress_interval_ms: Option<u64>,
    /// Parallel stream concurrency. 0 = pool worker count.
    pub concurrency: Option<usize>,
}

impl StreamConfig {
    pub fn effective_progress_interval_ms(&self) -> u64 {
        self.progress_interval_ms.unwrap_or(250)
    }
}

/// Drift detector configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Total wall-clock ceiling across sub-detectors. Default: 60 s.
    pub total_timeout_ms: Option<u64>,
    /// Per-file size ceiling. Default: 1 MiB.
    pub max_file_bytes: Option<u64>,
}

impl DriftConfig {
    pub fn effective_total_timeout_ms(&self) -> u64 {
        self.total_timeout_ms.unwrap_or(60_000)
    }

    pub fn effective_max_file_bytes(&self) -> u64 {
        self.max_file_bytes.unwrap_or(1_048_576)
    }
}

/// Claim verifier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Enabled evidence sources. Default: every source except `runtime`.
    pub sources: Option<Vec<EvidenceSource>>,
    /// Run sources in parallel. Default: true.
    pub parallel: Option<bool>,
    /// Per-source timeout. Default: 5 s.
    pub source_timeout_ms: Option<u64>,
    /// Verified sources needed for consensus. Default: 2.
    pub required_sources: Option<usize>,
    /// Weighted-confidence floor for consensus. Default: 0.7.
    pub consensus_threshold: Option<f64>,
    /// Sequential mode early-exit confidence. Default: 0.9.
    pub early_exit_confidence: Option<f64>,
    /// Batch concurrency bound. Default: 10.
    pub batch_concurrency: Option<usize>,
    /// Samples before a calibration bucket starts remapping. Default: 10.
    pub min_samples_per_bucket: Option<u64>,
}

impl VerifierConfig {
    pub fn effective_sources(&self) -> Vec<EvidenceSource> {
        self.sources.clone().unwrap_or_else(|| {
            EvidenceSource::all()
                .into_iter()
                .filter(|s| *s != EvidenceSource::Runtime)
                .collect()
        })
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    pub fn effective_source_timeout_ms(&self) -> u64 {
        self.source_timeout_ms.unwrap_or(5_000)
    }

    pub fn effective_required_sources(&self) -> usize {
        self.required_sources.unwrap_or(2)
    }

    pub fn effective_consensus_threshold(&self) -> f64 {
        self.consensus_threshold.unwrap_or(0.7)
    }

    pub fn effective_early_exit_confidence(&self) -> f64 {
        self.early_exit_confidence.unwrap_or(0.9)
    }

    pub fn effective_batch_concurrency(&self) -> usize {
        self.batch_concurrency.unwrap_or(10)
    }

    pub fn effective_min_samples_per_bucket(&self) -> u64 {
        self.min_samples_per_bucket.unwrap_or(10)
    }
}

/// Root configuration, the shape of `vibecheck.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeConfig {
    pub scan: ScanConfig,
    pub cache: CacheConfig,
    pub pool: PoolConfig,
    pub incremental: IncrementalConfig,
    pub stream: StreamConfig,
    pub drift: DriftConfig,
    pub verifier: VerifierConfig,
    pub score: ScoreWeights,
}

impl VibeConfig {
    /// Load `vibecheck.toml` from the project root if present, otherwise
    /// defaults. Parse errors are invalid input, not silently ignored.
    pub fn load(project_root: &Path) -> Result<Self, ScanError> {
        let path = project_root.join("vibecheck.toml");
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| ScanError::InvalidInput {
            message: format!("{}: {e}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let config = VibeConfig::default();
        assert_eq!(config.scan.effective_max_file_size(), 1_048_576);
        assert_eq!(config.cache.effective_hit_bonus_ms(), 1000);
        assert_eq!(config.pool.effective_queue_capacity(), 1000);
        assert_eq!(config.incremental.effective_hash_batch_size(), 50);
        assert_eq!(config.stream.effective_progress_interval_ms(), 250);
        assert_eq!(config.drift.effective_total_timeout_ms(), 60_000);
        assert_eq!(config.verifier.effective_required_sources(), 2);
        assert!(config.pool.effective_workers() >= 1);
    }

    #[test]
    fn runtime_source_is_off_by_default() {
        let config = VerifierConfig::default();
        let sources = config.effective_sources();
        assert_eq!(sources.len(), 6);
        assert!(!sources.contains(&EvidenceSource::Runtime));
    }

    #[test]
    fn partial_toml_overlays_defaults() {
        let parsed: VibeConfig =
            toml::from_str("[cache]\nmemory_max_bytes = 1024\n").unwrap();
        assert_eq!(parsed.cache.effective_memory_max_bytes(), 1024);
        assert_eq!(parsed.cache.effective_default_ttl_ms(), 3_600_000);
    }
}
