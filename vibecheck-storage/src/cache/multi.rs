//! The combined cache facade: L1 always, L2 optional, promote-on-access,
//! and a background TTL sweep.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

use vibecheck_core::config::CacheConfig;
use vibecheck_core::errors::CacheError;

use super::disk::DiskCache;
use super::memory::MemoryCache;
use super::stats::CacheStats;

struct Tiers {
    l1: MemoryCache,
    l2: Option<DiskCache>,
}

/// Two-tier cache. `get` consults L1 first; on an L1 miss with an L2 hit
/// the value is re-promoted into L1 when `promote_on_access` is enabled.
/// `set` writes L1 always and L2 when `write_through` is enabled. A
/// janitor thread sweeps expired entries on `cleanup_interval_ms`.
pub struct MultiLevelCache {
    tiers: Arc<Tiers>,
    default_ttl_ms: u64,
    promote_on_access: bool,
    write_through: bool,
    janitor_stop: Arc<AtomicBool>,
    janitor: Option<JoinHandle<()>>,
}

impl MultiLevelCache {
    /// Memory-only cache (no disk tier, no janitor).
    pub fn memory_only(config: &CacheConfig) -> Self {
        Self {
            tiers: Arc::new(Tiers {
                l1: MemoryCache::new(
                    config.effective_memory_max_bytes(),
                    config.effective_hit_bonus_ms(),
                ),
                l2: None,
            }),
            default_ttl_ms: config.effective_default_ttl_ms(),
            promote_on_access: config.effective_promote_on_access(),
            write_through: config.effective_write_through(),
            janitor_stop: Arc::new(AtomicBool::new(false)),
            janitor: None,
        }
    }

    /// Full two-tier cache rooted at `cache_dir`, with the TTL janitor
    /// running.
    pub fn open(cache_dir: &Path, config: &CacheConfig) -> Result<Self, CacheError> {
        let tiers = Arc::new(Tiers {
            l1: MemoryCache::new(
                config.effective_memory_max_bytes(),
                config.effective_hit_bonus_ms(),
            ),
            l2: Some(DiskCache::open(
                cache_dir,
                config.effective_disk_max_bytes(),
            )?),
        });
        let janitor_stop = Arc::new(AtomicBool::new(false));
        let janitor = spawn_janitor(
            Arc::clone(&tiers),
            config.effective_cleanup_interval_ms(),
            Arc::clone(&janitor_stop),
        );
        Ok(Self {
            tiers,
            default_ttl_ms: config.effective_default_ttl_ms(),
            promote_on_access: config.effective_promote_on_access(),
            write_through: config.effective_write_through(),
            janitor_stop,
            janitor: Some(janitor),
        })
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(value) = self.tiers.l1.get(key) {
            return Some(value);
        }
        let l2 = self.tiers.l2.as_ref()?;
        let value = l2.get(key)?;
        if self.promote_on_access {
            self.tiers
                .l1
                .insert(key, value.clone(), Some(self.default_ttl_ms));
        }
        Some(value)
    }

    pub fn set(&self, key: &str, value: Vec<u8>, ttl_ms: Option<u64>) {
        let ttl = ttl_ms.or(Some(self.default_ttl_ms));
        if self.write_through {
            if let Some(l2) = &self.tiers.l2 {
                if let Err(e) = l2.set(key, &value, ttl) {
                    tracing::warn!(key, error = %e, "disk cache write failed");
                }
            }
        }
        self.tiers.l1.insert(key, value, ttl);
    }

    /// Fetch or compute-and-store.
    pub fn get_or_compute<F>(&self, key: &str, ttl_ms: Option<u64>, compute: F) -> Vec<u8>
    where
        F: FnOnce() -> Vec<u8>,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.set(key, value.clone(), ttl_ms);
        value
    }

    pub fn has(&self, key: &str) -> bool {
        self.tiers.l1.contains(key)
            || self
                .tiers
                .l2
                .as_ref()
                .map(|l2| l2.contains(key))
                .unwrap_or(false)
    }

    pub fn delete(&self, key: &str) -> bool {
        let in_l1 = self.tiers.l1.remove(key);
        let in_l2 = self
            .tiers
            .l2
            .as_ref()
            .map(|l2| l2.remove(key))
            .unwrap_or(false);
        in_l1 || in_l2
    }

    pub fn clear(&self) {
        self.tiers.l1.clear();
        if let Some(l2) = &self.tiers.l2 {
            if let Err(e) = l2.clear() {
                tracing::warn!(error = %e, "disk cache clear failed");
            }
        }
    }

    /// Immediate TTL sweep across both tiers (the janitor calls this on
    /// its interval).
    pub fn cleanup(&self) {
        self.tiers.l1.cleanup();
        if let Some(l2) = &self.tiers.l2 {
            l2.purge_expired();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let memory = self.tiers.l1.stats();
        let disk = self
            .tiers
            .l2
            .as_ref()
            .map(|l2| l2.stats())
            .unwrap_or_default();
        // Every lookup touches L1 first, so L1 hits+misses is the request
        // count; disk hits rescue a subset of the L1 misses.
        let requests = memory.hits + memory.misses;
        let combined_hits = memory.hits + disk.hits;
        let combined_hit_rate = if requests > 0 {
            (combined_hits as f64 / requests as f64).min(1.0)
        } else {
            0.0
        };
        CacheStats {
            memory,
            disk,
            combined_hit_rate,
            memory_bytes: self.tiers.l1.total_bytes(),
            disk_bytes: self
                .tiers
                .l2
                .as_ref()
                .map(|l2| l2.total_bytes())
                .unwrap_or(0),
        }
    }

    /// Typed convenience over the byte API.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cached value, deleting");
                self.delete(key);
                None
            }
        }
    }

    /// Typed convenience over the byte API.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_ms: Option<u64>) {
        match serde_json::to_vec(value) {
            Ok(raw) => self.set(key, raw, ttl_ms),
            Err(e) => tracing::warn!(key, error = %e, "value not serializable, skipping cache"),
        }
    }
}

impl Drop for MultiLevelCache {
    fn drop(&mut self) {
        self.janitor_stop.store(true, Ordering::Relaxed);
        if let Some(janitor) = self.janitor.take() {
            let _ = janitor.join();
        }
    }
}

/// Sweep loop. Sleeps in short ticks so shutdown never blocks a full
/// interval.
fn spawn_janitor(
    tiers: Arc<Tiers>,
    interval_ms: u64,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let interval = Duration::from_millis(interval_ms.max(1));
        let tick = Duration::from_millis(interval_ms.clamp(1, 200));
        let mut last_sweep = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            std::thread::sleep(tick);
            if last_sweep.elapsed() < interval {
                continue;
            }
            last_sweep = Instant::now();
            let expired = tiers.l1.cleanup();
            if expired > 0 {
                tracing::debug!(expired, "cache sweep dropped expired entries");
            }
            if let Some(l2) = &tiers.l2 {
                l2.purge_expired();
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CacheConfig {
        CacheConfig {
            memory_max_bytes: Some(1024),
            disk_max_bytes: Some(1 << 20),
            default_ttl_ms: Some(60_000),
            ..Default::default()
        }
    }

    #[test]
    fn l2_hit_promotes_into_l1() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MultiLevelCache::open(dir.path(), &config()).unwrap();
        cache.set("k", b"value".to_vec(), None);
        cache.tiers.l1.clear();
        assert_eq!(cache.get("k"), Some(b"value".to_vec()));
        // Second read must be served by L1.
        assert_eq!(cache.tiers.l1.get("k"), Some(b"value".to_vec()));
    }

    #[test]
    fn stats_expose_both_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MultiLevelCache::open(dir.path(), &config()).unwrap();
        cache.set("k", b"v".to_vec(), None);
        assert!(cache.get("k").is_some());
        assert!(cache.get("absent").is_none());
        let stats = cache.stats();
        assert_eq!(stats.memory.hits, 1);
        assert!(stats.combined_hit_rate > 0.0);
    }

    #[test]
    fn delete_removes_from_both_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MultiLevelCache::open(dir.path(), &config()).unwrap();
        cache.set("k", b"v".to_vec(), None);
        assert!(cache.delete("k"));
        assert!(!cache.has("k"));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn janitor_sweeps_expired_entries() {
        let dir = tempfile::tempdir().unwrap();
        let fast_sweep = CacheConfig {
            cleanup_interval_ms: Some(20),
            ..config()
        };
        let cache = MultiLevelCache::open(dir.path(), &fast_sweep).unwrap();
        cache.set("k", b"v".to_vec(), Some(10));
        std::thread::sleep(Duration::from_millis(80));
        // Swept without any read touching the key.
        assert_eq!(cache.tiers.l1.len(), 0);
    }
}
