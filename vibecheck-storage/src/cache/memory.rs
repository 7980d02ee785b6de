//! L1: in-memory byte-bounded cache with scored eviction.
//!
//! Eviction score = `created_at_ms − hit_count · hit_bonus_ms`; the lowest
//! score evicts first. `hit_bonus_ms` is the tunable ms-equivalent weight
//! of one hit. TTL is enforced on read and by the periodic sweep.

use std::sync::Mutex;

use vibecheck_core::time::now_ms;
use vibecheck_core::FxHashMap;

use super::stats::{TierCounters, TierStats};

#[derive(Debug, Clone)]
struct MemEntry {
    data: Vec<u8>,
    byte_size: u64,
    created_at_ms: u64,
    expires_at_ms: Option<u64>,
    hit_count: u64,
}

impl MemEntry {
    fn expired(&self, now: u64) -> bool {
        matches!(self.expires_at_ms, Some(at) if now >= at)
    }

    fn eviction_score(&self, hit_bonus_ms: u64) -> i128 {
        self.created_at_ms as i128 - (self.hit_count as i128 * hit_bonus_ms as i128)
    }
}

#[derive(Debug, Default)]
struct MemInner {
    entries: FxHashMap<String, MemEntry>,
    total_bytes: u64,
}

/// The in-memory tier. All mutation is serialized by one internal lock;
/// hit/miss counters are atomic.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Mutex<MemInner>,
    capacity_bytes: u64,
    hit_bonus_ms: u64,
    counters: TierCounters,
}

impl MemoryCache {
    pub fn new(capacity_bytes: u64, hit_bonus_ms: u64) -> Self {
        Self {
            inner: Mutex::new(MemInner::default()),
            capacity_bytes,
            hit_bonus_ms,
            counters: TierCounters::default(),
        }
    }

    /// Look up a key, counting a hit on success. Expired entries are
    /// removed on the way.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.get_at(key, now_ms())
    }

    pub(crate) fn get_at(&self, key: &str, now: u64) -> Option<Vec<u8>> {
        let mut inner = self.inner.lock().expect("memory cache lock");
        let expired = inner
            .entries
            .get(key)
            .map(|e| e.expired(now))
            .unwrap_or(false);
        if expired {
            if let Some(entry) = inner.entries.remove(key) {
                inner.total_bytes -= entry.byte_size;
            }
            self.counters.record_miss();
            return None;
        }
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.hit_count += 1;
                self.counters.record_hit();
                Some(entry.data.clone())
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    /// Insert, evicting lowest-score entries until the value fits.
    /// Values larger than the ceiling are never inserted.
    pub fn insert(&self, key: &str, data: Vec<u8>, ttl_ms: Option<u64>) -> bool {
        self.insert_at(key, data, ttl_ms, now_ms())
    }

    pub(crate) fn insert_at(
        &self,
        key: &str,
        data: Vec<u8>,
        ttl_ms: Option<u64>,
        now: u64,
    ) -> bool {
        let byte_size = data.len() as u64;
        if byte_size > self.capacity_bytes {
            return false;
        }
        let mut inner = self.inner.lock().expect("memory cache lock");
        if let Some(old) = inner.entries.remove(key) {
            inner.total_bytes -= old.byte_size;
        }
        while inner.total_bytes + byte_size > self.capacity_bytes {
            let victim = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.eviction_score(self.hit_bonus_ms))
                .map(|(k, _)| k.clone());
            match victim {
                Some(victim_key) => {
                    if let Some(evicted) = inner.entries.remove(&victim_key) {
                        inner.total_bytes -= evicted.byte_size;
                    }
                }
                None => break,
            }
        }
        inner.entries.insert(
            key.to_string(),
            MemEntry {
                data,
                byte_size,
                created_at_ms: now,
                expires_at_ms: ttl_ms.map(|ttl| now + ttl),
                hit_count: 0,
            },
        );
        inner.total_bytes += byte_size;
        true
    }

    /// Whether a live (non-expired) entry exists. Does not count a hit.
    pub fn contains(&self, key: &str) -> bool {
        let now = now_ms();
        let inner = self.inner.lock().expect("memory cache lock");
        inner
            .entries
            .get(key)
            .map(|e| !e.expired(now))
            .unwrap_or(false)
    }

    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().expect("memory cache lock");
        match inner.entries.remove(key) {
            Some(entry) => {
                inner.total_bytes -= entry.byte_size;
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("memory cache lock");
        inner.entries.clear();
        inner.total_bytes = 0;
    }

    /// Drop every expired entry. Called by the minute-scale sweep.
    pub fn cleanup(&self) -> usize {
        let now = now_ms();
        let mut inner = self.inner.lock().expect("memory cache lock");
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            if let Some(entry) = inner.entries.remove(key) {
                inner.total_bytes -= entry.byte_size;
            }
        }
        expired.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.inner.lock().expect("memory cache lock").total_bytes
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("memory cache lock").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TierStats {
        self.counters.snapshot()
    }
}
