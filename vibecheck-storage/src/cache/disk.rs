//! L2: on-disk store with gzip compression and metadata sidecars.
//!
//! Payload lives at `<dir>/<sha256(key)[:32]>`, metadata at the same path
//! plus `.meta`. Payloads over 1024 bytes that gzip to ≤ 90% of their raw
//! size are stored base64-gzipped with the `compressed` flag set.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use vibecheck_core::time::now_ms;
use vibecheck_core::types::fingerprint::{cache_key_hash, sha256_hex};

use super::stats::{TierCounters, TierStats};

const COMPRESS_MIN_BYTES: usize = 1024;

/// Metadata sidecar, one per payload file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiskMeta {
    key: String,
    /// Raw (uncompressed) payload size in bytes.
    size: u64,
    created_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
    compressed: bool,
    /// First 32 hex chars of SHA-256 over the raw payload.
    hash: String,
}

impl DiskMeta {
    fn expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }
}

/// The disk tier. Writes are serialized; reads only take the lock for
/// delete-on-corruption.
#[derive(Debug)]
pub struct DiskCache {
    dir: PathBuf,
    max_bytes: u64,
    write_lock: Mutex<()>,
    counters: TierCounters,
}

impl DiskCache {
    /// Open (creating the directory if needed) and purge expired entries.
    pub fn open(dir: &Path, max_bytes: u64) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let cache = Self {
            dir: dir.to_path_buf(),
            max_bytes,
            write_lock: Mutex::new(()),
            counters: TierCounters::default(),
        };
        cache.purge_expired();
        Ok(cache)
    }

    fn payload_path(&self, key: &str) -> PathBuf {
        self.dir.join(cache_key_hash(key))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.meta", cache_key_hash(key)))
    }

    /// Read a payload. Corrupt or expired entries are deleted and count as
    /// misses; scanning continues regardless.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let meta_path = self.meta_path(key);
        let payload_path = self.payload_path(key);

        let meta: DiskMeta = match crate::json::read_json(&meta_path) {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                self.counters.record_miss();
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache metadata, deleting entry");
                self.delete_entry(&meta_path, &payload_path);
                self.counters.record_miss();
                return None;
            }
        };

        if meta.expired(now_ms()) {
            self.delete_entry(&meta_path, &payload_path);
            self.counters.record_miss();
            return None;
        }

        let stored = match std::fs::read(&payload_path) {
            Ok(stored) => stored,
            Err(_) => {
                self.delete_entry(&meta_path, &payload_path);
                self.counters.record_miss();
                return None;
            }
        };

        let raw = if meta.compressed {
            match decompress(&stored) {
                Some(raw) => raw,
                None => {
                    tracing::warn!(key, "corrupt compressed payload, deleting entry");
                    self.delete_entry(&meta_path, &payload_path);
                    self.counters.record_miss();
                    return None;
                }
            }
        } else {
            stored
        };

        if sha256_hex(&raw)[..32] != meta.hash {
            tracing::warn!(key, "cache payload hash mismatch, deleting entry");
            self.delete_entry(&meta_path, &payload_path);
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        Some(raw)
    }

    /// Write a payload and its sidecar, then enforce the size ceiling.
    pub fn set(&self, key: &str, data: &[u8], ttl_ms: Option<u64>) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().expect("disk cache write lock");
        let now = now_ms();

        let (stored, compressed) = maybe_compress(data);
        let meta = DiskMeta {
            key: key.to_string(),
            size: data.len() as u64,
            created_at: now,
            expires_at: ttl_ms.map(|ttl| now + ttl),
            compressed,
            hash: sha256_hex(data)[..32].to_string(),
        };

        let payload_path = self.payload_path(key);
        let tmp = payload_path.with_extension("tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&stored)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &payload_path)?;
        crate::json::write_json_atomic(&self.meta_path(key), &meta)?;

        self.enforce_size(now);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        match crate::json::read_json::<DiskMeta>(&self.meta_path(key)) {
            Ok(Some(meta)) => !meta.expired(now_ms()),
            _ => false,
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        let existed = self.meta_path(key).exists();
        self.delete_entry(&self.meta_path(key), &self.payload_path(key));
        existed
    }

    pub fn clear(&self) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().expect("disk cache write lock");
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let _ = std::fs::remove_file(entry.path());
        }
        Ok(())
    }

    /// Total raw bytes across live entries.
    pub fn total_bytes(&self) -> u64 {
        self.iter_meta().map(|(_, meta)| meta.size).sum()
    }

    pub fn stats(&self) -> TierStats {
        self.counters.snapshot()
    }

    /// Delete expired metadata files and their payloads.
    pub fn purge_expired(&self) -> usize {
        let now = now_ms();
        let mut purged = 0;
        for (meta_path, meta) in self.iter_meta() {
            if meta.expired(now) {
                let payload = meta_path.with_extension("");
                self.delete_entry(&meta_path, &payload);
                purged += 1;
            }
        }
        purged
    }

    /// Oldest-first deletion until total raw bytes drop below 90% of the
    /// ceiling.
    fn enforce_size(&self, _now: u64) {
        let mut entries: Vec<(PathBuf, DiskMeta)> = self.iter_meta().collect();
        let mut total: u64 = entries.iter().map(|(_, m)| m.size).sum();
        if total <= self.max_bytes {
            return;
        }
        let target = (self.max_bytes as f64 * 0.9) as u64;
        entries.sort_by_key(|(_, m)| m.created_at);
        for (meta_path, meta) in entries {
            if total <= target {
                break;
            }
            let payload = meta_path.with_extension("");
            self.delete_entry(&meta_path, &payload);
            total = total.saturating_sub(meta.size);
        }
    }

    fn iter_meta(&self) -> impl Iterator<Item = (PathBuf, DiskMeta)> + '_ {
        std::fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("meta") {
                    return None;
                }
                let meta: DiskMeta = crate::json::read_json(&path).ok()??;
                Some((path, meta))
            })
    }

    fn delete_entry(&self, meta_path: &Path, payload_path: &Path) {
        let _ = std::fs::remove_file(meta_path);
        let _ = std::fs::remove_file(payload_path);
    }
}

/// Gzip + base64 when it pays for itself: payload > 1024 bytes and the
/// gzipped form is at least 10% smaller.
fn maybe_compress(data: &[u8]) -> (Vec<u8>, bool) {
    if data.len() > COMPRESS_MIN_BYTES {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        if encoder.write_all(data).is_ok() {
            if let Ok(gzipped) = encoder.finish() {
                if gzipped.len() * 10 <= data.len() * 9 {
                    return (BASE64.encode(&gzipped).into_bytes(), true);
                }
            }
        }
    }
    (data.to_vec(), false)
}

fn decompress(stored: &[u8]) -> Option<Vec<u8>> {
    let gzipped = BASE64.decode(stored).ok()?;
    let mut decoder = GzDecoder::new(gzipped.as_slice());
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).ok()?;
    Some(raw)
}
