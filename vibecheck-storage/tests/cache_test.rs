//! Multi-level cache behavior over real wall-clock and disk: TTL bounds,
//! size ceilings, tier interplay, and corruption handling.

use std::time::Duration;

use proptest::prelude::*;

use vibecheck_core::config::CacheConfig;
use vibecheck_storage::cache::{DiskCache, MemoryCache, MultiLevelCache};
use vibecheck_storage::paths;

fn config(memory: u64, disk: u64) -> CacheConfig {
    CacheConfig {
        memory_max_bytes: Some(memory),
        disk_max_bytes: Some(disk),
        default_ttl_ms: Some(60_000),
        ..Default::default()
    }
}

#[test]
fn ttl_holds_until_expiry_and_misses_after() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MultiLevelCache::open(dir.path(), &config(1 << 20, 1 << 20)).unwrap();
    cache.set("k", b"value".to_vec(), Some(150));

    // Live well inside the TTL.
    assert_eq!(cache.get("k"), Some(b"value".to_vec()));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(cache.get("k"), Some(b"value".to_vec()));

    // Strictly after expiry: miss from both tiers.
    std::thread::sleep(Duration::from_millis(180));
    assert_eq!(cache.get("k"), None);
    assert!(!cache.has("k"));
}

#[test]
fn get_or_compute_runs_the_closure_once() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MultiLevelCache::open(dir.path(), &config(1 << 20, 1 << 20)).unwrap();
    let mut calls = 0;
    let value = cache.get_or_compute("expensive", None, || {
        calls += 1;
        b"computed".to_vec()
    });
    assert_eq!(value, b"computed");
    let value = cache.get_or_compute("expensive", None, || {
        calls += 1;
        b"recomputed".to_vec()
    });
    assert_eq!(value, b"computed");
    assert_eq!(calls, 1);
}

#[test]
fn write_through_and_promote_flags() {
    let dir = tempfile::tempdir().unwrap();
    let no_write_through = CacheConfig {
        write_through: Some(false),
        ..config(1 << 20, 1 << 20)
    };
    let cache = MultiLevelCache::open(&dir.path().join("a"), &no_write_through).unwrap();
    cache.set("k", b"v".to_vec(), None);
    // Nothing reached the disk tier.
    let disk = DiskCache::open(&dir.path().join("a"), 1 << 20).unwrap();
    assert_eq!(disk.get("k"), None);

    let no_promote = CacheConfig {
        promote_on_access: Some(false),
        ..config(1 << 20, 1 << 20)
    };
    let cache = MultiLevelCache::open(&dir.path().join("b"), &no_promote).unwrap();
    cache.set("k", b"v".to_vec(), None);
    // L2 still serves the value either way.
    assert_eq!(cache.get("k"), Some(b"v".to_vec()));
}

#[test]
fn expired_disk_entries_are_purged_on_open() {
    let dir = tempfile::tempdir().unwrap();
    {
        let disk = DiskCache::open(dir.path(), 1 << 20).unwrap();
        disk.set("stale", b"old", Some(1)).unwrap();
        disk.set("fresh", b"new", Some(60_000)).unwrap();
    }
    std::thread::sleep(Duration::from_millis(10));
    let disk = DiskCache::open(dir.path(), 1 << 20).unwrap();
    assert_eq!(disk.get("stale"), None);
    assert_eq!(disk.get("fresh"), Some(b"new".to_vec()));
}

#[test]
fn disk_ceiling_enforced_to_ninety_percent() {
    let dir = tempfile::tempdir().unwrap();
    let disk = DiskCache::open(dir.path(), 1000).unwrap();
    for i in 0..20 {
        disk.set(&format!("k{i}"), &[0u8; 100], None).unwrap();
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(disk.total_bytes() <= 1000);
    // Newest entries survive oldest-first deletion.
    assert!(disk.get("k19").is_some());
    assert!(disk.get("k0").is_none());
}

#[test]
fn corrupt_meta_is_removed_and_counts_as_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MultiLevelCache::open(dir.path(), &config(1 << 20, 1 << 20)).unwrap();
    cache.set("k", b"payload".to_vec(), None);

    // Trash every .meta sidecar on disk.
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) == Some("meta") {
            std::fs::write(&path, b"{not json").unwrap();
        }
    }
    let disk = DiskCache::open(dir.path(), 1 << 20).unwrap();
    assert_eq!(disk.get("k"), None);
    let stats = disk.stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 1);
}

#[test]
fn stats_track_both_tiers_and_combined_rate() {
    let dir = tempfile::tempdir().unwrap();
    let cache = MultiLevelCache::open(dir.path(), &config(1 << 20, 1 << 20)).unwrap();
    cache.set("k", b"v".to_vec(), None);
    assert!(cache.get("k").is_some()); // L1 hit
    assert!(cache.get("missing").is_none()); // both tiers miss
    let stats = cache.stats();
    assert_eq!(stats.memory.hits, 1);
    assert_eq!(stats.memory.misses, 1);
    assert!(stats.combined_hit_rate > 0.0 && stats.combined_hit_rate <= 1.0);
}

#[test]
fn cache_file_names_are_truncated_sha256() {
    let dir = tempfile::tempdir().unwrap();
    let disk = DiskCache::open(dir.path(), 1 << 20).unwrap();
    disk.set("scan:src/a.ts:deadbeef", b"x", None).unwrap();
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    let payload = names.iter().find(|n| !n.ends_with(".meta")).unwrap();
    assert_eq!(payload.len(), 32);
    assert!(payload.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(names.contains(&format!("{payload}.meta")));
}

#[test]
fn vibecheck_layout_paths() {
    let root = std::path::Path::new("/project");
    assert_eq!(
        paths::cache_dir(root),
        std::path::PathBuf::from("/project/.vibecheck/cache")
    );
    assert_eq!(
        paths::state_path(root),
        std::path::PathBuf::from("/project/.vibecheck/incremental-state.json")
    );
    assert_eq!(
        paths::allowlist_path(root),
        std::path::PathBuf::from("/project/.vibecheck/secrets.allowlist")
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For any insert sequence whose sizes sum past the ceiling, the
    /// post-state memory size stays at or under the ceiling.
    #[test]
    fn memory_ceiling_is_never_exceeded(
        sizes in prop::collection::vec(1usize..400, 1..40),
        ceiling in 256u64..2048,
    ) {
        let cache = MemoryCache::new(ceiling, 1000);
        for (i, size) in sizes.iter().enumerate() {
            cache.insert(&format!("k{i}"), vec![0u8; *size], None);
            prop_assert!(cache.total_bytes() <= ceiling);
        }
        prop_assert!(cache.total_bytes() <= ceiling);
    }
}
