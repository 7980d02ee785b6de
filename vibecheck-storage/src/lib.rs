//! # vibecheck-storage
//!
//! Persistence for the VibeCheck engine: the two-tier cache, truthpack
//! records, incremental scan state, calibration buckets, and the secrets
//! allowlist. Everything on disk is versioned JSON written atomically
//! (write-temp, fsync, rename); readers are best-effort and tolerate
//! unknown fields and partial files.

pub mod allowlist;
pub mod cache;
pub mod calibration;
pub mod json;
pub mod paths;
pub mod state;
pub mod truthpack;

pub use allowlist::Allowlist;
pub use cache::{CacheStats, MultiLevelCache, TierStats};
pub use calibration::{CalibrationData, CalibrationStore};
pub use state::{IncrementalState, StateStore};
pub use truthpack::TruthpackStore;
