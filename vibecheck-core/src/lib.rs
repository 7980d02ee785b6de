//! # vibecheck-core
//!
//! Foundation crate for the VibeCheck analysis engine.
//! Defines all shared types, errors, config, events, and cancellation.
//! Every other crate in the workspace depends on this.

pub mod cancel;
pub mod config;
pub mod errors;
pub mod events;
pub mod time;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use cancel::CancellationToken;
pub use config::VibeConfig;
pub use errors::error_code::VibeErrorCode;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::finding::{Finding, FindingCategory, Severity};
pub use types::fingerprint::FileFingerprint;
