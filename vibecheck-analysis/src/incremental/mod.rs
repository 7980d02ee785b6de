//! Incremental change detection over persisted hash + dependency state.

pub mod deps;
mod engine;

pub use engine::{ChangeSet, IncrementalEngine, ScannedFile};
