//! File discovery and content hashing.

pub mod hasher;
pub mod types;
pub mod walker;

pub use types::DiscoveredFile;
