//! FxHash-based collections used on every hot path.

pub use rustc_hash::{FxHashMap, FxHashSet};
