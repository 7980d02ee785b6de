//! Drift detection: compare live-code extraction against the truthpack.

mod detector;
pub mod extract;
mod source;

pub use detector::{diff_auth, diff_env, diff_routes, diff_types, DriftDetector};
pub use extract::extract_truthpack;
pub use source::{collect_sources, SourceFile};
