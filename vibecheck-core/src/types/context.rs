//! File-context classification used for severity adjustment.

use serde::{Deserialize, Serialize};

/// Exactly one context is assigned to every scanned path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileContext {
    Production,
    Development,
    Test,
    Example,
    Documentation,
    Configuration,
    Unknown,
}

impl std::fmt::Display for FileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileContext::Production => "production",
            FileContext::Development => "development",
            FileContext::Test => "test",
            FileContext::Example => "example",
            FileContext::Documentation => "documentation",
            FileContext::Configuration => "configuration",
            FileContext::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
