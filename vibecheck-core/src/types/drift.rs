//! Drift: differences between live-code extraction and the truthpack.

use serde::{Deserialize, Serialize};

use super::finding::Severity;

/// Direction of a drift item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftChangeType {
    Added,
    Removed,
    Modified,
}

/// Which truthpack surface drifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftCategory {
    Route,
    Env,
    Auth,
    Type,
    Component,
    Api,
}

/// One detected difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftItem {
    pub change_type: DriftChangeType,
    pub category: DriftCategory,
    /// E.g. `"GET /users/:id"`, `"DB_URL"`, `"UserProfile"`.
    pub identifier: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truthpack_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codebase_value: Option<String>,
}

/// Aggregated drift counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub total_drift: usize,
    pub critical_count: usize,
    pub high_count: usize,
}

impl DriftSummary {
    /// Tally a list of items.
    pub fn from_items(items: &[DriftItem]) -> Self {
        let mut summary = DriftSummary::default();
        for item in items {
            match item.change_type {
                DriftChangeType::Added => summary.added += 1,
                DriftChangeType::Removed => summary.removed += 1,
                DriftChangeType::Modified => summary.modified += 1,
            }
            match item.severity {
                Severity::Critical => summary.critical_count += 1,
                Severity::High => summary.high_count += 1,
                _ => {}
            }
        }
        summary.total_drift = items.len();
        summary
    }
}

/// Full drift report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub items: Vec<DriftItem>,
    pub summary: DriftSummary,
    pub recommendations: Vec<String>,
    pub duration_ms: u64,
}
