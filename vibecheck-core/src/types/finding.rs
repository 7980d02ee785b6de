//! Findings: a single rule match at a specific file:line.

use serde::{Deserialize, Serialize};

use super::fingerprint;

/// Finding severity. Ordered `low < medium < high < critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric rank, ascending with severity (`low` = 0, `critical` = 3).
    pub fn rank(self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }

    /// One step down the ladder. `low` stays `low`.
    pub fn downgrade(self) -> Severity {
        match self {
            Severity::Critical => Severity::High,
            Severity::High => Severity::Medium,
            Severity::Medium | Severity::Low => Severity::Low,
        }
    }

    /// One step up the ladder. `critical` stays `critical`.
    pub fn upgrade(self) -> Severity {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Detection categories shipped by the pattern catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FindingCategory {
    Credentials,
    Security,
    FakeFeatures,
    Hallucinations,
    MockData,
    CodeQuality,
    Debug,
    Todo,
    AiSmell,
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FindingCategory::Credentials => "credentials",
            FindingCategory::Security => "security",
            FindingCategory::FakeFeatures => "fake-features",
            FindingCategory::Hallucinations => "hallucinations",
            FindingCategory::MockData => "mock-data",
            FindingCategory::CodeQuality => "code-quality",
            FindingCategory::Debug => "debug",
            FindingCategory::Todo => "todo",
            FindingCategory::AiSmell => "ai-smell",
        };
        f.write_str(s)
    }
}

/// A single rule match. The `id` is stable across processes: it is derived
/// from `(pattern_id, path, line, redacted_evidence)` and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub pattern_id: String,
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub severity: Severity,
    pub category: FindingCategory,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub redacted_evidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    #[serde(default)]
    pub autofixable: bool,
}

impl Finding {
    /// Recompute the stable 16-hex id from the identifying fields.
    pub fn stable_id(pattern_id: &str, path: &str, line: u32, redacted: &str) -> String {
        fingerprint::finding_fingerprint(pattern_id, path, line, redacted)[..16].to_string()
    }

    /// Full 64-hex fingerprint used for allowlist entries.
    pub fn allowlist_fingerprint(&self) -> String {
        fingerprint::finding_fingerprint(
            &self.pattern_id,
            &self.path,
            self.line,
            &self.redacted_evidence,
        )
    }

    /// Key for the cross-run deduplication pass.
    pub fn dedup_key(&self) -> (String, u32, u32, String, String) {
        (
            self.path.clone(),
            self.line,
            self.column,
            self.pattern_id.clone(),
            self.redacted_evidence.clone(),
        )
    }

    /// Deterministic report ordering: most severe first, then by location.
    pub fn sort_key(&self) -> (u8, String, u32, u32, String) {
        (
            3 - self.severity.rank(),
            self.path.clone(),
            self.line,
            self.column,
            self.pattern_id.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ladder_saturates() {
        assert_eq!(Severity::Low.downgrade(), Severity::Low);
        assert_eq!(Severity::Critical.upgrade(), Severity::Critical);
        assert_eq!(Severity::Critical.downgrade(), Severity::High);
        assert_eq!(Severity::Medium.upgrade(), Severity::High);
    }

    #[test]
    fn severity_orders_ascending() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn stable_id_depends_only_on_identity_fields() {
        let a = Finding::stable_id("stripe-live-key", "src/config.ts", 3, "sk_l...90ab");
        let b = Finding::stable_id("stripe-live-key", "src/config.ts", 3, "sk_l...90ab");
        let c = Finding::stable_id("stripe-live-key", "src/config.ts", 4, "sk_l...90ab");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
