//! Claims and evidence: assertions extracted from code, verified against
//! multiple sources with a weighted consensus.

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;

/// What kind of assertion a claim makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Import,
    FunctionCall,
    TypeReference,
    ApiEndpoint,
    EnvVariable,
    FileReference,
    PackageDependency,
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClaimType::Import => "import",
            ClaimType::FunctionCall => "function_call",
            ClaimType::TypeReference => "type_reference",
            ClaimType::ApiEndpoint => "api_endpoint",
            ClaimType::EnvVariable => "env_variable",
            ClaimType::FileReference => "file_reference",
            ClaimType::PackageDependency => "package_dependency",
        };
        f.write_str(s)
    }
}

/// Where the claim was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLocation {
    pub file: String,
    pub line: u32,
}

/// An extracted assertion submitted to the verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ClaimLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Evidence sources, each with a fixed reliability weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Truthpack,
    Ast,
    Filesystem,
    Git,
    PackageJson,
    TypescriptCompiler,
    Runtime,
}

impl EvidenceSource {
    /// Fixed source-reliability table.
    pub fn reliability(self) -> f64 {
        match self {
            EvidenceSource::Runtime => 0.99,
            EvidenceSource::PackageJson => 0.99,
            EvidenceSource::TypescriptCompiler => 0.98,
            EvidenceSource::Truthpack => 0.95,
            EvidenceSource::Ast => 0.90,
            EvidenceSource::Filesystem => 0.85,
            EvidenceSource::Git => 0.80,
        }
    }

    /// All sources, in descending reliability order.
    pub fn all() -> [EvidenceSource; 7] {
        [
            EvidenceSource::Runtime,
            EvidenceSource::PackageJson,
            EvidenceSource::TypescriptCompiler,
            EvidenceSource::Truthpack,
            EvidenceSource::Ast,
            EvidenceSource::Filesystem,
            EvidenceSource::Git,
        ]
    }
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EvidenceSource::Truthpack => "truthpack",
            EvidenceSource::Ast => "ast",
            EvidenceSource::Filesystem => "filesystem",
            EvidenceSource::Git => "git",
            EvidenceSource::PackageJson => "package_json",
            EvidenceSource::TypescriptCompiler => "typescript_compiler",
            EvidenceSource::Runtime => "runtime",
        };
        f.write_str(s)
    }
}

/// The raw result from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: EvidenceSource,
    pub verified: bool,
    /// Confidence in [0, 1] as reported by the source, before weighting.
    pub confidence: f64,
    pub details: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One numbered step in an evidence chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceStep {
    pub step_no: usize,
    pub source: EvidenceSource,
    pub supports: bool,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub metadata: FxHashMap<String, String>,
}

/// Verdict derived from aggregate confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimVerdict {
    Confirmed,
    Likely,
    Uncertain,
    Unlikely,
    Dismissed,
}

impl ClaimVerdict {
    /// Threshold mapping: `confirmed ≥ 0.9, likely ≥ 0.7, uncertain ≥ 0.5,
    /// unlikely ≥ 0.3, dismissed < 0.3`.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            ClaimVerdict::Confirmed
        } else if confidence >= 0.7 {
            ClaimVerdict::Likely
        } else if confidence >= 0.5 {
            ClaimVerdict::Uncertain
        } else if confidence >= 0.3 {
            ClaimVerdict::Unlikely
        } else {
            ClaimVerdict::Dismissed
        }
    }
}

impl std::fmt::Display for ClaimVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClaimVerdict::Confirmed => "confirmed",
            ClaimVerdict::Likely => "likely",
            ClaimVerdict::Uncertain => "uncertain",
            ClaimVerdict::Unlikely => "unlikely",
            ClaimVerdict::Dismissed => "dismissed",
        };
        f.write_str(s)
    }
}

/// Ordered evidence steps plus the derived verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceChain {
    pub claim_id: String,
    pub steps: Vec<EvidenceStep>,
    pub verdict: ClaimVerdict,
    pub aggregate_confidence: f64,
    pub reasoning: String,
}

/// Full per-claim verification output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub claim: Claim,
    pub evidences: Vec<Evidence>,
    pub chain: EvidenceChain,
    pub consensus: bool,
    pub verdict: ClaimVerdict,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_thresholds() {
        assert_eq!(ClaimVerdict::from_confidence(0.95), ClaimVerdict::Confirmed);
        assert_eq!(ClaimVerdict::from_confidence(0.9), ClaimVerdict::Confirmed);
        assert_eq!(ClaimVerdict::from_confidence(0.89), ClaimVerdict::Likely);
        assert_eq!(ClaimVerdict::from_confidence(0.69), ClaimVerdict::Uncertain);
        assert_eq!(ClaimVerdict::from_confidence(0.49), ClaimVerdict::Unlikely);
        assert_eq!(ClaimVerdict::from_confidence(0.29), ClaimVerdict::Dismissed);
    }

    #[test]
    fn reliability_table_is_fixed() {
        assert_eq!(EvidenceSource::Runtime.reliability(), 0.99);
        assert_eq!(EvidenceSource::PackageJson.reliability(), 0.99);
        assert_eq!(EvidenceSource::TypescriptCompiler.reliability(), 0.98);
        assert_eq!(EvidenceSource::Truthpack.reliability(), 0.95);
        assert_eq!(EvidenceSource::Ast.reliability(), 0.90);
        assert_eq!(EvidenceSource::Filesystem.reliability(), 0.85);
        assert_eq!(EvidenceSource::Git.reliability(), 0.80);
    }
}
