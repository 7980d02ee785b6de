//! Truthpack evidence: does the recorded snapshot know this claim?

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::verify::context::ProjectContext;

use super::{timed_evidence, EvidenceCollector};

pub struct TruthpackCollector;

impl EvidenceCollector for TruthpackCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Truthpack
    }

    fn supports(&self, claim_type: ClaimType) -> bool {
        matches!(
            claim_type,
            ClaimType::ApiEndpoint | ClaimType::EnvVariable | ClaimType::TypeReference
        )
    }

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || {
            if ctx.truthpack.is_empty() {
                return (
                    false,
                    0.0,
                    "no truthpack recorded".to_string(),
                    Some("truthpack missing".to_string()),
                );
            }
            match claim.claim_type {
                ClaimType::ApiEndpoint => {
                    // Accept "METHOD /path" or a bare path.
                    let (method, path) = claim
                        .value
                        .split_once(' ')
                        .unwrap_or(("", claim.value.as_str()));
                    let found = ctx.truthpack.routes.routes.iter().any(|r| {
                        r.path == path && (method.is_empty() || r.method == method)
                    }) || ctx
                        .truthpack
                        .contracts
                        .endpoints
                        .iter()
                        .any(|e| e.path == path && (method.is_empty() || e.method == method));
                    if found {
                        (true, 0.9, format!("route {} recorded", claim.value), None)
                    } else {
                        (false, 0.7, format!("route {} not in truthpack", claim.value), None)
                    }
                }
                ClaimType::EnvVariable => {
                    let found = ctx
                        .truthpack
                        .env
                        .variables
                        .iter()
                        .any(|v| v.name == claim.value);
                    if found {
                        (true, 0.9, format!("env var {} declared", claim.value), None)
                    } else {
                        (
                            false,
                            0.7,
                            format!("env var {} not in truthpack", claim.value),
                            None,
                        )
                    }
                }
                ClaimType::TypeReference => {
                    let found = ctx
                        .truthpack
                        .contracts
                        .types
                        .iter()
                        .any(|t| t.name == claim.value);
                    if found {
                        (true, 0.85, format!("type {} recorded", claim.value), None)
                    } else {
                        (
                            false,
                            0.6,
                            format!("type {} not in truthpack", claim.value),
                            None,
                        )
                    }
                }
                _ => (false, 0.0, "unsupported claim type".to_string(), None),
            }
        })
    }
}
