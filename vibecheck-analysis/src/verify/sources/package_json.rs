//! package.json evidence: is the dependency declared?

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::verify::context::ProjectContext;

use super::{package_name, timed_evidence, EvidenceCollector};

pub struct PackageJsonCollector;

impl EvidenceCollector for PackageJsonCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::PackageJson
    }

    fn supports(&self, claim_type: ClaimType) -> bool {
        matches!(
            claim_type,
            ClaimType::PackageDependency | ClaimType::Import
        )
    }

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || {
            let Some(manifest) = &ctx.package_json else {
                return (
                    false,
                    0.0,
                    "no package.json".to_string(),
                    Some("package.json missing".to_string()),
                );
            };
            let package = match claim.claim_type {
                ClaimType::PackageDependency => Some(claim.value.clone()),
                ClaimType::Import => package_name(&claim.value),
                _ => None,
            };
            match package {
                Some(package) => {
                    if manifest.declares(&package) {
                        (true, 0.95, format!("{package} declared in package.json"), None)
                    } else {
                        // package.json is authoritative for dependencies:
                        // absence is a strong negative signal.
                        (
                            false,
                            0.9,
                            format!("{package} not declared in package.json"),
                            None,
                        )
                    }
                }
                None => (
                    false,
                    0.0,
                    "relative import, not a package".to_string(),
                    None,
                ),
            }
        })
    }
}
