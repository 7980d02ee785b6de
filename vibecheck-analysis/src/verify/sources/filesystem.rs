//! Filesystem evidence: does the referenced file or module exist on disk?

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::incremental::deps;
use crate::verify::context::ProjectContext;

use super::{package_name, timed_evidence, EvidenceCollector};

pub struct FilesystemCollector;

impl EvidenceCollector for FilesystemCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Filesystem
    }

    fn supports(&self, claim_type: ClaimType) -> bool {
        matches!(
            claim_type,
            ClaimType::FileReference | ClaimType::Import | ClaimType::PackageDependency
        )
    }

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || match claim.claim_type {
            ClaimType::FileReference => {
                let exists = ctx.file_exists(claim.value.trim_start_matches("./"));
                if exists {
                    (true, 0.95, format!("{} exists", claim.value), None)
                } else {
                    (false, 0.9, format!("{} not found on disk", claim.value), None)
                }
            }
            ClaimType::Import => {
                if claim.value.starts_with('.') {
                    let from = claim
                        .location
                        .as_ref()
                        .map(|l| l.file.as_str())
                        .unwrap_or("");
                    let resolved = deps::resolve_import(from, &claim.value, ctx.files());
                    match resolved {
                        Some(target) => {
                            (true, 0.95, format!("resolves to {target}"), None)
                        }
                        None => (
                            false,
                            0.85,
                            format!("{} does not resolve to any file", claim.value),
                            None,
                        ),
                    }
                } else {
                    match package_name(&claim.value) {
                        Some(package) => {
                            let installed =
                                ctx.root.join("node_modules").join(&package).is_dir();
                            if installed {
                                (true, 0.9, format!("{package} is installed"), None)
                            } else {
                                (
                                    false,
                                    0.8,
                                    format!("{package} not present in node_modules"),
                                    None,
                                )
                            }
                        }
                        None => (false, 0.0, "unresolvable specifier".to_string(), None),
                    }
                }
            }
            ClaimType::PackageDependency => {
                let installed = ctx.root.join("node_modules").join(&claim.value).is_dir();
                if installed {
                    (true, 0.9, format!("{} is installed", claim.value), None)
                } else {
                    (
                        false,
                        0.8,
                        format!("{} not present in node_modules", claim.value),
                        None,
                    )
                }
            }
            _ => (false, 0.0, "unsupported claim type".to_string(), None),
        })
    }
}
