//! Git evidence: is the referenced path tracked in HEAD?

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::incremental::deps;
use crate::verify::context::ProjectContext;

use super::{timed_evidence, EvidenceCollector};

pub struct GitCollector;

impl GitCollector {
    fn tracked_in_head(ctx: &ProjectContext, rel_path: &str) -> Option<bool> {
        let repo = git2::Repository::discover(&ctx.root).ok()?;
        let head = repo.head().ok()?.peel_to_tree().ok()?;
        Some(head.get_path(std::path::Path::new(rel_path)).is_ok())
    }
}

impl EvidenceCollector for GitCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Git
    }

    fn supports(&self, claim_type: ClaimType) -> bool {
        matches!(claim_type, ClaimType::FileReference | ClaimType::Import)
    }

    fn collect(&self, claim: &Claim, ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || {
            let rel_path = match claim.claim_type {
                ClaimType::FileReference => Some(claim.value.trim_start_matches("./").to_string()),
                ClaimType::Import if claim.value.starts_with('.') => {
                    let from = claim
                        .location
                        .as_ref()
                        .map(|l| l.file.as_str())
                        .unwrap_or("");
                    deps::resolve_import(from, &claim.value, ctx.files())
                }
                _ => None,
            };
            let Some(rel_path) = rel_path else {
                return (
                    false,
                    0.0,
                    "not a repository-relative reference".to_string(),
                    None,
                );
            };
            match Self::tracked_in_head(ctx, &rel_path) {
                Some(true) => (true, 0.85, format!("{rel_path} tracked in HEAD"), None),
                Some(false) => (
                    false,
                    0.6,
                    format!("{rel_path} not tracked in HEAD"),
                    None,
                ),
                None => (
                    false,
                    0.0,
                    "no git repository".to_string(),
                    Some("git unavailable".to_string()),
                ),
            }
        })
    }
}
