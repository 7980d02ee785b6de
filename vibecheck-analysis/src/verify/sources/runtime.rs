//! Runtime evidence source. Probing a live process is outside the static
//! engine's sandbox, so this source is disabled by default and reports
//! itself unavailable when enabled without a runtime harness.

use vibecheck_core::types::claim::{Claim, ClaimType, Evidence, EvidenceSource};

use crate::verify::context::ProjectContext;

use super::{timed_evidence, EvidenceCollector};

pub struct RuntimeCollector;

impl EvidenceCollector for RuntimeCollector {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Runtime
    }

    fn supports(&self, _claim_type: ClaimType) -> bool {
        true
    }

    fn collect(&self, _claim: &Claim, _ctx: &ProjectContext) -> Evidence {
        timed_evidence(self.source(), || {
            (
                false,
                0.0,
                "runtime probing is not available in static analysis".to_string(),
                Some("runtime source disabled".to_string()),
            )
        })
    }
}
