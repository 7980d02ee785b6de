//! Weighted consensus over collected evidence.
//!
//! Aggregate confidence is monotone by construction: verified evidence
//! only accumulates support (noisy-or over `reliability · confidence`),
//! unverified evidence only damps it. Consensus additionally requires a
//! minimum count of verified sources.

use vibecheck_core::types::claim::{ClaimVerdict, Evidence};

/// Aggregate confidence in [0, 1].
pub fn aggregate_confidence(evidences: &[Evidence]) -> f64 {
    let mut missing_support = 1.0_f64;
    let mut damping = 1.0_f64;
    for evidence in evidences {
        let weight = evidence.source.reliability() * evidence.confidence.clamp(0.0, 1.0);
        if evidence.verified {
            missing_support *= 1.0 - weight;
        } else {
            damping *= 1.0 - weight / 2.0;
        }
    }
    ((1.0 - missing_support) * damping).clamp(0.0, 1.0)
}

/// Consensus: enough verified sources AND enough weighted confidence.
pub fn has_consensus(
    evidences: &[Evidence],
    required_sources: usize,
    consensus_threshold: f64,
) -> bool {
    let verified_count = evidences.iter().filter(|e| e.verified).count();
    verified_count >= required_sources
        && aggregate_confidence(evidences) >= consensus_threshold
}

/// Verdict from aggregate confidence.
pub fn verdict(evidences: &[Evidence]) -> ClaimVerdict {
    ClaimVerdict::from_confidence(aggregate_confidence(evidences))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibecheck_core::types::claim::EvidenceSource;

    fn evidence(source: EvidenceSource, verified: bool, confidence: f64) -> Evidence {
        Evidence {
            source,
            verified,
            confidence,
            details: String::new(),
            duration_ms: 0,
            error: None,
        }
    }

    #[test]
    fn verified_evidence_never_decreases_aggregate() {
        let mut evidences = vec![evidence(EvidenceSource::PackageJson, true, 0.95)];
        let before = aggregate_confidence(&evidences);
        evidences.push(evidence(EvidenceSource::Git, true, 0.1));
        let after = aggregate_confidence(&evidences);
        assert!(after >= before, "{after} < {before}");
    }

    #[test]
    fn unverified_evidence_never_increases_aggregate() {
        let mut evidences = vec![
            evidence(EvidenceSource::PackageJson, true, 0.95),
            evidence(EvidenceSource::Ast, true, 0.85),
        ];
        let before = aggregate_confidence(&evidences);
        evidences.push(evidence(EvidenceSource::Filesystem, false, 0.8));
        let after = aggregate_confidence(&evidences);
        assert!(after <= before, "{after} > {before}");
    }

    #[test]
    fn all_negative_evidence_dismisses() {
        let evidences = vec![
            evidence(EvidenceSource::PackageJson, false, 0.9),
            evidence(EvidenceSource::Filesystem, false, 0.8),
            evidence(EvidenceSource::Ast, false, 0.8),
        ];
        assert_eq!(aggregate_confidence(&evidences), 0.0);
        assert_eq!(verdict(&evidences), ClaimVerdict::Dismissed);
        assert!(!has_consensus(&evidences, 2, 0.7));
    }

    #[test]
    fn strong_agreement_confirms() {
        let evidences = vec![
            evidence(EvidenceSource::PackageJson, true, 0.95),
            evidence(EvidenceSource::Filesystem, true, 0.9),
            evidence(EvidenceSource::Ast, true, 0.85),
        ];
        assert!(aggregate_confidence(&evidences) >= 0.9);
        assert_eq!(verdict(&evidences), ClaimVerdict::Confirmed);
        assert!(has_consensus(&evidences, 2, 0.7));
    }
}
