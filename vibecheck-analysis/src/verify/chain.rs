//! Evidence chains: the ordered, numbered record of how a verdict was
//! reached, in both machine and display form.

use vibecheck_core::types::claim::{
    Claim, ClaimVerdict, Evidence, EvidenceChain, EvidenceStep,
};
use vibecheck_core::FxHashMap;

/// Build the chain for one claim from its collected evidence.
pub fn build_chain(
    claim: &Claim,
    evidences: &[Evidence],
    verdict: ClaimVerdict,
    aggregate_confidence: f64,
) -> EvidenceChain {
    let steps: Vec<EvidenceStep> = evidences
        .iter()
        .enumerate()
        .map(|(index, evidence)| {
            let mut metadata: FxHashMap<String, String> = FxHashMap::default();
            metadata.insert("details".to_string(), evidence.details.clone());
            metadata.insert(
                "duration_ms".to_string(),
                evidence.duration_ms.to_string(),
            );
            if let Some(error) = &evidence.error {
                metadata.insert("error".to_string(), error.clone());
            }
            EvidenceStep {
                step_no: index + 1,
                source: evidence.source,
                supports: evidence.verified,
                confidence: evidence.confidence,
                location: claim.location.as_ref().map(|l| format!("{}:{}", l.file, l.line)),
                metadata,
            }
        })
        .collect();

    let supporting: Vec<String> = evidences
        .iter()
        .filter(|e| e.verified)
        .map(|e| e.source.to_string())
        .collect();
    let refuting: Vec<String> = evidences
        .iter()
        .filter(|e| !e.verified)
        .map(|e| e.source.to_string())
        .collect();
    let reasoning = format!(
        "{} source(s) consulted for {} '{}': {} supporting [{}], {} refuting [{}]; aggregate confidence {:.2} -> {}",
        evidences.len(),
        claim.claim_type,
        claim.value,
        supporting.len(),
        supporting.join(", "),
        refuting.len(),
        refuting.join(", "),
        aggregate_confidence,
        verdict,
    );

    EvidenceChain {
        claim_id: claim.id.clone(),
        steps,
        verdict,
        aggregate_confidence,
        reasoning,
    }
}

/// Human-readable rendering of a chain.
pub fn display_chain(chain: &EvidenceChain) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "claim {} -> {} ({:.0}%)\n",
        chain.claim_id,
        chain.verdict,
        chain.aggregate_confidence * 100.0
    ));
    for step in &chain.steps {
        let mark = if step.supports { "+" } else { "-" };
        let details = step
            .metadata
            .get("details")
            .map(String::as_str)
            .unwrap_or("");
        out.push_str(&format!(
            "  {}. [{}] {} ({:.0}%) {}\n",
            step.step_no,
            mark,
            step.source,
            step.confidence * 100.0,
            details
        ));
    }
    out.push_str(&format!("  {}\n", chain.reasoning));
    out
}
