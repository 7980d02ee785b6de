//! Property tests: invariants that must hold for any input, not just the
//! hand-crafted cases.

use proptest::prelude::*;

use vibecheck_analysis::filter::{self, context::adjust_severity, entropy::shannon_entropy};
use vibecheck_analysis::verify::consensus::aggregate_confidence;
use vibecheck_core::types::claim::{Evidence, EvidenceSource};
use vibecheck_core::types::context::FileContext;
use vibecheck_core::types::finding::{Finding, Severity};

proptest! {
    /// Redaction safety: values longer than 8 chars never appear verbatim
    /// in their redaction, and the output is one of the two legal shapes.
    #[test]
    fn redaction_never_leaks(value in "[A-Za-z0-9_]{1,64}") {
        let redacted = filter::redact(&value);
        if value.chars().count() > 8 {
            prop_assert!(!redacted.contains(&value));
            prop_assert!(redacted.contains("..."));
        } else {
            prop_assert!(redacted.chars().all(|c| c == '*'));
            prop_assert_eq!(redacted.chars().count(), value.chars().count());
        }
    }

    /// Entropy is bounded by [0, 8] bits for any byte string.
    #[test]
    fn entropy_is_bounded(value in ".{0,128}") {
        let entropy = shannon_entropy(&value);
        prop_assert!(entropy >= 0.0);
        prop_assert!(entropy <= 8.0);
    }

    /// Adding verified evidence never decreases the aggregate; adding
    /// unverified evidence never increases it.
    #[test]
    fn consensus_is_monotone(
        base_confidences in prop::collection::vec(0.0f64..=1.0, 0..6),
        new_confidence in 0.0f64..=1.0,
    ) {
        let sources = [
            EvidenceSource::PackageJson,
            EvidenceSource::Ast,
            EvidenceSource::Filesystem,
            EvidenceSource::Git,
            EvidenceSource::Truthpack,
            EvidenceSource::TypescriptCompiler,
        ];
        let mut evidences: Vec<Evidence> = base_confidences
            .iter()
            .enumerate()
            .map(|(i, &confidence)| Evidence {
                source: sources[i % sources.len()],
                verified: i % 2 == 0,
                confidence,
                details: String::new(),
                duration_ms: 0,
                error: None,
            })
            .collect();
        let before = aggregate_confidence(&evidences);

        evidences.push(Evidence {
            source: EvidenceSource::Runtime,
            verified: true,
            confidence: new_confidence,
            details: String::new(),
            duration_ms: 0,
            error: None,
        });
        let with_verified = aggregate_confidence(&evidences);
        prop_assert!(with_verified >= before - 1e-12);

        evidences.last_mut().unwrap().verified = false;
        let with_unverified = aggregate_confidence(&evidences);
        prop_assert!(with_unverified <= before + 1e-12);
    }

    /// Finding ids are a pure function of the identity fields.
    #[test]
    fn finding_ids_are_stable(
        pattern in "[a-z\\-]{3,20}",
        path in "[a-z/\\.]{3,40}",
        line in 1u32..100_000,
        redacted in "[A-Za-z0-9\\*\\.]{0,20}",
    ) {
        let a = Finding::stable_id(&pattern, &path, line, &redacted);
        let b = Finding::stable_id(&pattern, &path, line, &redacted);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), 16);
        let c = Finding::stable_id(&pattern, &path, line + 1, &redacted);
        prop_assert_ne!(a, c);
    }
}

/// The full severity adjustment table from the filter rules.
#[test]
fn severity_adjustment_table() {
    use FileContext::*;
    use Severity::*;
    let low_entropy = 2.0;

    let cases: &[(FileContext, Severity, f64, Severity)] = &[
        // example / test: one step down unless entropy >= 5.0
        (Example, Critical, low_entropy, High),
        (Example, High, low_entropy, Medium),
        (Example, Medium, low_entropy, Low),
        (Example, Low, low_entropy, Low),
        (Example, Critical, 5.0, Critical),
        (Test, Critical, low_entropy, High),
        (Test, High, 5.1, High),
        (Test, Low, low_entropy, Low),
        // documentation: two steps down
        (Documentation, Critical, low_entropy, Medium),
        (Documentation, High, low_entropy, Low),
        (Documentation, Medium, low_entropy, Low),
        (Documentation, Low, low_entropy, Low),
        (Documentation, Critical, 6.0, Medium),
        // production: medium upgrades to high at entropy >= 4.5
        (Production, Medium, 4.5, High),
        (Production, Medium, 4.4, Medium),
        (Production, High, 6.0, High),
        (Production, Low, 6.0, Low),
        (Production, Critical, low_entropy, Critical),
        // neutral contexts never adjust
        (Development, High, 6.0, High),
        (Configuration, Critical, low_entropy, Critical),
        (Unknown, Medium, 6.0, Medium),
    ];
    for &(context, severity, entropy, expected) in cases {
        assert_eq!(
            adjust_severity(context, severity, entropy),
            expected,
            "context {context:?}, severity {severity:?}, entropy {entropy}"
        );
    }
}
