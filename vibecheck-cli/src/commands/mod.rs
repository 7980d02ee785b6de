//! The four verbs.

pub mod fix;
pub mod scan;
pub mod ship;
pub mod trace;

use vibecheck_core::types::finding::{Finding, Severity};

/// Plain-text findings rendering shared by `scan` and `ship`.
pub fn print_findings(findings: &[Finding]) {
    for finding in findings {
        println!(
            "{:>8}  {}:{}:{}  [{}] {}  {}",
            finding.severity.to_string(),
            finding.path,
            finding.line,
            finding.column,
            finding.category,
            finding.pattern_id,
            finding.redacted_evidence,
        );
    }
}

/// Counts per severity, most severe first.
pub fn severity_counts(findings: &[Finding]) -> [(Severity, usize); 4] {
    let mut counts = [
        (Severity::Critical, 0),
        (Severity::High, 0),
        (Severity::Medium, 0),
        (Severity::Low, 0),
    ];
    for finding in findings {
        for entry in &mut counts {
            if entry.0 == finding.severity {
                entry.1 += 1;
            }
        }
    }
    counts
}
