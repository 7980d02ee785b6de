//! `vibecheck ship` — scan, verify import claims, score, and emit the
//! SHIP/WARN/BLOCK verdict. Exit 0 for SHIP and WARN (with a message),
//! 1 for BLOCK.

use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;

use vibecheck_analysis::drift::{collect_sources, DriftDetector};
use vibecheck_analysis::score::ShipScorer;
use vibecheck_analysis::verify::ClaimVerifier;
use vibecheck_analysis::ScanOrchestrator;
use vibecheck_core::types::claim::{Claim, ClaimType, ClaimVerdict};
use vibecheck_core::types::score::ShipVerdict;
use vibecheck_core::CancellationToken;
use vibecheck_core::FxHashSet;
use vibecheck_storage::TruthpackStore;

use crate::output::{CommandResult, VerdictEntry};
use crate::{Cli, EXIT_INTERRUPTED};

fn bare_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?:from\s+|require\s*\(\s*)['"]([A-Za-z@][^'"]*)['"]"#).unwrap()
    })
}

const MAX_IMPORT_CLAIMS: usize = 100;

pub fn run(cli: &Cli) -> i32 {
    let started = Instant::now();
    let mut result = CommandResult::new("ship", &cli.root().to_string_lossy());

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => return fail(cli, result, &e.to_string()),
    };

    // Phase 1: scan.
    let mut orchestrator = match ScanOrchestrator::new(cli.root(), config.clone()) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return fail(cli, result, &e.to_string()),
    };
    let cancel = CancellationToken::new();
    let scan_report = match orchestrator.scan(&cancel, None) {
        Ok(report) => report,
        Err(e) => return fail(cli, result, &e.to_string()),
    };
    if scan_report.summary.cancelled {
        return EXIT_INTERRUPTED;
    }

    // Phase 2: verify every bare package import as a claim.
    let claims = match collect_sources(cli.root(), config.drift.effective_max_file_bytes()) {
        Ok(sources) => {
            let mut seen: FxHashSet<String> = FxHashSet::default();
            let mut claims = Vec::new();
            for source in &sources {
                for captures in bare_import().captures_iter(&source.content) {
                    let spec = captures[1].to_string();
                    if seen.insert(spec.clone()) && claims.len() < MAX_IMPORT_CLAIMS {
                        claims.push(Claim {
                            id: format!("import-{}", claims.len()),
                            claim_type: ClaimType::Import,
                            value: spec,
                            location: Some(vibecheck_core::types::claim::ClaimLocation {
                                file: source.rel_path.clone(),
                                line: 0,
                            }),
                            context: None,
                        });
                    }
                }
            }
            claims
        }
        Err(e) => {
            result.warnings.push(format!("claim harvest failed: {e}"));
            Vec::new()
        }
    };
    let verifier = ClaimVerifier::new(orchestrator.root(), config.verifier.clone());
    let batch = verifier.verify_batch(claims);
    let dismissed: Vec<String> = batch
        .results
        .iter()
        .filter(|r| matches!(r.verdict, ClaimVerdict::Dismissed | ClaimVerdict::Unlikely))
        .map(|r| r.claim.value.clone())
        .collect();

    // Phase 3: drift + score over the recorded truthpack.
    let truthpack = TruthpackStore::for_project(orchestrator.root()).load();
    let drift = DriftDetector::new(config.drift.clone())
        .detect(orchestrator.root(), &truthpack, &cancel)
        .ok();
    let scorer = match ShipScorer::new(config.score) {
        Ok(scorer) => scorer,
        Err(e) => return fail(cli, result, &e.to_string()),
    };
    let score = scorer.score(&truthpack);

    let mut reasons: Vec<String> = score.diagnostics.clone();
    let critical_findings = scan_report
        .findings
        .iter()
        .filter(|f| f.severity == vibecheck_core::types::finding::Severity::Critical)
        .count();
    if critical_findings > 0 {
        reasons.push(format!("{critical_findings} critical finding(s) in the tree"));
    }
    if !dismissed.is_empty() {
        reasons.push(format!(
            "{} import claim(s) could not be verified: {}",
            dismissed.len(),
            dismissed.join(", ")
        ));
    }
    if let Some(drift) = &drift {
        if drift.summary.critical_count > 0 {
            reasons.push(format!(
                "{} critical drift item(s) against the truthpack",
                drift.summary.critical_count
            ));
        }
    }

    result.duration_ms = started.elapsed().as_millis() as u64;
    result.counts = serde_json::json!({
        "findings": scan_report.summary.findings_total,
        "criticalFindings": critical_findings,
        "claims": batch.summary,
        "drift": drift.as_ref().map(|d| &d.summary),
    });
    result.scores = serde_json::to_value(&score).unwrap_or_default();
    result.verdict = VerdictEntry {
        status: score.verdict.to_string(),
        reasons: reasons.clone(),
    };
    result.data = serde_json::json!({
        "scan": scan_report.summary,
        "drift": drift,
    });

    if cli.is_json() {
        result.emit();
    } else {
        println!(
            "ship score: {:.0}/100 -> {}",
            score.overall, score.verdict
        );
        for reason in &reasons {
            println!("  - {reason}");
        }
        if score.verdict == ShipVerdict::Warn {
            println!("proceeding with warnings; review before release");
        }
    }

    match score.verdict {
        ShipVerdict::Ship | ShipVerdict::Warn => 0,
        ShipVerdict::Block => 1,
    }
}

fn fail(cli: &Cli, mut result: CommandResult, message: &str) -> i32 {
    result.verdict = VerdictEntry {
        status: "error".to_string(),
        reasons: vec![message.to_string()],
    };
    if cli.is_json() {
        result.emit();
    } else {
        eprintln!("ship failed: {message}");
    }
    1
}
