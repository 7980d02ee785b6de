//! `vibecheck scan` — run the registry over the tree, refresh the
//! truthpack, and report findings.

use std::path::Path;
use std::time::Instant;

use vibecheck_analysis::drift::extract_truthpack;
use vibecheck_analysis::ScanOrchestrator;
use vibecheck_core::errors::error_code::VibeErrorCode;
use vibecheck_core::errors::ScanError;
use vibecheck_core::CancellationToken;
use vibecheck_storage::TruthpackStore;

use crate::output::{CommandResult, ErrorEntry, PhaseEntry, VerdictEntry};
use crate::{Cli, EXIT_INTERRUPTED};

pub fn run(cli: &Cli, output: Option<&Path>, timeout_ms: Option<u64>, forge: bool) -> i32 {
    let started = Instant::now();
    let mut result = CommandResult::new("scan", &cli.root().to_string_lossy());

    let mut config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => return fail(cli, result, &e),
    };
    if let Some(ms) = timeout_ms {
        config.scan.timeout_ms = Some(ms);
    }
    if forge {
        config.scan.force_full = Some(true);
    }
    result.inputs = serde_json::json!({
        "root": cli.root().to_string_lossy(),
        "timeoutMs": config.scan.timeout_ms,
        "forceFull": config.scan.effective_force_full(),
        // Recognized for upstream integrations; the engine never calls it.
        "apiUrl": std::env::var("VIBECHECK_API_URL").ok(),
    });

    let mut orchestrator = match ScanOrchestrator::new(cli.root(), config.clone()) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return fail(cli, result, &e),
    };

    let cancel = CancellationToken::new();
    let report = match orchestrator.scan(&cancel, None) {
        Ok(report) => report,
        Err(e) => return fail(cli, result, &e),
    };

    // Refresh the truthpack from live extraction.
    let truthpack_written = match extract_truthpack(
        orchestrator.root(),
        config.drift.effective_max_file_bytes(),
    ) {
        Ok(pack) => match TruthpackStore::for_project(orchestrator.root()).save(&pack) {
            Ok(()) => true,
            Err(e) => {
                result.warnings.push(format!("truthpack write failed: {e}"));
                false
            }
        },
        Err(e) => {
            result.warnings.push(format!("truthpack extraction failed: {e}"));
            false
        }
    };

    result.duration_ms = started.elapsed().as_millis() as u64;
    result.phases = vec![
        PhaseEntry {
            name: "walk".into(),
            duration_ms: report.phases.walk_ms,
        },
        PhaseEntry {
            name: "diff".into(),
            duration_ms: report.phases.diff_ms,
        },
        PhaseEntry {
            name: "scan".into(),
            duration_ms: report.phases.scan_ms,
        },
        PhaseEntry {
            name: "persist".into(),
            duration_ms: report.phases.persist_ms,
        },
    ];
    result.counts = serde_json::json!({
        "files": {
            "total": report.summary.files_total,
            "scanned": report.summary.files_scanned,
            "fromCache": report.summary.files_from_cache,
            "errors": report.summary.errors,
        },
        "changes": report.changes,
        "findings": report.summary.findings_total,
    });
    result.artifacts = serde_json::json!({
        "truthpack": truthpack_written,
        "report": output.map(|p| p.to_string_lossy().to_string()),
    });
    result.verdict = VerdictEntry {
        status: if report.summary.cancelled {
            "cancelled".to_string()
        } else {
            "ok".to_string()
        },
        reasons: Vec::new(),
    };
    result.data = serde_json::to_value(&report).unwrap_or_default();

    if let Some(path) = output {
        if let Err(e) = std::fs::write(path, serde_json::to_vec_pretty(&report).unwrap_or_default())
        {
            result.warnings.push(format!("report write failed: {e}"));
        }
    }

    if cli.is_json() {
        result.emit();
    } else {
        super::print_findings(&report.findings);
        if !cli.is_quiet() {
            let counts = super::severity_counts(&report.findings);
            let summary_line: Vec<String> = counts
                .iter()
                .filter(|(_, n)| *n > 0)
                .map(|(sev, n)| format!("{n} {sev}"))
                .collect();
            println!(
                "\n{} findings ({}) across {} files ({} scanned, {} from cache) in {} ms",
                report.summary.findings_total,
                if summary_line.is_empty() {
                    "clean".to_string()
                } else {
                    summary_line.join(", ")
                },
                report.summary.files_total,
                report.summary.files_scanned,
                report.summary.files_from_cache,
                report.summary.duration_ms,
            );
        }
    }

    if report.summary.cancelled {
        EXIT_INTERRUPTED
    } else {
        0
    }
}

fn fail(cli: &Cli, mut result: CommandResult, error: &ScanError) -> i32 {
    result.errors.push(ErrorEntry::from_error(error));
    result.verdict = VerdictEntry {
        status: "error".to_string(),
        reasons: vec![error.to_string()],
    };
    if cli.is_json() {
        result.emit();
    } else {
        eprintln!("scan failed: {error}");
        for suggestion in error.suggestions() {
            eprintln!("  hint: {suggestion}");
        }
    }
    if matches!(error, ScanError::Interrupted) {
        EXIT_INTERRUPTED
    } else {
        1
    }
}
