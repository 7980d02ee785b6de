//! `vibecheck trace` — drift analysis against the recorded truthpack.

use std::time::Instant;

use vibecheck_analysis::drift::DriftDetector;
use vibecheck_core::CancellationToken;
use vibecheck_storage::TruthpackStore;

use crate::output::{CommandResult, ErrorEntry, VerdictEntry};
use crate::Cli;

pub fn run(cli: &Cli) -> i32 {
    let started = Instant::now();
    let mut result = CommandResult::new("trace", &cli.root().to_string_lossy());

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            result.errors.push(ErrorEntry::from_error(&e));
            if cli.is_json() {
                result.emit();
            } else {
                eprintln!("trace failed: {e}");
            }
            return 1;
        }
    };

    let truthpack = TruthpackStore::for_project(cli.root()).load();
    if truthpack.is_empty() {
        result
            .warnings
            .push("no truthpack recorded; run `vibecheck scan` first".to_string());
    }

    let detector = DriftDetector::new(config.drift.clone());
    let cancel = CancellationToken::new();
    let report = match detector.detect(cli.root(), &truthpack, &cancel) {
        Ok(report) => report,
        Err(e) => {
            result.errors.push(ErrorEntry::from_error(&e));
            if cli.is_json() {
                result.emit();
            } else {
                eprintln!("trace failed: {e}");
            }
            return 1;
        }
    };

    result.duration_ms = started.elapsed().as_millis() as u64;
    result.counts = serde_json::to_value(&report.summary).unwrap_or_default();
    result.verdict = VerdictEntry {
        status: if report.summary.critical_count > 0 {
            "drift".to_string()
        } else {
            "ok".to_string()
        },
        reasons: report.recommendations.clone(),
    };
    result.data = serde_json::to_value(&report).unwrap_or_default();

    if cli.is_json() {
        result.emit();
    } else {
        for item in &report.items {
            println!(
                "{:>8}  {:?} {:?}  {}",
                item.severity.to_string(),
                item.change_type,
                item.category,
                item.identifier,
            );
        }
        if !cli.is_quiet() {
            println!(
                "\n{} drift item(s): {} added, {} removed, {} modified ({} critical, {} high) in {} ms",
                report.summary.total_drift,
                report.summary.added,
                report.summary.removed,
                report.summary.modified,
                report.summary.critical_count,
                report.summary.high_count,
                report.duration_ms,
            );
            for recommendation in &report.recommendations {
                println!("  -> {recommendation}");
            }
        }
    }
    0
}
