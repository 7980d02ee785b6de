//! Streaming dispatcher invariants: one start, one complete, findings
//! before their file_complete, recoverable errors mid-stream.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use vibecheck_analysis::stream::{scan_stream_parallel, scan_stream_sequential, ScanUnit};
use vibecheck_core::events::ScanEvent;
use vibecheck_core::types::finding::{Finding, FindingCategory, Severity};
use vibecheck_core::{CancellationToken, FxHashSet};

fn units(n: usize) -> Vec<ScanUnit> {
    (0..n)
        .map(|i| ScanUnit {
            rel_path: format!("src/file{i}.ts"),
            path: PathBuf::from(format!("/tmp/file{i}.ts")),
        })
        .collect()
}

fn fake_finding(path: &str) -> Finding {
    Finding {
        id: "f".repeat(16),
        pattern_id: "console-log".into(),
        path: path.into(),
        line: 1,
        column: 1,
        severity: Severity::Low,
        category: FindingCategory::Debug,
        confidence: 0.8,
        redacted_evidence: "console.log(".into(),
        suggested_fix: None,
        autofixable: true,
    }
}

/// Processor: every third file errors, the rest produce one finding.
fn processor(unit: &ScanUnit) -> Result<Vec<Finding>, String> {
    let index: usize = unit
        .rel_path
        .trim_start_matches("src/file")
        .trim_end_matches(".ts")
        .parse()
        .unwrap();
    if index % 3 == 2 {
        Err(format!("boom in {}", unit.rel_path))
    } else {
        Ok(vec![fake_finding(&unit.rel_path)])
    }
}

fn assert_stream_invariants(events: &[ScanEvent]) {
    assert!(matches!(events.first(), Some(ScanEvent::Started { .. })));
    assert!(matches!(events.last(), Some(ScanEvent::Complete { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Started { .. }))
            .count(),
        1
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Complete { .. }))
            .count(),
        1
    );

    // Every finding precedes its file's unique file_complete.
    let mut completed: FxHashSet<&str> = FxHashSet::default();
    for event in events {
        match event {
            ScanEvent::Finding(finding) => {
                assert!(
                    !completed.contains(finding.path.as_str()),
                    "finding for {} after its file_complete",
                    finding.path
                );
            }
            ScanEvent::FileComplete { path, .. } => {
                assert!(completed.insert(path.as_str()), "duplicate file_complete");
            }
            ScanEvent::Progress {
                percentage,
                processed,
                total,
                ..
            } => {
                assert!(*percentage >= 0.0 && *percentage <= 100.0);
                assert!(processed <= total);
            }
            _ => {}
        }
    }
}

#[test]
fn sequential_stream_upholds_invariants_and_order() {
    let cancel = CancellationToken::new();
    let rx = scan_stream_sequential(units(9), processor, Duration::from_millis(10), cancel);
    let events: Vec<ScanEvent> = rx.iter().collect();
    assert_stream_invariants(&events);

    // Sequential shape preserves input order of file completions.
    let order: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::FileComplete { path, .. } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    let expected: Vec<String> = (0..9)
        .filter(|i| i % 3 != 2)
        .map(|i| format!("src/file{i}.ts"))
        .collect();
    assert_eq!(order, expected.iter().map(String::as_str).collect::<Vec<_>>());

    // Errors are recoverable and counted.
    let errors: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::Error { recoverable: true, .. }))
        .collect();
    assert_eq!(errors.len(), 3);
    if let Some(ScanEvent::Complete { summary }) = events.last() {
        assert_eq!(summary.errors, 3);
        assert_eq!(summary.files_scanned, 9);
        assert_eq!(summary.findings_total, 6);
        assert!(!summary.cancelled);
    } else {
        panic!("missing complete event");
    }
}

#[test]
fn parallel_stream_is_bracketed_and_complete() {
    let cancel = CancellationToken::new();
    let rx = scan_stream_parallel(
        units(20),
        Arc::new(processor),
        4,
        Duration::from_millis(10),
        cancel,
    );
    let events: Vec<ScanEvent> = rx.iter().collect();
    assert_stream_invariants(&events);

    let completions = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::FileComplete { .. }))
        .count();
    let errors = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::Error { .. }))
        .count();
    // 20 inputs: every file either completes or errors.
    assert_eq!(completions + errors, 20);
}

#[test]
fn cancellation_still_brackets_the_stream() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let rx = scan_stream_sequential(units(5), processor, Duration::from_millis(10), cancel);
    let events: Vec<ScanEvent> = rx.iter().collect();
    assert!(matches!(events.first(), Some(ScanEvent::Started { .. })));
    match events.last() {
        Some(ScanEvent::Complete { summary }) => assert!(summary.cancelled),
        other => panic!("expected complete, got {other:?}"),
    }
}
