//! `vibecheck fix` — apply autofixable findings as a journaled
//! transaction, with dry-run and rollback.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use vibecheck_analysis::ScanOrchestrator;
use vibecheck_core::errors::FixError;
use vibecheck_core::types::finding::Finding;
use vibecheck_core::types::fingerprint::content_hash;
use vibecheck_core::CancellationToken;
use vibecheck_storage::paths;

use crate::output::{CommandResult, ErrorEntry, VerdictEntry};
use crate::Cli;

/// One reversible edit: a line removed from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixEdit {
    path: String,
    line: u32,
    removed: String,
    pattern_id: String,
}

/// The persisted transaction journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixTransaction {
    id: String,
    created_at_ms: u64,
    edits: Vec<FixEdit>,
    #[serde(default)]
    rolled_back: bool,
}

pub fn run(
    cli: &Cli,
    interactive: bool,
    apply: bool,
    dry_run: bool,
    confidence: Option<f64>,
    rollback: Option<&str>,
) -> i32 {
    let started = Instant::now();
    let mut result = CommandResult::new("fix", &cli.root().to_string_lossy());

    if let Some(txid) = rollback {
        return match roll_back(cli.root(), txid) {
            Ok(count) => {
                result.duration_ms = started.elapsed().as_millis() as u64;
                result.counts = serde_json::json!({ "reverted": count });
                result.verdict = VerdictEntry {
                    status: "rolled_back".to_string(),
                    reasons: vec![],
                };
                if cli.is_json() {
                    result.emit();
                } else {
                    println!("rolled back {count} edit(s) from transaction {txid}");
                }
                0
            }
            Err(e) => {
                result.errors.push(ErrorEntry::from_error(&e));
                if cli.is_json() {
                    result.emit();
                } else {
                    eprintln!("rollback failed: {e}");
                }
                1
            }
        };
    }

    let threshold = confidence.unwrap_or(0.8);
    if !(0.0..=1.0).contains(&threshold) {
        let error = FixError::Validation {
            message: format!("confidence threshold {threshold} is not in [0, 1]"),
        };
        result.errors.push(ErrorEntry::from_error(&error));
        if cli.is_json() {
            result.emit();
        } else {
            eprintln!("{error}");
        }
        return 1;
    }

    // Fresh scan to find the autofix candidates.
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            if cli.is_json() {
                result.errors.push(ErrorEntry::from_error(&e));
                result.emit();
            } else {
                eprintln!("fix failed: {e}");
            }
            return 1;
        }
    };
    let mut orchestrator = match ScanOrchestrator::new(cli.root(), config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            if cli.is_json() {
                result.errors.push(ErrorEntry::from_error(&e));
                result.emit();
            } else {
                eprintln!("fix failed: {e}");
            }
            return 1;
        }
    };
    let cancel = CancellationToken::new();
    let report = match orchestrator.scan(&cancel, None) {
        Ok(report) => report,
        Err(e) => {
            if cli.is_json() {
                result.errors.push(ErrorEntry::from_error(&e));
                result.emit();
            } else {
                eprintln!("fix failed: {e}");
            }
            return 1;
        }
    };

    let candidates: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.autofixable && f.confidence >= threshold)
        .collect();

    if candidates.is_empty() {
        if cli.is_json() {
            result.duration_ms = started.elapsed().as_millis() as u64;
            result.counts = serde_json::json!({ "candidates": 0, "applied": 0 });
            result.emit();
        } else {
            println!("no autofixable findings at confidence >= {threshold}");
        }
        return 0;
    }

    if dry_run || !apply {
        if cli.is_json() {
            result.duration_ms = started.elapsed().as_millis() as u64;
            result.counts =
                serde_json::json!({ "candidates": candidates.len(), "applied": 0 });
            result.data = serde_json::to_value(&candidates).unwrap_or_default();
            result.emit();
        } else {
            for finding in &candidates {
                println!(
                    "would remove {}:{} ({}: {})",
                    finding.path,
                    finding.line,
                    finding.pattern_id,
                    finding.suggested_fix.as_deref().unwrap_or("remove the line"),
                );
            }
            println!(
                "{} candidate edit(s); rerun with --apply to write them",
                candidates.len()
            );
        }
        return 0;
    }

    match apply_edits(cli.root(), &candidates, interactive) {
        Ok(tx) => {
            result.duration_ms = started.elapsed().as_millis() as u64;
            result.counts = serde_json::json!({
                "candidates": candidates.len(),
                "applied": tx.edits.len(),
            });
            result.artifacts = serde_json::json!({ "transaction": tx.id });
            if cli.is_json() {
                result.emit();
            } else {
                println!(
                    "applied {} edit(s); transaction {} (roll back with --rollback {})",
                    tx.edits.len(),
                    tx.id,
                    tx.id
                );
            }
            0
        }
        Err(e) => {
            result.errors.push(ErrorEntry::from_error(&e));
            if cli.is_json() {
                result.emit();
            } else {
                eprintln!("fix failed: {e}");
            }
            1
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

/// Remove each finding's line, recording the journal before any write.
fn apply_edits(
    root: &Path,
    candidates: &[&Finding],
    interactive: bool,
) -> Result<FixTransaction, FixError> {
    let now = vibecheck_core::time::now_ms();
    let mut edits: Vec<FixEdit> = Vec::new();

    // Group by file, apply bottom-up so earlier removals do not shift
    // later line numbers.
    let mut by_file: vibecheck_core::FxHashMap<&str, Vec<&Finding>> =
        vibecheck_core::FxHashMap::default();
    for finding in candidates {
        by_file.entry(finding.path.as_str()).or_default().push(finding);
    }

    for (rel_path, findings) in &mut by_file {
        let abs = root.join(rel_path);
        let content = std::fs::read_to_string(&abs)?;
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        findings.sort_by(|a, b| b.line.cmp(&a.line));
        for finding in findings.iter() {
            let index = finding.line as usize - 1;
            if index >= lines.len() {
                continue;
            }
            if interactive && !confirm(&format!("remove {}:{}?", rel_path, finding.line)) {
                continue;
            }
            let removed = lines.remove(index);
            edits.push(FixEdit {
                path: (*rel_path).to_string(),
                line: finding.line,
                removed,
                pattern_id: finding.pattern_id.clone(),
            });
        }
        let mut body = lines.join("\n");
        body.push('\n');
        std::fs::write(&abs, body)?;
    }

    let id = content_hash(format!("{now}:{}", edits.len()).as_bytes());
    let tx = FixTransaction {
        id: id.clone(),
        created_at_ms: now,
        edits,
        rolled_back: false,
    };
    let journal_path = paths::fixes_dir(root).join(format!("{id}.json"));
    vibecheck_storage::json::write_json_atomic(&journal_path, &tx)?;
    Ok(tx)
}

/// Reinsert every removed line, newest transaction state wins.
fn roll_back(root: &Path, txid: &str) -> Result<usize, FixError> {
    if txid.is_empty() || !txid.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FixError::Validation {
            message: format!("'{txid}' is not a transaction id"),
        });
    }
    let journal_path = paths::fixes_dir(root).join(format!("{txid}.json"));
    let mut tx: FixTransaction = vibecheck_storage::json::read_json(&journal_path)
        .map_err(FixError::Io)?
        .ok_or_else(|| FixError::UnknownTransaction {
            id: txid.to_string(),
        })?;
    if tx.rolled_back {
        return Err(FixError::Validation {
            message: format!("transaction {txid} was already rolled back"),
        });
    }

    // Reinsert per file, top-down so line numbers land where they were.
    let mut by_file: vibecheck_core::FxHashMap<String, Vec<&FixEdit>> =
        vibecheck_core::FxHashMap::default();
    for edit in &tx.edits {
        by_file.entry(edit.path.clone()).or_default().push(edit);
    }
    let mut reverted = 0;
    for (rel_path, mut edits) in by_file {
        let abs = root.join(&rel_path);
        let content = std::fs::read_to_string(&abs)?;
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        edits.sort_by_key(|e| e.line);
        for edit in edits {
            let index = (edit.line as usize - 1).min(lines.len());
            lines.insert(index, edit.removed.clone());
            reverted += 1;
        }
        let mut body = lines.join("\n");
        body.push('\n');
        std::fs::write(&abs, body)?;
    }

    tx.rolled_back = true;
    vibecheck_storage::json::write_json_atomic(&journal_path, &tx)?;
    Ok(reverted)
}
