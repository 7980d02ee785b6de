//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Supports `.vibecheckignore` (gitignore syntax, hierarchical) plus the
//! default ignore set. Output is sorted by relative path for deterministic
//! downstream ordering.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crossbeam_channel as channel;

use vibecheck_core::config::ScanConfig;
use vibecheck_core::errors::ScanError;

use super::types::DiscoveredFile;

/// Directories excluded from every scan.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".nyc_output",
    "target",
    "__pycache__",
    "vendor",
    ".vibecheck",
];

/// Glob patterns excluded from every scan (minified bundles).
pub const DEFAULT_IGNORE_GLOBS: &[&str] = &["*.min.*", "*.bundle.*"];

/// Walk a directory tree in parallel, collecting discovered files.
///
/// Respects `.gitignore`, `.vibecheckignore`, the default ignore set, and
/// the configured include/exclude globs.
pub fn walk_directory(
    root: &Path,
    config: &ScanConfig,
    cancelled: &AtomicBool,
) -> Result<Vec<DiscoveredFile>, ScanError> {
    let root = root
        .canonicalize()
        .map_err(|e| ScanError::Walk {
            message: format!("{}: {e}", root.display()),
        })?;

    let (tx, rx) = channel::unbounded();
    let max_file_size = config.effective_max_file_size();
    let threads = config.effective_threads();

    let mut builder = ignore::WalkBuilder::new(&root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .add_custom_ignore_filename(".vibecheckignore")
        .max_filesize(Some(max_file_size))
        .follow_links(config.follow_symlinks.unwrap_or(false));

    if threads > 0 {
        builder.threads(threads);
    }

    // Overrides use gitignore syntax: positive patterns whitelist, negated
    // patterns blacklist. Include patterns (when present) must match for a
    // file to be scanned; default and user excludes always apply.
    let mut overrides = ignore::overrides::OverrideBuilder::new(&root);
    for pattern in &config.include {
        let _ = overrides.add(pattern);
    }
    for dir in DEFAULT_IGNORE_DIRS {
        let _ = overrides.add(&format!("!{dir}/**"));
        let _ = overrides.add(&format!("!{dir}"));
    }
    for glob in DEFAULT_IGNORE_GLOBS {
        let _ = overrides.add(&format!("!{glob}"));
    }
    for pattern in &config.exclude {
        let _ = overrides.add(&format!("!{pattern}"));
    }
    if let Ok(built) = overrides.build() {
        builder.overrides(built);
    }

    let walker = builder.build_parallel();
    let cancel_flag = Arc::new(AtomicBool::new(cancelled.load(Ordering::Relaxed)));

    walker.run(|| {
        let tx = tx.clone();
        let cancel_flag = Arc::clone(&cancel_flag);
        let root = root.clone();
        Box::new(move |entry| {
            if cancel_flag.load(Ordering::Relaxed) {
                return ignore::WalkState::Quit;
            }

            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };

            match entry.file_type() {
                Some(ft) if ft.is_file() => {}
                _ => return ignore::WalkState::Continue,
            }

            let path = entry.path().to_path_buf();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => return ignore::WalkState::Continue,
            };

            let rel_path = match path.strip_prefix(&root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => return ignore::WalkState::Continue,
            };

            let mtime_ms = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);

            let _ = tx.send(DiscoveredFile {
                path,
                rel_path,
                file_size: metadata.len(),
                mtime_ms,
            });

            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut files: Vec<DiscoveredFile> = rx.into_iter().collect();
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    files.dedup_by(|a, b| a.rel_path == b.rel_path);
    Ok(files)
}
