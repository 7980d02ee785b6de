//! Streaming dispatcher: ordered event delivery with throttled progress.
//!
//! Invariants: exactly one `Started` opens the stream and exactly one
//! `Complete` closes it; every `Finding` for a file precedes that file's
//! `FileComplete`; `Progress` is emitted at most once per interval; a
//! per-file failure becomes a recoverable `Error` event and scanning
//! continues. Results buffer in the channel, so slow consumers never
//! wedge workers.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};

use vibecheck_core::events::{ScanEvent, ScanSummary};
use vibecheck_core::types::finding::Finding;
use vibecheck_core::CancellationToken;

/// Window of per-file durations used for the ETA estimate.
const ETA_WINDOW: usize = 20;

/// One unit of streamable work.
#[derive(Debug, Clone)]
pub struct ScanUnit {
    pub rel_path: String,
    pub path: PathBuf,
}

/// Throttled progress state with a trailing-window ETA.
pub struct ProgressTracker {
    interval: Duration,
    started: Instant,
    last_emit: Option<Instant>,
    durations: VecDeque<Duration>,
    processed: usize,
    total: usize,
}

impl ProgressTracker {
    pub fn new(total: usize, interval: Duration) -> Self {
        Self {
            interval,
            started: Instant::now(),
            last_emit: None,
            durations: VecDeque::with_capacity(ETA_WINDOW),
            processed: 0,
            total,
        }
    }

    /// Record one finished file.
    pub fn record_file(&mut self, duration: Duration) {
        self.processed += 1;
        if self.durations.len() == ETA_WINDOW {
            self.durations.pop_front();
        }
        self.durations.push_back(duration);
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// ETA from the mean of the trailing window.
    fn estimated_remaining_ms(&self) -> u64 {
        if self.durations.is_empty() || self.processed >= self.total {
            return 0;
        }
        let total_ms: u128 = self.durations.iter().map(|d| d.as_millis()).sum();
        let mean_ms = total_ms as f64 / self.durations.len() as f64;
        (mean_ms * (self.total - self.processed) as f64) as u64
    }

    /// Build a progress event unconditionally.
    pub fn progress_event(&self, current_file: &str) -> ScanEvent {
        let percentage = if self.total > 0 {
            self.processed as f64 / self.total as f64 * 100.0
        } else {
            100.0
        };
        ScanEvent::Progress {
            processed: self.processed,
            total: self.total,
            percentage,
            current_file: current_file.to_string(),
            elapsed_ms: self.elapsed_ms(),
            estimated_remaining_ms: self.estimated_remaining_ms(),
        }
    }

    /// Build a progress event only when the interval has elapsed since the
    /// last one.
    pub fn maybe_progress_event(&mut self, current_file: &str) -> Option<ScanEvent> {
        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_emit = Some(now);
        Some(self.progress_event(current_file))
    }
}

/// Event emitter enforcing the bracket invariants.
pub struct EventDispatcher {
    tx: Sender<ScanEvent>,
    tracker: ProgressTracker,
    started: bool,
    completed: bool,
}

impl EventDispatcher {
    pub fn new(tx: Sender<ScanEvent>, total: usize, interval: Duration) -> Self {
        Self {
            tx,
            tracker: ProgressTracker::new(total, interval),
            started: false,
            completed: false,
        }
    }

    pub fn start(&mut self, root: &str) {
        debug_assert!(!self.started, "start emitted twice");
        self.started = true;
        let _ = self.tx.send(ScanEvent::Started {
            root: root.to_string(),
            total_files: self.tracker.total,
        });
    }

    pub fn finding(&self, finding: &Finding) {
        debug_assert!(self.started && !self.completed);
        let _ = self.tx.send(ScanEvent::Finding(finding.clone()));
    }

    /// Close out one file: emits `FileComplete`, records the duration, and
    /// maybe emits throttled progress.
    pub fn file_complete(
        &mut self,
        path: &str,
        findings: usize,
        from_cache: bool,
        duration: Duration,
    ) {
        debug_assert!(self.started && !self.completed);
        let _ = self.tx.send(ScanEvent::FileComplete {
            path: path.to_string(),
            findings,
            from_cache,
        });
        self.tracker.record_file(duration);
        if let Some(event) = self.tracker.maybe_progress_event(path) {
            let _ = self.tx.send(event);
        }
    }

    /// Recoverable per-file failure; scanning continues.
    pub fn file_error(&mut self, path: &str, message: &str) {
        debug_assert!(self.started && !self.completed);
        let _ = self.tx.send(ScanEvent::Error {
            path: path.to_string(),
            message: message.to_string(),
            recoverable: true,
        });
        self.tracker.record_file(Duration::ZERO);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.tracker.elapsed_ms()
    }

    pub fn complete(mut self, summary: ScanSummary) {
        debug_assert!(self.started && !self.completed, "complete without start");
        self.completed = true;
        let _ = self.tx.send(ScanEvent::Complete { summary });
    }
}

/// Sequential stream: preserves input order.
pub fn scan_stream_sequential<F>(
    units: Vec<ScanUnit>,
    processor: F,
    progress_interval: Duration,
    cancel: CancellationToken,
) -> Receiver<ScanEvent>
where
    F: Fn(&ScanUnit) -> Result<Vec<Finding>, String> + Send + 'static,
{
    let (tx, rx) = unbounded();
    std::thread::spawn(move || {
        let total = units.len();
        let mut dispatcher = EventDispatcher::new(tx, total, progress_interval);
        dispatcher.start("");
        let mut findings_total = 0;
        let mut errors = 0;
        let mut processed = 0;
        let mut cancelled = false;

        for unit in &units {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let file_start = Instant::now();
            match processor(unit) {
                Ok(findings) => {
                    for finding in &findings {
                        dispatcher.finding(finding);
                    }
                    findings_total += findings.len();
                    dispatcher.file_complete(
                        &unit.rel_path,
                        findings.len(),
                        false,
                        file_start.elapsed(),
                    );
                }
                Err(message) => {
                    errors += 1;
                    dispatcher.file_error(&unit.rel_path, &message);
                }
            }
            processed += 1;
        }

        let duration_ms = dispatcher.elapsed_ms();
        dispatcher.complete(ScanSummary {
            files_total: total,
            files_scanned: processed,
            files_from_cache: 0,
            findings_total,
            errors,
            duration_ms,
            cancelled,
        });
    });
    rx
}

/// Parallel stream: unordered file completion, still bracketed by exactly
/// one `Started` and one `Complete`. Concurrency bounds the in-flight
/// work; results are tagged by unit, never matched by future identity.
pub fn scan_stream_parallel<F>(
    units: Vec<ScanUnit>,
    processor: Arc<F>,
    concurrency: usize,
    progress_interval: Duration,
    cancel: CancellationToken,
) -> Receiver<ScanEvent>
where
    F: Fn(&ScanUnit) -> Result<Vec<Finding>, String> + Send + Sync + 'static,
{
    let (tx, rx) = unbounded();
    std::thread::spawn(move || {
        let total = units.len();
        let concurrency = concurrency.max(1);
        let mut dispatcher = EventDispatcher::new(tx, total, progress_interval);
        dispatcher.start("");

        let (work_tx, work_rx) = unbounded::<ScanUnit>();
        let (done_tx, done_rx) =
            unbounded::<(ScanUnit, Result<Vec<Finding>, String>, Duration)>();
        for unit in units {
            let _ = work_tx.send(unit);
        }
        drop(work_tx);

        let mut handles = Vec::with_capacity(concurrency);
        for _ in 0..concurrency {
            let work_rx = work_rx.clone();
            let done_tx = done_tx.clone();
            let processor = Arc::clone(&processor);
            let cancel = cancel.clone();
            handles.push(std::thread::spawn(move || {
                while let Ok(unit) = work_rx.recv() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let file_start = Instant::now();
                    let result = processor(&unit);
                    let _ = done_tx.send((unit, result, file_start.elapsed()));
                }
            }));
        }
        drop(done_tx);

        let mut findings_total = 0;
        let mut errors = 0;
        let mut processed = 0;
        while let Ok((unit, result, duration)) = done_rx.recv() {
            match result {
                Ok(findings) => {
                    for finding in &findings {
                        dispatcher.finding(finding);
                    }
                    findings_total += findings.len();
                    dispatcher.file_complete(&unit.rel_path, findings.len(), false, duration);
                }
                Err(message) => {
                    errors += 1;
                    dispatcher.file_error(&unit.rel_path, &message);
                }
            }
            processed += 1;
        }
        for handle in handles {
            let _ = handle.join();
        }

        let duration_ms = dispatcher.elapsed_ms();
        dispatcher.complete(ScanSummary {
            files_total: total,
            files_scanned: processed,
            files_from_cache: 0,
            findings_total,
            errors,
            duration_ms,
            cancelled: cancel.is_cancelled(),
        });
    });
    rx
}
