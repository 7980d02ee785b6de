//! The claim verifier: source selection, parallel or sequential evidence
//! collection under per-source timeouts, consensus, and batch mode.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};

use vibecheck_core::config::VerifierConfig;
use vibecheck_core::types::claim::{
    Claim, ClaimType, ClaimVerdict, Evidence, EvidenceSource, VerificationResult,
};
use vibecheck_core::FxHashMap;
use vibecheck_storage::calibration::CalibrationStore;

use super::calibration::CalibrationTracker;
use super::chain;
use super::consensus;
use super::context::ProjectContext;
use super::sources::{collector_for, EvidenceCollector};

/// Histograms over a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub by_verdict: FxHashMap<String, usize>,
    /// Verified evidence count per source.
    pub by_source: FxHashMap<String, usize>,
    pub consensus_count: usize,
}

/// Per-claim results plus the summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<VerificationResult>,
    pub summary: BatchSummary,
}

pub struct ClaimVerifier {
    collectors: Vec<Arc<dyn EvidenceCollector>>,
    config: VerifierConfig,
    calibration: CalibrationTracker,
    ctx: Arc<ProjectContext>,
}

impl ClaimVerifier {
    /// Build a verifier for the project at `root`, with calibration
    /// persisted under `.vibecheck/`.
    pub fn new(root: &Path, config: VerifierConfig) -> Self {
        let calibration = CalibrationTracker::with_store(
            CalibrationStore::for_project(root),
            config.effective_min_samples_per_bucket(),
        );
        Self::with_context(Arc::new(ProjectContext::load(root)), config, calibration)
    }

    /// Build with an explicit context (tests, embedding).
    pub fn with_context(
        ctx: Arc<ProjectContext>,
        config: VerifierConfig,
        calibration: CalibrationTracker,
    ) -> Self {
        let collectors = config
            .effective_sources()
            .into_iter()
            .map(|source| Arc::from(collector_for(source)))
            .collect();
        Self {
            collectors,
            config,
            calibration,
            ctx,
        }
    }

    /// Verify one claim end to end.
    pub fn verify(&self, claim: &Claim) -> VerificationResult {
        let applicable: Vec<Arc<dyn EvidenceCollector>> = self
            .collectors
            .iter()
            .filter(|c| c.supports(claim.claim_type))
            .cloned()
            .collect();

        let mut evidences = if self.config.effective_parallel() {
            self.collect_parallel(claim, &applicable)
        } else {
            self.collect_sequential(claim, &applicable)
        };

        // Calibration remaps each source's reported confidence before
        // weighting.
        for evidence in &mut evidences {
            evidence.confidence =
                self.calibration
                    .calibrate(claim.claim_type, evidence.source, evidence.confidence);
        }

        let confidence = consensus::aggregate_confidence(&evidences);
        let verdict = ClaimVerdict::from_confidence(confidence);
        let consensus_reached = consensus::has_consensus(
            &evidences,
            self.config.effective_required_sources(),
            self.config.effective_consensus_threshold(),
        );
        let chain = chain::build_chain(claim, &evidences, verdict, confidence);

        VerificationResult {
            claim: claim.clone(),
            evidences,
            chain,
            consensus: consensus_reached,
            verdict,
            confidence,
        }
    }

    fn collect_parallel(
        &self,
        claim: &Claim,
        applicable: &[Arc<dyn EvidenceCollector>],
    ) -> Vec<Evidence> {
        let timeout = Duration::from_millis(self.config.effective_source_timeout_ms());
        let deadline = Instant::now() + timeout;
        let (tx, rx) = unbounded::<Evidence>();

        for collector in applicable {
            let collector = Arc::clone(collector);
            let ctx = Arc::clone(&self.ctx);
            let claim = claim.clone();
            let tx = tx.clone();
            std::thread::spawn(move || {
                let evidence =
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        collector.collect(&claim, &ctx)
                    }))
                    .unwrap_or_else(|_| Evidence {
                        source: collector.source(),
                        verified: false,
                        confidence: 0.0,
                        details: String::new(),
                        duration_ms: 0,
                        error: Some("source panicked".to_string()),
                    });
                let _ = tx.send(evidence);
            });
        }
        drop(tx);

        let mut evidences = Vec::with_capacity(applicable.len());
        let mut responded: Vec<EvidenceSource> = Vec::new();
        while evidences.len() < applicable.len() {
            match rx.recv_deadline(deadline) {
                Ok(evidence) => {
                    responded.push(evidence.source);
                    evidences.push(evidence);
                }
                Err(_) => break,
            }
        }
        // Sources still running past the deadline count as timed out.
        for collector in applicable {
            let source = collector.source();
            if !responded.contains(&source) {
                evidences.push(Evidence {
                    source,
                    verified: false,
                    confidence: 0.0,
                    details: String::new(),
                    duration_ms: timeout.as_millis() as u64,
                    error: Some(format!(
                        "timed out after {} ms",
                        timeout.as_millis()
                    )),
                });
            }
        }
        // Deterministic order: most reliable source first.
        evidences.sort_by(|a, b| {
            b.source
                .reliability()
                .total_cmp(&a.source.reliability())
                .then_with(|| a.source.to_string().cmp(&b.source.to_string()))
        });
        evidences
    }

    fn collect_sequential(
        &self,
        claim: &Claim,
        applicable: &[Arc<dyn EvidenceCollector>],
    ) -> Vec<Evidence> {
        let early_exit = self.config.effective_early_exit_confidence();
        let mut evidences = Vec::with_capacity(applicable.len());
        for collector in applicable {
            let evidence = collector.collect(claim, &self.ctx);
            let exit = evidence.verified && evidence.confidence >= early_exit;
            evidences.push(evidence);
            if exit {
                break;
            }
        }
        evidences
    }

    /// Verify many claims under the batch concurrency bound.
    pub fn verify_batch(&self, claims: Vec<Claim>) -> BatchResult {
        let concurrency = self.config.effective_batch_concurrency().max(1);
        let (work_tx, work_rx) = unbounded::<(usize, Claim)>();
        let (done_tx, done_rx) = unbounded::<(usize, VerificationResult)>();
        let total = claims.len();
        for pair in claims.into_iter().enumerate() {
            let _ = work_tx.send(pair);
        }
        drop(work_tx);

        std::thread::scope(|scope| {
            for _ in 0..concurrency {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    while let Ok((index, claim)) = work_rx.recv() {
                        let _ = done_tx.send((index, self.verify(&claim)));
                    }
                });
            }
            drop(done_tx);

            let mut results: Vec<Option<VerificationResult>> =
                (0..total).map(|_| None).collect();
            while let Ok((index, result)) = done_rx.recv() {
                results[index] = Some(result);
            }
            let results: Vec<VerificationResult> =
                results.into_iter().flatten().collect();

            let mut summary = BatchSummary {
                total: results.len(),
                ..Default::default()
            };
            for result in &results {
                *summary
                    .by_verdict
                    .entry(result.verdict.to_string())
                    .or_insert(0) += 1;
                for evidence in result.evidences.iter().filter(|e| e.verified) {
                    *summary
                        .by_source
                        .entry(evidence.source.to_string())
                        .or_insert(0) += 1;
                }
                if result.consensus {
                    summary.consensus_count += 1;
                }
            }
            BatchResult { results, summary }
        })
    }

    /// Feed user feedback into calibration and persist it.
    pub fn record_feedback(
        &self,
        claim_type: ClaimType,
        source: EvidenceSource,
        reported_confidence: f64,
        was_correct: bool,
    ) {
        self.calibration
            .record_feedback(claim_type, source, reported_confidence, was_correct);
        if let Err(e) = self.calibration.save() {
            tracing::warn!(error = %e, "calibration save failed");
        }
    }

    /// Calibration quality metrics: (expected calibration error, Brier).
    pub fn calibration_metrics(&self) -> (f64, f64) {
        (
            self.calibration.expected_calibration_error(),
            self.calibration.brier_score(),
        )
    }
}
