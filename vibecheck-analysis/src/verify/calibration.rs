//! Calibration: per-(claim type, source) reliability-diagram buckets fed
//! by user feedback, used to remap reported confidence once a bucket has
//! enough samples. Exposes Expected Calibration Error and the Brier
//! score.

use std::sync::Mutex;

use vibecheck_core::types::calibration::{
    buckets_from_boundaries, CalibrationBucket, DEFAULT_BUCKET_BOUNDARIES,
};
use vibecheck_core::types::claim::{ClaimType, EvidenceSource};
use vibecheck_storage::calibration::{CalibrationData, CalibrationStore};

fn bucket_key(claim_type: ClaimType, source: EvidenceSource) -> String {
    format!("{claim_type}:{source}")
}

fn bucket_index(buckets: &[CalibrationBucket], confidence: f64) -> usize {
    buckets
        .iter()
        .position(|b| confidence < b.max)
        .unwrap_or(buckets.len().saturating_sub(1))
}

/// Thread-safe calibration state with optional persistence.
pub struct CalibrationTracker {
    data: Mutex<CalibrationData>,
    min_samples_per_bucket: u64,
    store: Option<CalibrationStore>,
}

impl CalibrationTracker {
    /// Fresh in-memory tracker.
    pub fn new(min_samples_per_bucket: u64) -> Self {
        Self {
            data: Mutex::new(CalibrationData::default()),
            min_samples_per_bucket,
            store: None,
        }
    }

    /// Tracker backed by `calibration.json`.
    pub fn with_store(store: CalibrationStore, min_samples_per_bucket: u64) -> Self {
        Self {
            data: Mutex::new(store.load()),
            min_samples_per_bucket,
            store: Some(store),
        }
    }

    /// Record one piece of user feedback.
    pub fn record_feedback(
        &self,
        claim_type: ClaimType,
        source: EvidenceSource,
        reported_confidence: f64,
        was_correct: bool,
    ) {
        let mut data = self.data.lock().expect("calibration lock");
        let buckets = data
            .buckets
            .entry(bucket_key(claim_type, source))
            .or_insert_with(|| buckets_from_boundaries(DEFAULT_BUCKET_BOUNDARIES));
        let index = bucket_index(buckets, reported_confidence.clamp(0.0, 1.0));
        buckets[index].record(was_correct);
    }

    /// Remap a reported confidence through its bucket once the bucket has
    /// enough samples; otherwise pass it through unchanged.
    pub fn calibrate(
        &self,
        claim_type: ClaimType,
        source: EvidenceSource,
        reported_confidence: f64,
    ) -> f64 {
        let data = self.data.lock().expect("calibration lock");
        let Some(buckets) = data.buckets.get(&bucket_key(claim_type, source)) else {
            return reported_confidence;
        };
        let bucket = &buckets[bucket_index(buckets, reported_confidence.clamp(0.0, 1.0))];
        if bucket.total >= self.min_samples_per_bucket {
            bucket.actual_accuracy
        } else {
            reported_confidence
        }
    }

    /// Expected Calibration Error across all buckets: the sample-weighted
    /// mean of |bucket midpoint − observed accuracy|.
    pub fn expected_calibration_error(&self) -> f64 {
        let data = self.data.lock().expect("calibration lock");
        let mut total_samples = 0u64;
        let mut weighted_error = 0.0;
        for buckets in data.buckets.values() {
            for bucket in buckets {
                if bucket.total == 0 {
                    continue;
                }
                total_samples += bucket.total;
                weighted_error +=
                    bucket.total as f64 * (bucket.mid - bucket.actual_accuracy).abs();
            }
        }
        if total_samples == 0 {
            0.0
        } else {
            weighted_error / total_samples as f64
        }
    }

    /// Brier score approximated from bucket aggregates, using the bucket
    /// midpoint as the forecast probability.
    pub fn brier_score(&self) -> f64 {
        let data = self.data.lock().expect("calibration lock");
        let mut total_samples = 0u64;
        let mut sum = 0.0;
        for buckets in data.buckets.values() {
            for bucket in buckets {
                if bucket.total == 0 {
                    continue;
                }
                total_samples += bucket.total;
                sum += bucket.true_positives as f64 * (bucket.mid - 1.0).powi(2)
                    + bucket.false_positives as f64 * bucket.mid.powi(2);
            }
        }
        if total_samples == 0 {
            0.0
        } else {
            sum / total_samples as f64
        }
    }

    /// Persist to the backing store, when one is configured.
    pub fn save(&self) -> std::io::Result<()> {
        if let Some(store) = &self.store {
            let data = self.data.lock().expect("calibration lock");
            store.save(&data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remapping_kicks_in_after_min_samples() {
        let tracker = CalibrationTracker::new(10);
        // Below the sample floor: pass-through.
        assert_eq!(
            tracker.calibrate(ClaimType::Import, EvidenceSource::Ast, 0.85),
            0.85
        );
        // Ten samples at 60% observed accuracy in the [0.8, 0.9) bucket.
        for i in 0..10 {
            tracker.record_feedback(ClaimType::Import, EvidenceSource::Ast, 0.85, i < 6);
        }
        let calibrated = tracker.calibrate(ClaimType::Import, EvidenceSource::Ast, 0.85);
        assert!((calibrated - 0.6).abs() < 1e-9);
        // Other (type, source) pairs are unaffected.
        assert_eq!(
            tracker.calibrate(ClaimType::Import, EvidenceSource::Git, 0.85),
            0.85
        );
    }

    #[test]
    fn ece_and_brier_reflect_miscalibration() {
        let tracker = CalibrationTracker::new(10);
        // Reported ~0.85 but only 50% correct: clearly miscalibrated.
        for i in 0..20 {
            tracker.record_feedback(
                ClaimType::Import,
                EvidenceSource::Ast,
                0.85,
                i % 2 == 0,
            );
        }
        let ece = tracker.expected_calibration_error();
        assert!((ece - 0.35).abs() < 1e-9);
        let brier = tracker.brier_score();
        assert!(brier > 0.2 && brier < 0.5);
    }

    #[test]
    fn persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CalibrationStore::at(dir.path().join("calibration.json"));
        let tracker = CalibrationTracker::with_store(store, 2);
        tracker.record_feedback(ClaimType::Import, EvidenceSource::Ast, 0.85, true);
        tracker.record_feedback(ClaimType::Import, EvidenceSource::Ast, 0.85, true);
        tracker.save().unwrap();

        let store = CalibrationStore::at(dir.path().join("calibration.json"));
        let reloaded = CalibrationTracker::with_store(store, 2);
        assert_eq!(
            reloaded.calibrate(ClaimType::Import, EvidenceSource::Ast, 0.85),
            1.0
        );
    }
}
