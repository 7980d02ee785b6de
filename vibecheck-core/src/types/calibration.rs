//! Reliability-diagram buckets for verifier calibration.

use serde::{Deserialize, Serialize};

/// Default bucket boundaries. The first bucket covers [0, 0.5).
pub const DEFAULT_BUCKET_BOUNDARIES: &[f64] = &[0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0];

/// One confidence bucket with observed outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationBucket {
    pub min: f64,
    pub max: f64,
    pub mid: f64,
    pub total: u64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub actual_accuracy: f64,
}

impl CalibrationBucket {
    /// Empty bucket covering `[min, max)`.
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            mid: (min + max) / 2.0,
            total: 0,
            true_positives: 0,
            false_positives: 0,
            actual_accuracy: 0.0,
        }
    }

    /// Record one feedback sample.
    pub fn record(&mut self, was_correct: bool) {
        self.total += 1;
        if was_correct {
            self.true_positives += 1;
        } else {
            self.false_positives += 1;
        }
        self.actual_accuracy = self.true_positives as f64 / self.total as f64;
    }
}

/// Build the bucket ladder from boundaries.
pub fn buckets_from_boundaries(boundaries: &[f64]) -> Vec<CalibrationBucket> {
    let mut buckets = Vec::with_capacity(boundaries.len());
    let mut lower = 0.0;
    for &upper in boundaries {
        buckets.push(CalibrationBucket::new(lower, upper));
        lower = upper;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder_covers_unit_interval() {
        let buckets = buckets_from_boundaries(DEFAULT_BUCKET_BOUNDARIES);
        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].min, 0.0);
        assert_eq!(buckets[0].max, 0.5);
        assert_eq!(buckets.last().unwrap().max, 1.0);
    }

    #[test]
    fn record_updates_accuracy() {
        let mut bucket = CalibrationBucket::new(0.8, 0.9);
        bucket.record(true);
        bucket.record(true);
        bucket.record(false);
        assert_eq!(bucket.total, 3);
        assert!((bucket.actual_accuracy - 2.0 / 3.0).abs() < 1e-9);
    }
}
