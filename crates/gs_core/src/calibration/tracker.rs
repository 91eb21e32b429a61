//! Running calibration of the engine's own probability predictions.
//!
//! The tracker is an explicitly owned accumulator: the orchestration layer
//! constructs it, feeds it one (prediction, outcome) pair per resolved
//! prediction, and resets it when a scenario ends. Nothing here is global.
//!
//! `metrics()` reports Brier score, clamped log loss, an expected-calibration
//! error, and the Murphy decomposition `brier ≈ reliability - resolution +
//! uncertainty` over fixed-width probability buckets.

use serde::{Deserialize, Serialize};

use crate::belief::clamp_probability;

/// Number of fixed-width reliability buckets.
pub const NUM_BUCKETS: usize = 10;

/// One recorded prediction against its eventual outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PredictionRecord {
    prediction: f64,
    outcome: bool,
}

/// One reliability-diagram bin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationBucket {
    /// Mean predicted probability of the pairs in this bin.
    pub average_prediction: f64,
    /// Observed outcome rate of the pairs in this bin.
    pub actual_rate: f64,
    pub count: usize,
}

/// Snapshot of calibration quality, derived from the full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationMetrics {
    pub brier_score: f64,
    pub log_loss: f64,
    /// Bucket-weighted mean absolute gap between prediction and outcome rate.
    pub calibration_error: f64,
    pub reliability: f64,
    pub resolution: f64,
    pub uncertainty: f64,
    pub buckets: Vec<CalibrationBucket>,
}

/// Accumulates (prediction, outcome) pairs across a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationTracker {
    history: Vec<PredictionRecord>,
}

impl CalibrationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction against its resolved outcome.
    ///
    /// The prediction is clamped into `[0, 1]`; the history is append-only
    /// until [`reset`](Self::reset).
    pub fn add_prediction(&mut self, predicted: f64, outcome: bool) {
        let prediction = if predicted.is_finite() {
            predicted.clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.history.push(PredictionRecord {
            prediction,
            outcome,
        });
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drop all accumulated history.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Recompute the calibration snapshot from the full history.
    ///
    /// An empty history yields an all-zero snapshot with empty buckets.
    pub fn metrics(&self) -> CalibrationMetrics {
        if self.history.is_empty() {
            return CalibrationMetrics {
                brier_score: 0.0,
                log_loss: 0.0,
                calibration_error: 0.0,
                reliability: 0.0,
                resolution: 0.0,
                uncertainty: 0.0,
                buckets: Vec::new(),
            };
        }

        let n = self.history.len() as f64;

        let mut brier = 0.0;
        let mut log_loss = 0.0;
        let mut positives = 0usize;

        let mut bucket_count = [0usize; NUM_BUCKETS];
        let mut bucket_pred_sum = [0.0f64; NUM_BUCKETS];
        let mut bucket_hit_count = [0usize; NUM_BUCKETS];

        for record in &self.history {
            let outcome = if record.outcome { 1.0 } else { 0.0 };
            let gap = record.prediction - outcome;
            brier += gap * gap;

            let clamped = clamp_probability(record.prediction);
            log_loss -= if record.outcome {
                clamped.ln()
            } else {
                (1.0 - clamped).ln()
            };

            if record.outcome {
                positives += 1;
            }

            let bucket = bucket_index(record.prediction);
            bucket_count[bucket] += 1;
            bucket_pred_sum[bucket] += record.prediction;
            if record.outcome {
                bucket_hit_count[bucket] += 1;
            }
        }

        brier /= n;
        log_loss /= n;

        let base_rate = positives as f64 / n;
        let uncertainty = base_rate * (1.0 - base_rate);

        let mut reliability = 0.0;
        let mut resolution = 0.0;
        let mut calibration_error = 0.0;
        let mut buckets = Vec::new();

        for b in 0..NUM_BUCKETS {
            if bucket_count[b] == 0 {
                continue;
            }
            let count = bucket_count[b] as f64;
            let average_prediction = bucket_pred_sum[b] / count;
            let actual_rate = bucket_hit_count[b] as f64 / count;
            let weight = count / n;

            let gap = average_prediction - actual_rate;
            reliability += weight * gap * gap;
            let spread = actual_rate - base_rate;
            resolution += weight * spread * spread;
            calibration_error += weight * gap.abs();

            buckets.push(CalibrationBucket {
                average_prediction,
                actual_rate,
                count: bucket_count[b],
            });
        }

        CalibrationMetrics {
            brier_score: brier,
            log_loss,
            calibration_error,
            reliability,
            resolution,
            uncertainty,
            buckets,
        }
    }
}

fn bucket_index(prediction: f64) -> usize {
    ((prediction * NUM_BUCKETS as f64) as usize).min(NUM_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_tracker_metrics() {
        let tracker = CalibrationTracker::new();
        let metrics = tracker.metrics();
        assert_eq!(metrics.brier_score, 0.0);
        assert!(metrics.buckets.is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_perfect_predictions() {
        let mut tracker = CalibrationTracker::new();
        for _ in 0..50 {
            tracker.add_prediction(1.0, true);
            tracker.add_prediction(0.0, false);
        }
        let metrics = tracker.metrics();
        assert!(metrics.brier_score < 1e-12);
        assert!(metrics.calibration_error < 1e-12);
        assert_eq!(tracker.len(), 100);
    }

    #[test]
    fn test_brier_score_in_range() {
        let mut tracker = CalibrationTracker::new();
        // Worst possible predictions.
        for _ in 0..20 {
            tracker.add_prediction(0.0, true);
            tracker.add_prediction(1.0, false);
        }
        let metrics = tracker.metrics();
        assert!((metrics.brier_score - 1.0).abs() < 1e-12);
        assert!(metrics.log_loss.is_finite(), "Clamping must keep log loss finite");
    }

    #[test]
    fn test_decomposition_identity() {
        let mut tracker = CalibrationTracker::new();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..2000 {
            let p: f64 = rng.gen();
            let outcome = rng.gen::<f64>() < p;
            tracker.add_prediction(p, outcome);
        }
        let m = tracker.metrics();
        // Murphy decomposition holds up to within-bucket variance.
        let recomposed = m.reliability - m.resolution + m.uncertainty;
        assert!(
            (m.brier_score - recomposed).abs() < 0.02,
            "brier {} vs reliability-resolution+uncertainty {}",
            m.brier_score,
            recomposed
        );
    }

    #[test]
    fn test_honest_forecaster_beats_hedging() {
        // Predicting the true generating probability scores better than
        // predicting 0.5 everywhere, on average over many trials.
        let mut honest = CalibrationTracker::new();
        let mut hedged = CalibrationTracker::new();
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        for _ in 0..3000 {
            let p: f64 = rng.gen();
            let outcome = rng.gen::<f64>() < p;
            honest.add_prediction(p, outcome);
            hedged.add_prediction(0.5, outcome);
        }
        assert!(
            honest.metrics().brier_score < hedged.metrics().brier_score,
            "honest {} should beat hedged {}",
            honest.metrics().brier_score,
            hedged.metrics().brier_score
        );
    }

    #[test]
    fn test_buckets_partition_history() {
        let mut tracker = CalibrationTracker::new();
        for i in 0..100 {
            tracker.add_prediction(i as f64 / 99.0, i % 3 == 0);
        }
        let metrics = tracker.metrics();
        let total: usize = metrics.buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 100);
        for bucket in &metrics.buckets {
            assert!((0.0..=1.0).contains(&bucket.average_prediction));
            assert!((0.0..=1.0).contains(&bucket.actual_rate));
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut tracker = CalibrationTracker::new();
        tracker.add_prediction(0.7, true);
        tracker.reset();
        assert!(tracker.is_empty());
        assert!(tracker.metrics().buckets.is_empty());
    }

    #[test]
    fn test_extreme_prediction_edges() {
        let mut tracker = CalibrationTracker::new();
        tracker.add_prediction(1.0, true);
        tracker.add_prediction(0.0, false);
        tracker.add_prediction(f64::NAN, true);
        let metrics = tracker.metrics();
        assert!(metrics.log_loss.is_finite());
        assert!(metrics.brier_score.is_finite());
    }
}
