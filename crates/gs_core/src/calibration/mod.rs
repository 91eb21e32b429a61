//! Prediction Calibration Tracking
//!
//! This module provides:
//! - CalibrationTracker: caller-owned accumulator of (prediction, outcome) pairs
//! - CalibrationMetrics: proper-scoring-rule snapshot recomputed on request
//! - CalibrationBucket: one reliability-diagram bin

pub mod tracker;

pub use tracker::{CalibrationBucket, CalibrationMetrics, CalibrationTracker, NUM_BUCKETS};
