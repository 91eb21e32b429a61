//! # gs_core - Deterministic Sensor-Fusion and Strike-Decision Engine
//!
//! This library maintains per-cell belief about hidden grid state, updates
//! it from noisy sensor readings with odds-form Bayesian inference, tracks
//! the calibration of its own predictions, and scores strike/recon decisions
//! with Monte-Carlo risk analysis.
//!
//! ## Features
//! - 100% deterministic (same seed = same fields, readings, samples, advice)
//! - Pure analysis paths: heatmaps and sampling never touch the grid
//! - Clamped probability algebra: numeric degeneracies never panic
//! - Plain JSON-serializable records across the whole boundary

// Game engine APIs often require many parameters for grid, config, state, etc.
#![allow(clippy::too_many_arguments)]
// Loop style - can fix incrementally
#![allow(clippy::needless_range_loop)]

pub mod belief;
pub mod calibration;
pub mod config;
pub mod decision;
pub mod deterministic;
pub mod error;
pub mod field;
pub mod models;
pub mod risk;
pub mod sensor;

// Re-export the boundary types and entry points
pub use belief::{apply_reading, diffuse, explain, update, BayesBreakdown, BeliefUpdate};
pub use calibration::{CalibrationBucket, CalibrationMetrics, CalibrationTracker};
pub use config::{
    BetaPriorConfig, DecisionConfig, DiffusionConfig, GameConfig, MonteCarloConfig,
    SpatialFieldConfig,
};
pub use decision::{
    ev_heatmap, execute_strike, strike_ev, validate_strike, voi, voi_heatmap, StrikeOutcome,
    StrikeReport, StrikeValidation,
};
pub use error::{CoreError, Result};
pub use field::{SpatialFieldGenerator, TruthField};
pub use models::{BeliefGrid, Cell, Heatmap, HeatmapSummary, ReconResult};
pub use risk::{
    loss_risk_heatmap, monte_carlo_samples, policy_recommendations, risk_averse_heatmap,
    variance_heatmap, MonteCarloSample, PolicyRecommendation, PolicySet, RecommendedAction,
    SamplingError,
};
pub use sensor::{CellContext, SensorPerformance, SensorReading, SensorType, TerrainClass};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    fn build_grid(config: &GameConfig) -> BeliefGrid {
        let truth = SpatialFieldGenerator::generate(
            config.width,
            config.height,
            &config.spatial,
            &config.beta_priors,
            config.seed,
        )
        .unwrap();
        BeliefGrid::from_truth(&truth)
    }

    #[test]
    fn test_full_turn_flow() {
        let config = GameConfig {
            seed: 314,
            ..Default::default()
        };
        config.validate().unwrap();
        let mut grid = build_grid(&config);
        let mut tracker = CalibrationTracker::new();

        for turn in 0..20u32 {
            let x = (turn as usize * 3) % config.width;
            let y = (turn as usize * 5) % config.height;

            let context = sensor::context(x, y, config.width, config.height, config.seed);
            let truth = grid.get(x, y).unwrap().hostile_truth;
            let reading = sensor::simulate(
                SensorType::Drone,
                truth,
                &context,
                config.seed,
                turn,
                x,
                y,
            );
            let update = apply_reading(&mut grid, x, y, &reading, turn).unwrap();
            diffuse(&mut grid, &update, &config.diffusion);
            tracker.add_prediction(update.posterior, truth);
        }

        assert_eq!(tracker.len(), 20);
        let metrics = tracker.metrics();
        assert!(metrics.brier_score.is_finite());
        assert!((0.0..=1.0).contains(&metrics.brier_score));
        assert!(metrics.log_loss >= 0.0);

        for cell in grid.cells() {
            assert!((0.0..=1.0).contains(&cell.posterior));
        }

        // Repeated readings sharpen belief toward truth more often than not.
        let set = policy_recommendations(
            &grid,
            &config,
            &MonteCarloConfig::default(),
            500.0,
            20,
            SensorType::Drone,
            config.risk_aversion,
            1,
        )
        .unwrap();
        assert!(set.greedy_ev.value.is_finite());
    }

    #[test]
    fn test_identical_seed_identical_analysis() {
        let config = GameConfig {
            seed: 2718,
            width: 12,
            height: 12,
            ..Default::default()
        };
        let run = || {
            let grid = build_grid(&config);
            let ev = ev_heatmap(&grid, 1, &config);
            let voi = voi_heatmap(&grid, SensorType::GroundRadar, &config, 1, config.seed);
            let samples = monte_carlo_samples(
                &grid,
                &MonteCarloConfig {
                    num_samples: 50,
                    seed: 9,
                    ..Default::default()
                },
            )
            .unwrap();
            let loss = loss_risk_heatmap(&grid, &samples, 1, &config);
            serde_json::to_string(&(ev, voi, loss)).unwrap()
        };
        let h1 = sha256_hex(run().as_bytes());
        let h2 = sha256_hex(run().as_bytes());
        assert_eq!(h1, h2, "Same seed should produce identical analysis sha256");
    }

    #[test]
    fn test_analysis_never_mutates_grid() {
        let config = GameConfig {
            seed: 11,
            ..Default::default()
        };
        let grid = build_grid(&config);
        let before = serde_json::to_string(&grid).unwrap();

        let _ = ev_heatmap(&grid, 2, &config);
        let _ = voi_heatmap(&grid, SensorType::Sigint, &config, 1, config.seed);
        let samples =
            monte_carlo_samples(&grid, &MonteCarloConfig::default()).unwrap();
        let _ = risk_averse_heatmap(&grid, &samples, 1, &config, 0.2);
        let _ = variance_heatmap(&grid, &samples, 1, &config);

        let after = serde_json::to_string(&grid).unwrap();
        assert_eq!(before, after, "Analysis paths must leave the grid untouched");
    }

    #[test]
    fn test_boundary_types_serialize() {
        let config = GameConfig::default();
        let grid = build_grid(&config);
        let verdict = validate_strike(&grid, 3, 3, 1, &config, false);
        let json = serde_json::to_value(&verdict).unwrap();
        assert!(json["allowed"].is_boolean());
        assert!(json["outcome"]["expected_value"].is_number());

        let breakdown = explain(
            0.4,
            &SensorReading {
                sensor: SensorType::Drone,
                outcome: true,
                effective_tpr: 0.8,
                effective_fpr: 0.1,
            },
        );
        let json = serde_json::to_value(&breakdown).unwrap();
        assert!(json["likelihood_ratio"].is_number());
    }
}
