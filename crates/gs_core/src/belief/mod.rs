//! Odds-form Bayesian belief updates and spatial diffusion.
//!
//! The update walks the textbook odds chain (prior, prior odds, likelihood
//! ratio, posterior odds, posterior) and [`explain`] returns every
//! intermediate so a reading's arithmetic can be audited after the fact.
//! Probabilities are clamped to `[EPSILON, 1 - EPSILON]` before any odds
//! computation, so degenerate inputs (prior exactly 0 or 1, FPR 0,
//! TPR == FPR) never raise and never produce a non-finite value.

use serde::{Deserialize, Serialize};

use crate::config::DiffusionConfig;
use crate::models::{BeliefGrid, ReconResult};
use crate::sensor::SensorReading;

/// Clamp margin keeping probabilities away from degenerate odds.
pub const EPSILON: f64 = 1e-6;

/// Clamp a probability into `[EPSILON, 1 - EPSILON]`.
///
/// Non-finite input collapses to 0.5 rather than propagating.
#[inline]
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_finite() {
        p.clamp(EPSILON, 1.0 - EPSILON)
    } else {
        0.5
    }
}

#[inline]
fn to_odds(p: f64) -> f64 {
    let clamped = clamp_probability(p);
    clamped / (1.0 - clamped)
}

#[inline]
fn from_odds(odds: f64) -> f64 {
    (odds / (1.0 + odds)).clamp(0.0, 1.0)
}

/// Every intermediate value of one Bayesian update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesBreakdown {
    pub prior: f64,
    pub clamped_prior: f64,
    pub prior_odds: f64,
    pub likelihood_ratio: f64,
    pub posterior_odds: f64,
    pub posterior: f64,
}

/// Compute the posterior with the full intermediate chain.
pub fn explain(prior: f64, reading: &SensorReading) -> BayesBreakdown {
    let clamped_prior = clamp_probability(prior);
    let prior_odds = clamped_prior / (1.0 - clamped_prior);

    let tpr = clamp_probability(reading.effective_tpr);
    let fpr = clamp_probability(reading.effective_fpr);
    let likelihood_ratio = if reading.outcome {
        tpr / fpr
    } else {
        (1.0 - tpr) / (1.0 - fpr)
    };

    let posterior_odds = prior_odds * likelihood_ratio;
    let posterior = from_odds(posterior_odds);

    BayesBreakdown {
        prior,
        clamped_prior,
        prior_odds,
        likelihood_ratio,
        posterior_odds,
        posterior,
    }
}

/// Posterior probability after one reading. Odds-form Bayes rule.
#[inline]
pub fn update(prior: f64, reading: &SensorReading) -> f64 {
    explain(prior, reading).posterior
}

/// The result of applying one reading to one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefUpdate {
    pub x: usize,
    pub y: usize,
    pub prior: f64,
    pub posterior: f64,
    pub entry: ReconResult,
}

/// Apply a reading to cell `(x, y)`: record the recon entry and move the
/// posterior. Out-of-bounds coordinates are a no-op returning None.
pub fn apply_reading(
    grid: &mut BeliefGrid,
    x: usize,
    y: usize,
    reading: &SensorReading,
    turn: u32,
) -> Option<BeliefUpdate> {
    let cell = grid.get_mut(x, y)?;
    let prior = cell.posterior;
    let posterior = update(prior, reading);

    let entry = ReconResult {
        sensor: reading.sensor,
        outcome: reading.outcome,
        effective_tpr: reading.effective_tpr,
        effective_fpr: reading.effective_fpr,
        confidence: (reading.effective_tpr - reading.effective_fpr).clamp(0.0, 1.0),
        turn,
        prior,
        posterior,
    };
    cell.recon_history.push(entry.clone());
    cell.posterior = posterior;

    Some(BeliefUpdate {
        x,
        y,
        prior,
        posterior,
        entry,
    })
}

/// Propagate a fraction of a belief change to spatial neighbors.
///
/// The center update's likelihood ratio is raised to a distance-faded
/// exponent and combined into each neighbor's odds. This is the same odds
/// rule as the update itself, never a linear blend, so every neighbor stays
/// in `[0, 1]` and an uninformative center change (LR = 1) moves nothing.
pub fn diffuse(grid: &mut BeliefGrid, center: &BeliefUpdate, config: &DiffusionConfig) {
    if !grid.in_bounds(center.x, center.y) || config.radius <= 0.0 {
        return;
    }
    let lr = to_odds(center.posterior) / to_odds(center.prior);
    if !lr.is_finite() || lr <= 0.0 {
        return;
    }

    let reach = config.radius.ceil() as i64;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if dx == 0 && dy == 0 {
                continue;
            }
            let distance = ((dx * dx + dy * dy) as f64).sqrt();
            if distance > config.radius {
                continue;
            }
            let nx = center.x as i64 + dx;
            let ny = center.y as i64 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let Some(cell) = grid.get_mut(nx as usize, ny as usize) else {
                continue;
            };

            let fade =
                (-(distance * distance) / (2.0 * config.falloff * config.falloff)).exp();
            // Neighbors never move as far as the center itself.
            let exponent = (config.neighbor_fraction * fade).min(0.95);
            if exponent <= 0.0 {
                continue;
            }
            let neighbor_odds = to_odds(cell.posterior) * lr.powf(exponent);
            cell.posterior = from_odds(neighbor_odds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorType;
    use proptest::prelude::*;

    fn reading(outcome: bool, tpr: f64, fpr: f64) -> SensorReading {
        SensorReading {
            sensor: SensorType::Drone,
            outcome,
            effective_tpr: tpr,
            effective_fpr: fpr,
        }
    }

    #[test]
    fn test_positive_reading_raises_posterior() {
        let posterior = update(0.3, &reading(true, 0.8, 0.1));
        assert!(
            posterior > 0.3,
            "Positive reading with TPR > FPR must raise belief: {}",
            posterior
        );
    }

    #[test]
    fn test_negative_reading_lowers_posterior() {
        let posterior = update(0.3, &reading(false, 0.8, 0.1));
        assert!(posterior < 0.3, "Negative reading must lower belief: {}", posterior);
    }

    #[test]
    fn test_breakdown_chain_is_consistent() {
        let b = explain(0.25, &reading(true, 0.9, 0.2));
        assert!((b.prior_odds - 0.25 / 0.75).abs() < 1e-9);
        assert!((b.likelihood_ratio - 4.5).abs() < 1e-9);
        assert!((b.posterior_odds - b.prior_odds * b.likelihood_ratio).abs() < 1e-12);
        assert!((b.posterior - b.posterior_odds / (1.0 + b.posterior_odds)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_never_panic() {
        for prior in [0.0, 1.0, f64::NAN, -3.0, 7.0] {
            for (tpr, fpr) in [(0.5, 0.5), (0.8, 0.0), (1.0, 1.0), (0.0, 0.0)] {
                for outcome in [true, false] {
                    let p = update(prior, &reading(outcome, tpr, fpr));
                    assert!(p.is_finite(), "prior={} tpr={} fpr={}", prior, tpr, fpr);
                    assert!((0.0..=1.0).contains(&p));
                }
            }
        }
    }

    #[test]
    fn test_uninformative_sensor_moves_nothing() {
        // TPR == FPR carries no evidence.
        let p = update(0.4, &reading(true, 0.6, 0.6));
        assert!((p - 0.4).abs() < 1e-6, "Uninformative reading moved belief to {}", p);
    }

    #[test]
    fn test_two_readings_order_independent() {
        let first = reading(true, 0.85, 0.1);
        let second = reading(false, 0.7, 0.2);
        let ab = update(update(0.35, &first), &second);
        let ba = update(update(0.35, &second), &first);
        assert!(
            (ab - ba).abs() < 1e-9,
            "Independent readings must commute: {} vs {}",
            ab,
            ba
        );
    }

    #[test]
    fn test_apply_reading_records_history() {
        let mut grid = BeliefGrid::uniform(4, 4, 0.5, 0.1).unwrap();
        let result = apply_reading(&mut grid, 1, 2, &reading(true, 0.8, 0.1), 3).unwrap();
        assert!(result.posterior > result.prior);

        let cell = grid.get(1, 2).unwrap();
        assert_eq!(cell.recon_history.len(), 1);
        assert_eq!(cell.recon_history[0].turn, 3);
        assert!((cell.posterior - result.posterior).abs() < 1e-12);

        // Second reading appends, never truncates.
        apply_reading(&mut grid, 1, 2, &reading(false, 0.8, 0.1), 4).unwrap();
        let cell = grid.get(1, 2).unwrap();
        assert_eq!(cell.recon_history.len(), 2);
        assert_eq!(cell.recon_history[1].turn, 4);
    }

    #[test]
    fn test_apply_reading_out_of_bounds_is_noop() {
        let mut grid = BeliefGrid::uniform(4, 4, 0.5, 0.1).unwrap();
        assert!(apply_reading(&mut grid, 9, 0, &reading(true, 0.8, 0.1), 1).is_none());
        for cell in grid.cells() {
            assert!((cell.posterior - 0.5).abs() < 1e-12);
            assert!(cell.recon_history.is_empty());
        }
    }

    #[test]
    fn test_diffuse_moves_neighbors_toward_center_change() {
        let mut grid = BeliefGrid::uniform(5, 5, 0.5, 0.1).unwrap();
        let update = apply_reading(&mut grid, 2, 2, &reading(true, 0.9, 0.05), 1).unwrap();
        diffuse(&mut grid, &update, &DiffusionConfig::default());

        let near = grid.get(2, 1).unwrap().posterior;
        let far = grid.get(0, 0).unwrap().posterior;
        assert!(near > 0.5, "Adjacent neighbor should gain belief: {}", near);
        assert!(
            near > far,
            "Closer neighbors move further: near {} vs far {}",
            near,
            far
        );
        assert!(
            near < update.posterior,
            "Neighbor never moves as far as the center"
        );
    }

    #[test]
    fn test_diffuse_keeps_probabilities_in_range() {
        let mut grid = BeliefGrid::uniform(5, 5, 0.999, 0.1).unwrap();
        let update = apply_reading(&mut grid, 2, 2, &reading(true, 0.95, 0.01), 1).unwrap();
        diffuse(&mut grid, &update, &DiffusionConfig::default());
        for cell in grid.cells() {
            assert!((0.0..=1.0).contains(&cell.posterior));
            assert!(cell.posterior.is_finite());
        }
    }

    #[test]
    fn test_diffuse_zero_radius_is_noop() {
        let mut grid = BeliefGrid::uniform(5, 5, 0.5, 0.1).unwrap();
        let update = apply_reading(&mut grid, 2, 2, &reading(true, 0.9, 0.05), 1).unwrap();
        let config = DiffusionConfig {
            radius: 0.0,
            ..Default::default()
        };
        diffuse(&mut grid, &update, &config);
        assert!((grid.get(2, 1).unwrap().posterior - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_diffuse_at_grid_edge() {
        let mut grid = BeliefGrid::uniform(3, 3, 0.5, 0.1).unwrap();
        let update = apply_reading(&mut grid, 0, 0, &reading(true, 0.9, 0.05), 1).unwrap();
        diffuse(&mut grid, &update, &DiffusionConfig::default());
        assert!(grid.get(1, 0).unwrap().posterior > 0.5);
    }

    proptest! {
        #[test]
        fn prop_update_stays_in_unit_interval(
            prior in 0.0f64..=1.0,
            tpr in 0.0f64..=1.0,
            fpr in 0.0f64..=1.0,
            outcome in proptest::bool::ANY,
        ) {
            let p = update(prior, &reading(outcome, tpr, fpr));
            prop_assert!(p.is_finite());
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn prop_positive_reading_with_informative_sensor_raises(
            prior in 0.01f64..0.99,
            tpr in 0.55f64..0.95,
            fpr in 0.05f64..0.45,
        ) {
            let p = update(prior, &reading(true, tpr, fpr));
            prop_assert!(p > prior, "prior {} -> posterior {}", prior, p);
        }
    }
}
