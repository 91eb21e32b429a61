//! Strike expected value, validation and execution.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::belief::EPSILON;
use crate::config::GameConfig;
use crate::models::{BeliefGrid, Heatmap};

/// Expected outcome of a strike centered on one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeOutcome {
    pub expected_value: f64,
    pub cost: f64,
    /// Probability that at least one affected cell holds infrastructure.
    pub infra_hit_probability: f64,
    pub affected_cells: Vec<(usize, usize)>,
}

impl StrikeOutcome {
    fn empty() -> Self {
        Self {
            expected_value: 0.0,
            cost: 0.0,
            infra_hit_probability: 0.0,
            affected_cells: Vec::new(),
        }
    }
}

/// Cells within Chebyshev distance `radius` of the center, in bounds.
fn affected_cells(
    grid: &BeliefGrid,
    x: usize,
    y: usize,
    radius: usize,
) -> Vec<(usize, usize)> {
    let r = radius as i64;
    let mut cells = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if grid.in_bounds(nx, ny) {
                cells.push((nx, ny));
            }
        }
    }
    cells
}

/// Expected value of a strike at `(x, y)` with the given blast radius.
///
/// Sums `hostile_value x posterior - infra_penalty x infra prior` over the
/// affected cells, minus the flat strike cost. The infrastructure-hit
/// probability is `1 - prod(1 - p_i)`, the chance that at least one affected
/// cell holds infrastructure - never a naive sum. An out-of-bounds center is
/// a no-op returning a zeroed outcome.
pub fn strike_ev(
    grid: &BeliefGrid,
    x: usize,
    y: usize,
    radius: usize,
    config: &GameConfig,
) -> StrikeOutcome {
    if !grid.in_bounds(x, y) {
        return StrikeOutcome::empty();
    }
    let cells = affected_cells(grid, x, y, radius);

    let mut value = 0.0;
    let mut miss_all_infra = 1.0;
    for &(cx, cy) in &cells {
        if let Some(cell) = grid.get(cx, cy) {
            value += config.hostile_value * cell.posterior
                - config.infra_penalty * cell.infra_prior;
            miss_all_infra *= 1.0 - cell.infra_prior.clamp(0.0, 1.0);
        }
    }

    StrikeOutcome {
        expected_value: value - config.strike_cost,
        cost: config.strike_cost,
        infra_hit_probability: (1.0 - miss_all_infra).clamp(0.0, 1.0),
        affected_cells: cells,
    }
}

/// Structured verdict on a proposed strike.
///
/// The computed outcome is always attached, whatever the verdict, so the
/// caller can display the numbers behind a denial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeValidation {
    pub allowed: bool,
    pub requires_confirmation: bool,
    pub reason: String,
    pub outcome: StrikeOutcome,
}

/// Check a proposed strike against the collateral threshold.
///
/// Over-threshold collateral risk denies the strike unless the caller passes
/// an explicit override; risk inside the borderline band below the threshold
/// allows it but demands confirmation.
pub fn validate_strike(
    grid: &BeliefGrid,
    x: usize,
    y: usize,
    radius: usize,
    config: &GameConfig,
    override_collateral: bool,
) -> StrikeValidation {
    if !grid.in_bounds(x, y) {
        return StrikeValidation {
            allowed: false,
            requires_confirmation: false,
            reason: format!("target ({}, {}) is outside the grid", x, y),
            outcome: StrikeOutcome::empty(),
        };
    }

    let outcome = strike_ev(grid, x, y, radius, config);
    let threshold = config.collateral_threshold;
    let band_floor = threshold * (1.0 - config.decision.confirm_band);
    let risk = outcome.infra_hit_probability;

    if risk > threshold {
        if override_collateral {
            return StrikeValidation {
                allowed: true,
                requires_confirmation: true,
                reason: format!(
                    "collateral risk {:.3} exceeds threshold {:.3}, allowed by override",
                    risk, threshold
                ),
                outcome,
            };
        }
        log::debug!(
            "strike at ({}, {}) denied: collateral risk {:.3} > {:.3}",
            x,
            y,
            risk,
            threshold
        );
        return StrikeValidation {
            allowed: false,
            requires_confirmation: false,
            reason: format!(
                "collateral risk {:.3} exceeds threshold {:.3}",
                risk, threshold
            ),
            outcome,
        };
    }

    if risk > band_floor {
        return StrikeValidation {
            allowed: true,
            requires_confirmation: true,
            reason: format!(
                "collateral risk {:.3} is within {:.0}% of threshold {:.3}",
                risk,
                config.decision.confirm_band * 100.0,
                threshold
            ),
            outcome,
        };
    }

    StrikeValidation {
        allowed: true,
        requires_confirmation: false,
        reason: format!("collateral risk {:.3} within limits", risk),
        outcome,
    }
}

/// Realized result of an executed strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeReport {
    pub hostiles_hit: u32,
    pub infra_hit: u32,
    pub reward: f64,
    pub affected_cells: Vec<(usize, usize)>,
}

/// Resolve a strike against ground truth.
///
/// This is the only function in the engine that reads truth flags. Affected
/// cells collapse to a cleared posterior; the truth grids themselves are
/// never written. An out-of-bounds center is a no-op.
pub fn execute_strike(
    grid: &mut BeliefGrid,
    x: usize,
    y: usize,
    radius: usize,
    config: &GameConfig,
) -> StrikeReport {
    if !grid.in_bounds(x, y) {
        return StrikeReport {
            hostiles_hit: 0,
            infra_hit: 0,
            reward: 0.0,
            affected_cells: Vec::new(),
        };
    }
    let cells = affected_cells(grid, x, y, radius);

    let mut hostiles_hit = 0u32;
    let mut infra_hit = 0u32;
    for &(cx, cy) in &cells {
        if let Some(cell) = grid.get_mut(cx, cy) {
            if cell.hostile_truth {
                hostiles_hit += 1;
            }
            if cell.infra_truth {
                infra_hit += 1;
            }
            cell.posterior = EPSILON;
        }
    }

    let reward = f64::from(hostiles_hit) * config.hostile_value
        - f64::from(infra_hit) * config.infra_penalty
        - config.strike_cost;
    log::debug!(
        "strike at ({}, {}) r{}: {} hostiles, {} infra, reward {:.1}",
        x,
        y,
        radius,
        hostiles_hit,
        infra_hit,
        reward
    );

    StrikeReport {
        hostiles_hit,
        infra_hit,
        reward,
        affected_cells: cells,
    }
}

/// Strike expected value with every cell as the center.
pub fn ev_heatmap(grid: &BeliefGrid, radius: usize, config: &GameConfig) -> Heatmap {
    (0..grid.height())
        .into_par_iter()
        .map(|y| {
            (0..grid.width())
                .map(|x| strike_ev(grid, x, y, radius, config).expected_value)
                .collect()
        })
        .collect()
}
