//! Value of information of one more sensor reading.
//!
//! For a candidate cell, marginalize the two possible outcomes of the
//! proposed reading under the current belief, push each hypothetical outcome
//! through the same odds-form update the real reading would use, and compare
//! the best local strike decision before and after. "Best" always includes
//! the option of not striking, so an observation can never make the
//! decision-maker worse off and VOI is non-negative everywhere.

use rayon::prelude::*;

use crate::belief::{self, clamp_probability};
use crate::config::GameConfig;
use crate::models::{BeliefGrid, Heatmap};
use crate::sensor::{self, SensorReading, SensorType};

/// Strike EV at `(x, y)` with the center cell's posterior replaced.
///
/// Used for what-if evaluation; the grid itself is never touched.
fn ev_with_center_posterior(
    grid: &BeliefGrid,
    x: usize,
    y: usize,
    radius: usize,
    config: &GameConfig,
    center_posterior: f64,
) -> f64 {
    let r = radius as i64;
    let mut value = 0.0;
    for dy in -r..=r {
        for dx in -r..=r {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let Some(cell) = grid.get(nx as usize, ny as usize) else {
                continue;
            };
            let posterior = if dx == 0 && dy == 0 {
                center_posterior
            } else {
                cell.posterior
            };
            value +=
                config.hostile_value * posterior - config.infra_penalty * cell.infra_prior;
        }
    }
    value - config.strike_cost
}

/// Expected improvement in the best local strike decision from one more
/// reading of cell `(x, y)`. Out of bounds yields 0.
pub fn voi(
    grid: &BeliefGrid,
    x: usize,
    y: usize,
    sensor: SensorType,
    radius: usize,
    config: &GameConfig,
    seed: u64,
) -> f64 {
    let Some(cell) = grid.get(x, y) else {
        return 0.0;
    };

    let context = sensor::context(x, y, grid.width(), grid.height(), seed);
    let perf = sensor::performance(sensor, &context, config.recon_cost);

    let p = clamp_probability(cell.posterior);
    let marginal_positive = p * perf.effective_tpr + (1.0 - p) * perf.effective_fpr;

    let positive = SensorReading {
        sensor,
        outcome: true,
        effective_tpr: perf.effective_tpr,
        effective_fpr: perf.effective_fpr,
    };
    let negative = SensorReading {
        outcome: false,
        ..positive.clone()
    };
    let posterior_if_positive = belief::update(p, &positive);
    let posterior_if_negative = belief::update(p, &negative);

    let best_now = ev_with_center_posterior(grid, x, y, radius, config, p).max(0.0);
    let best_after = marginal_positive
        * ev_with_center_posterior(grid, x, y, radius, config, posterior_if_positive).max(0.0)
        + (1.0 - marginal_positive)
            * ev_with_center_posterior(grid, x, y, radius, config, posterior_if_negative)
                .max(0.0);

    // Non-negative by construction; the max clears float dust.
    (best_after - best_now).max(0.0)
}

/// Value of information with every cell as the candidate target.
pub fn voi_heatmap(
    grid: &BeliefGrid,
    sensor: SensorType,
    config: &GameConfig,
    radius: usize,
    seed: u64,
) -> Heatmap {
    (0..grid.height())
        .into_par_iter()
        .map(|y| {
            (0..grid.width())
                .map(|x| voi(grid, x, y, sensor, radius, config, seed))
                .collect()
        })
        .collect()
}
