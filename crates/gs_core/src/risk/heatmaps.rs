//! Risk heatmaps derived from the simulated outcome distribution.
//!
//! All three maps score a hypothetical strike at every cell against the
//! Monte-Carlo realizations rather than the point-estimate posterior, so
//! they see tail outcomes the expected value averages away.

use rayon::prelude::*;

use crate::config::GameConfig;
use crate::models::{BeliefGrid, Heatmap};
use crate::risk::monte_carlo::MonteCarloSample;

/// Realized strike value of one sample at one center.
fn simulated_strike_value(
    sample: &MonteCarloSample,
    grid: &BeliefGrid,
    x: usize,
    y: usize,
    radius: usize,
    config: &GameConfig,
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
            let (nx, ny) = (nx as usize, ny as usize);
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            if sample.hostile[ny][nx] {
                value += config.hostile_value;
            }
            if sample.infra[ny][nx] {
                value -= config.infra_penalty;
            }
        }
    }
    value - config.strike_cost
}

/// Build a heatmap by scoring the weighted value distribution at every cell.
fn distribution_heatmap<F>(
    grid: &BeliefGrid,
    samples: &[MonteCarloSample],
    radius: usize,
    config: &GameConfig,
    score: F,
) -> Heatmap
where
    F: Fn(&mut Vec<(f64, f64)>) -> f64 + Sync,
{
    (0..grid.height())
        .into_par_iter()
        .map(|y| {
            (0..grid.width())
                .map(|x| {
                    let mut values: Vec<(f64, f64)> = samples
                        .iter()
                        .map(|sample| {
                            (
                                simulated_strike_value(sample, grid, x, y, radius, config),
                                sample.likelihood,
                            )
                        })
                        .collect();
                    if values.is_empty() {
                        0.0
                    } else {
                        score(&mut values)
                    }
                })
                .collect()
        })
        .collect()
}

/// CVaR-style risk-adjusted value: the weighted mean of the worst
/// `cvar_tail` fraction of simulated strike values.
pub fn risk_averse_heatmap(
    grid: &BeliefGrid,
    samples: &[MonteCarloSample],
    radius: usize,
    config: &GameConfig,
    cvar_tail: f64,
) -> Heatmap {
    let tail = cvar_tail.clamp(0.0, 1.0).max(f64::MIN_POSITIVE);
    distribution_heatmap(grid, samples, radius, config, move |values| {
        values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let total_weight: f64 = values.iter().map(|(_, w)| w).sum();
        let target = total_weight * tail;

        let mut accumulated = 0.0;
        let mut weighted_sum = 0.0;
        for &(value, weight) in values.iter() {
            // Include only as much of this sample's weight as the tail allows.
            let take = weight.min(target - accumulated);
            if take <= 0.0 {
                break;
            }
            weighted_sum += value * take;
            accumulated += take;
        }
        if accumulated > 0.0 {
            weighted_sum / accumulated
        } else {
            0.0
        }
    })
}

/// Weighted sample variance of the simulated strike value.
pub fn variance_heatmap(
    grid: &BeliefGrid,
    samples: &[MonteCarloSample],
    radius: usize,
    config: &GameConfig,
) -> Heatmap {
    distribution_heatmap(grid, samples, radius, config, |values| {
        let total_weight: f64 = values.iter().map(|(_, w)| w).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let mean: f64 =
            values.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight;
        let variance: f64 = values
            .iter()
            .map(|(v, w)| w * (v - mean) * (v - mean))
            .sum::<f64>()
            / total_weight;
        variance
    })
}

/// Probability that the simulated strike value is negative.
pub fn loss_risk_heatmap(
    grid: &BeliefGrid,
    samples: &[MonteCarloSample],
    radius: usize,
    config: &GameConfig,
) -> Heatmap {
    distribution_heatmap(grid, samples, radius, config, |values| {
        let total_weight: f64 = values.iter().map(|(_, w)| w).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let losing: f64 = values
            .iter()
            .filter(|(v, _)| *v < 0.0)
            .map(|(_, w)| w)
            .sum();
        losing / total_weight
    })
}
