//! Joint Monte-Carlo draws of the hidden grid state.
//!
//! Each realization samples every cell's hostile and infrastructure state
//! from the current beliefs. Draws come from per-sample substreams, so a
//! rayon batch and a serial loop produce bit-identical output and any prefix
//! of the samples is reproducible on its own.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::belief::clamp_probability;
use crate::config::MonteCarloConfig;
use crate::deterministic::{stream, substream};
use crate::error::CoreError;
use crate::field::generator::smooth;
use crate::models::BeliefGrid;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("invalid Monte-Carlo configuration: {0}")]
    InvalidConfig(#[from] CoreError),
}

/// One joint draw of the whole grid, `[y][x]` shaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSample {
    pub hostile: Vec<Vec<bool>>,
    pub infra: Vec<Vec<bool>>,
    /// Importance weight in `(0, 1]`; exactly 1.0 without importance sampling.
    pub likelihood: f64,
}

/// Draw `num_samples` joint realizations from the current beliefs.
///
/// Cells are drawn independently unless `spatial_correlation` is set, in
/// which case a shared smoothed Gaussian field is thresholded at each cell's
/// probability (Gaussian copula), which preserves marginals while tying
/// neighbors together. Importance sampling tilts draw probabilities toward
/// 0.5 and attaches self-normalized weights.
pub fn monte_carlo_samples(
    grid: &BeliefGrid,
    config: &MonteCarloConfig,
) -> Result<Vec<MonteCarloSample>, SamplingError> {
    config.validate()?;

    log::debug!(
        "drawing {} Monte-Carlo samples over {}x{} (seed {}, is {}, corr {:?})",
        config.num_samples,
        grid.width(),
        grid.height(),
        config.seed,
        config.use_importance_sampling,
        config.spatial_correlation
    );

    let mut draws: Vec<(MonteCarloSample, f64)> = (0..config.num_samples as u64)
        .into_par_iter()
        .map(|index| draw_sample(grid, config, index))
        .collect();

    if config.use_importance_sampling {
        // Self-normalize in log space so long products never underflow.
        let max_log = draws
            .iter()
            .map(|(_, log_w)| *log_w)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for (sample, log_w) in &mut draws {
            sample.likelihood = (*log_w - max_log).exp();
            total += sample.likelihood;
        }
        for (sample, _) in &mut draws {
            sample.likelihood /= total;
        }
    }

    Ok(draws.into_iter().map(|(sample, _)| sample).collect())
}

/// Draw one realization; returns the sample and its raw log weight.
fn draw_sample(
    grid: &BeliefGrid,
    config: &MonteCarloConfig,
    index: u64,
) -> (MonteCarloSample, f64) {
    let width = grid.width();
    let height = grid.height();

    // With spatial correlation, a shared smoothed standard-normal field per
    // layer replaces the per-cell uniform draws.
    let copula = config.spatial_correlation.map(|sigma| {
        let mut rng = substream(config.seed, stream::MC_CORRELATION, &[index]);
        let mut hostile_z: Vec<f64> = (0..width * height).map(|_| standard_normal(&mut rng)).collect();
        let mut infra_z: Vec<f64> = (0..width * height).map(|_| standard_normal(&mut rng)).collect();
        smooth(&mut hostile_z, width, height, sigma);
        smooth(&mut infra_z, width, height, sigma);
        (hostile_z, infra_z)
    });

    let mut rng = substream(config.seed, stream::MC_SAMPLE, &[index]);
    let mut log_weight = 0.0;

    let mut hostile = vec![vec![false; width]; height];
    let mut infra = vec![vec![false; width]; height];

    for y in 0..height {
        for x in 0..width {
            let cell = match grid.get(x, y) {
                Some(cell) => cell,
                None => continue,
            };

            let uniform_pair = match &copula {
                Some((hostile_z, infra_z)) => {
                    let i = y * width + x;
                    (
                        standard_normal_cdf(hostile_z[i]),
                        standard_normal_cdf(infra_z[i]),
                    )
                }
                None => (rng.gen::<f64>(), rng.gen::<f64>()),
            };

            let (hostile_state, hostile_log_w) = draw_state(
                cell.posterior,
                uniform_pair.0,
                config.use_importance_sampling,
            );
            let (infra_state, infra_log_w) = draw_state(
                cell.infra_prior,
                uniform_pair.1,
                config.use_importance_sampling,
            );
            hostile[y][x] = hostile_state;
            infra[y][x] = infra_state;
            log_weight += hostile_log_w + infra_log_w;
        }
    }

    (
        MonteCarloSample {
            hostile,
            infra,
            likelihood: 1.0,
        },
        log_weight,
    )
}

/// Threshold one uniform draw at the (possibly tilted) cell probability.
///
/// Returns the drawn state and the log likelihood ratio `target / proposal`
/// of the draw, which is 0 when no tilt is applied.
#[inline]
fn draw_state(probability: f64, uniform: f64, tilt: bool) -> (bool, f64) {
    if !tilt {
        return (uniform < probability, 0.0);
    }
    let p = clamp_probability(probability);
    // Mixture tilt toward 0.5 keeps the proposal inside [0.25, 0.75], so the
    // ratio never degenerates.
    let q = (p + 0.5) / 2.0;
    let state = uniform < q;
    let log_w = if state {
        (p / q).ln()
    } else {
        ((1.0 - p) / (1.0 - q)).ln()
    };
    (state, log_w)
}

#[inline]
fn standard_normal(rng: &mut impl Rng) -> f64 {
    rand_distr::Distribution::sample(&rand_distr::StandardNormal, rng)
}

/// Standard normal CDF via the Abramowitz-Stegun 7.1.26 erf approximation
/// (absolute error below 1.5e-7).
fn standard_normal_cdf(z: f64) -> f64 {
    let x = z / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + 0.3275911 * x.abs());
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let erf = 1.0 - poly * (-x * x).exp();
    let signed = if x < 0.0 { -erf } else { erf };
    0.5 * (1.0 + signed)
}
