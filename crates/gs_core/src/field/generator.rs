//! Seeded generation of the spatially correlated ground truth.
//!
//! Pipeline per layer: independent Gaussian noise per cell → separable
//! Gaussian smoothing (kernel weights L2-normalized so the smoothed layer
//! keeps unit variance per unit of noise scale) → logistic transform centered
//! on the configured base rate → Bernoulli truth sample. The per-cell priors
//! exposed to the belief system come from a Beta distribution on their own
//! streams; they model epistemic uncertainty, not the generative field.

use rand::Rng;
use rand_distr::{Beta, Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::config::{BetaPriorConfig, SpatialFieldConfig};
use crate::deterministic::{stream, substream};
use crate::error::{CoreError, Result};

/// Generated ground truth: probability fields, sampled truth, and priors.
///
/// Immutable after generation; bit-for-bit reproducible from the same seed
/// and configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthField {
    width: usize,
    height: usize,
    hostile_field: Vec<f64>,
    infra_field: Vec<f64>,
    hostile_truth: Vec<bool>,
    infra_truth: Vec<bool>,
    hostile_priors: Vec<f64>,
    infra_priors: Vec<f64>,
}

impl TruthField {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major index of `(x, y)`, or None when out of bounds.
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Generative hostile probability field, row-major.
    pub fn hostile_field(&self) -> &[f64] {
        &self.hostile_field
    }

    /// Generative infrastructure probability field, row-major.
    pub fn infra_field(&self) -> &[f64] {
        &self.infra_field
    }

    /// Sampled hostile presence, row-major.
    pub fn hostile_truth(&self) -> &[bool] {
        &self.hostile_truth
    }

    /// Sampled infrastructure presence, row-major.
    pub fn infra_truth(&self) -> &[bool] {
        &self.infra_truth
    }

    /// Beta-drawn hostile priors, row-major.
    pub fn hostile_priors(&self) -> &[f64] {
        &self.hostile_priors
    }

    /// Beta-drawn infrastructure priors, row-major.
    pub fn infra_priors(&self) -> &[f64] {
        &self.infra_priors
    }
}

/// Deterministic ground-truth generator.
pub struct SpatialFieldGenerator;

impl SpatialFieldGenerator {
    /// Generate the full truth field for a `width x height` grid.
    ///
    /// Identical `(width, height, configs, seed)` produce identical output on
    /// every call and every thread.
    pub fn generate(
        width: usize,
        height: usize,
        spatial: &SpatialFieldConfig,
        priors: &BetaPriorConfig,
        seed: u64,
    ) -> Result<TruthField> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        spatial.validate()?;
        priors.validate()?;

        let hostile_field = probability_layer(
            width,
            height,
            spatial,
            spatial.hostile_base_rate,
            seed,
            stream::FIELD_NOISE_HOSTILE,
        )?;
        let infra_field = probability_layer(
            width,
            height,
            spatial,
            spatial.infra_base_rate,
            seed,
            stream::FIELD_NOISE_INFRA,
        )?;

        let hostile_truth = bernoulli_layer(&hostile_field, seed, stream::TRUTH_HOSTILE);
        let infra_truth = bernoulli_layer(&infra_field, seed, stream::TRUTH_INFRA);

        let hostile_priors = beta_layer(
            width * height,
            priors.hostile_alpha,
            priors.hostile_beta,
            seed,
            stream::PRIOR_HOSTILE,
        )?;
        let infra_priors = beta_layer(
            width * height,
            priors.infra_alpha,
            priors.infra_beta,
            seed,
            stream::PRIOR_INFRA,
        )?;

        log::debug!(
            "generated {}x{} truth field (seed {}): {} hostiles, {} infra",
            width,
            height,
            seed,
            hostile_truth.iter().filter(|&&t| t).count(),
            infra_truth.iter().filter(|&&t| t).count()
        );

        Ok(TruthField {
            width,
            height,
            hostile_field,
            infra_field,
            hostile_truth,
            infra_truth,
            hostile_priors,
            infra_priors,
        })
    }
}

/// Noise → smoothing → logistic, for one layer.
fn probability_layer(
    width: usize,
    height: usize,
    spatial: &SpatialFieldConfig,
    base_rate: f64,
    seed: u64,
    noise_label: u32,
) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, spatial.noise_scale)
        .map_err(|e| CoreError::InvalidConfig(format!("noise distribution: {}", e)))?;
    let mut rng = substream(seed, noise_label, &[]);
    let mut noise: Vec<f64> = (0..width * height).map(|_| normal.sample(&mut rng)).collect();

    if spatial.smoothing_sigma > 0.0 {
        smooth(&mut noise, width, height, spatial.smoothing_sigma);
    }

    let offset = logit(base_rate);
    Ok(noise
        .iter()
        .map(|&z| logistic(spatial.logistic_steepness * z + offset))
        .collect())
}

/// Separable Gaussian smoothing, in place.
///
/// Weights are L2-normalized per position. Each pass combines values that
/// are independent along its axis, so a layer of iid unit-variance noise
/// keeps unit variance everywhere and only gains spatial correlation. The
/// correlated Monte-Carlo sampler relies on this to preserve marginals.
pub(crate) fn smooth(values: &mut [f64], width: usize, height: usize, sigma: f64) {
    let radius = (2.0 * sigma).ceil() as i64;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|d| (-((d * d) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();

    let mut pass = vec![0.0; values.len()];

    // Horizontal pass
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            let mut norm_sq = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let dx = k as i64 - radius;
                let nx = x as i64 + dx;
                if nx < 0 || nx >= width as i64 {
                    continue;
                }
                acc += w * values[y * width + nx as usize];
                norm_sq += w * w;
            }
            pass[y * width + x] = acc / norm_sq.sqrt();
        }
    }

    // Vertical pass
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            let mut norm_sq = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let dy = k as i64 - radius;
                let ny = y as i64 + dy;
                if ny < 0 || ny >= height as i64 {
                    continue;
                }
                acc += w * pass[ny as usize * width + x];
                norm_sq += w * w;
            }
            values[y * width + x] = acc / norm_sq.sqrt();
        }
    }
}

fn bernoulli_layer(field: &[f64], seed: u64, label: u32) -> Vec<bool> {
    let mut rng = substream(seed, label, &[]);
    field.iter().map(|&p| rng.gen::<f64>() < p).collect()
}

fn beta_layer(len: usize, alpha: f64, beta: f64, seed: u64, label: u32) -> Result<Vec<f64>> {
    let dist = Beta::new(alpha, beta)
        .map_err(|e| CoreError::InvalidConfig(format!("beta prior distribution: {}", e)))?;
    let mut rng = substream(seed, label, &[]);
    Ok((0..len).map(|_| dist.sample(&mut rng)).collect())
}

fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn logit(p: f64) -> f64 {
    let clamped = p.clamp(1e-9, 1.0 - 1e-9);
    (clamped / (1.0 - clamped)).ln()
}
