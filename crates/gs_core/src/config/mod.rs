//! Engine Configuration
//!
//! Every numeric knob of the engine lives here, externally supplied and
//! validated up front. The transform constants (smoothing, logistic shape,
//! Beta priors) are configuration, not hidden defaults baked into logic.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Parameters of the spatially correlated ground-truth field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialFieldConfig {
    /// Standard deviation of the per-cell Gaussian noise layer (default: 1.0)
    pub noise_scale: f64,
    /// Gaussian smoothing width in cells; 0 disables smoothing (default: 1.5)
    pub smoothing_sigma: f64,
    /// Steepness of the logistic transform from noise to probability (default: 2.2)
    pub logistic_steepness: f64,
    /// Grid-wide base rate of hostile presence (default: 0.22)
    pub hostile_base_rate: f64,
    /// Grid-wide base rate of infrastructure presence (default: 0.12)
    pub infra_base_rate: f64,
}

impl Default for SpatialFieldConfig {
    fn default() -> Self {
        Self {
            noise_scale: 1.0,
            smoothing_sigma: 1.5,
            logistic_steepness: 2.2,
            hostile_base_rate: 0.22,
            infra_base_rate: 0.12,
        }
    }
}

impl SpatialFieldConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("noise_scale", self.noise_scale)?;
        if self.noise_scale <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "noise_scale must be positive, got {}",
                self.noise_scale
            )));
        }
        ensure_finite("smoothing_sigma", self.smoothing_sigma)?;
        if self.smoothing_sigma < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "smoothing_sigma must be non-negative, got {}",
                self.smoothing_sigma
            )));
        }
        ensure_finite("logistic_steepness", self.logistic_steepness)?;
        if self.logistic_steepness <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "logistic_steepness must be positive, got {}",
                self.logistic_steepness
            )));
        }
        ensure_open_unit("hostile_base_rate", self.hostile_base_rate)?;
        ensure_open_unit("infra_base_rate", self.infra_base_rate)?;
        Ok(())
    }
}

/// Beta-distribution shape parameters for the per-cell epistemic priors.
///
/// Priors are drawn from these distributions, not copied from the generative
/// field: the belief system starts out uncertain about the true layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetaPriorConfig {
    /// Alpha of the hostile prior Beta distribution (default: 2.0)
    pub hostile_alpha: f64,
    /// Beta of the hostile prior Beta distribution (default: 5.0)
    pub hostile_beta: f64,
    /// Alpha of the infrastructure prior Beta distribution (default: 1.5)
    pub infra_alpha: f64,
    /// Beta of the infrastructure prior Beta distribution (default: 8.0)
    pub infra_beta: f64,
}

impl Default for BetaPriorConfig {
    fn default() -> Self {
        Self {
            hostile_alpha: 2.0,
            hostile_beta: 5.0,
            infra_alpha: 1.5,
            infra_beta: 8.0,
        }
    }
}

impl BetaPriorConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("hostile_alpha", self.hostile_alpha),
            ("hostile_beta", self.hostile_beta),
            ("infra_alpha", self.infra_alpha),
            ("infra_beta", self.infra_beta),
        ] {
            ensure_finite(name, value)?;
            if value <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Spatial belief diffusion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffusionConfig {
    /// Euclidean neighborhood radius in cells; 0 disables diffusion (default: 2.0)
    pub radius: f64,
    /// Fraction of the center update propagated to a zero-distance neighbor,
    /// applied as an odds exponent (default: 0.35)
    pub neighbor_fraction: f64,
    /// Gaussian distance falloff width in cells (default: 1.2)
    pub falloff: f64,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            neighbor_fraction: 0.35,
            falloff: 1.2,
        }
    }
}

impl DiffusionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("radius", self.radius)?;
        if self.radius < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "diffusion radius must be non-negative, got {}",
                self.radius
            )));
        }
        ensure_finite("neighbor_fraction", self.neighbor_fraction)?;
        if !(0.0..1.0).contains(&self.neighbor_fraction) {
            return Err(CoreError::InvalidConfig(format!(
                "neighbor_fraction must be in [0, 1), got {}",
                self.neighbor_fraction
            )));
        }
        ensure_finite("falloff", self.falloff)?;
        if self.falloff <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "falloff must be positive, got {}",
                self.falloff
            )));
        }
        Ok(())
    }
}

/// Strike validation thresholds beyond the raw collateral limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Width of the borderline band below the collateral threshold, as a
    /// fraction of the threshold; hits inside the band require confirmation
    /// (default: 0.2)
    pub confirm_band: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self { confirm_band: 0.2 }
    }
}

impl DecisionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("confirm_band", self.confirm_band)?;
        if !(0.0..1.0).contains(&self.confirm_band) {
            return Err(CoreError::InvalidConfig(format!(
                "confirm_band must be in [0, 1), got {}",
                self.confirm_band
            )));
        }
        Ok(())
    }
}

/// Monte-Carlo sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of joint grid realizations to draw (default: 500)
    pub num_samples: usize,
    /// Seed of the sampling streams; independent of the game seed so analysis
    /// runs can be re-rolled without touching the world (default: 0)
    pub seed: u64,
    /// Tilt draws toward 0.5 and attach self-normalized likelihood weights
    /// (default: false)
    pub use_importance_sampling: bool,
    /// Gaussian-copula correlation width in cells; None draws cells
    /// independently (default: None)
    pub spatial_correlation: Option<f64>,
    /// Worst-tail fraction used by the CVaR heatmap (default: 0.2)
    pub cvar_tail: f64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_samples: 500,
            seed: 0,
            use_importance_sampling: false,
            spatial_correlation: None,
            cvar_tail: 0.2,
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_samples == 0 {
            return Err(CoreError::InvalidConfig(
                "num_samples must be at least 1".to_string(),
            ));
        }
        if let Some(width) = self.spatial_correlation {
            ensure_finite("spatial_correlation", width)?;
            if width <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "spatial_correlation width must be positive, got {}",
                    width
                )));
            }
        }
        ensure_finite("cvar_tail", self.cvar_tail)?;
        if !(0.0..=1.0).contains(&self.cvar_tail) || self.cvar_tail == 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "cvar_tail must be in (0, 1], got {}",
                self.cvar_tail
            )));
        }
        Ok(())
    }
}

/// Scenario configuration handed in by the orchestration layer.
///
/// Read-only to the engine; `validate()` is the single fail-fast gate, after
/// which every numeric degeneracy downstream is clamped instead of raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid width in cells (default: 16)
    pub width: usize,
    /// Grid height in cells (default: 16)
    pub height: usize,
    /// Flat cost of one strike (default: 50.0)
    pub strike_cost: f64,
    /// Base cost of one recon action before sensor/context multipliers
    /// (default: 10.0)
    pub recon_cost: f64,
    /// Reward per hostile eliminated / per unit of hostile belief (default: 100.0)
    pub hostile_value: f64,
    /// Penalty per infrastructure cell hit (default: 200.0)
    pub infra_penalty: f64,
    /// Maximum acceptable probability of hitting any infrastructure
    /// (default: 0.5)
    pub collateral_threshold: f64,
    /// Variance penalty coefficient of the risk-averse policy (default: 0.01)
    pub risk_aversion: f64,
    /// Scenario seed; every stream in the engine derives from it (default: 0)
    pub seed: u64,
    /// Ground-truth field generation parameters
    pub spatial: SpatialFieldConfig,
    /// Epistemic prior distribution parameters
    pub beta_priors: BetaPriorConfig,
    /// Belief diffusion parameters
    pub diffusion: DiffusionConfig,
    /// Strike validation parameters
    pub decision: DecisionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            strike_cost: 50.0,
            recon_cost: 10.0,
            hostile_value: 100.0,
            infra_penalty: 200.0,
            collateral_threshold: 0.5,
            risk_aversion: 0.01,
            seed: 0,
            spatial: SpatialFieldConfig::default(),
            beta_priors: BetaPriorConfig::default(),
            diffusion: DiffusionConfig::default(),
            decision: DecisionConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, value) in [
            ("strike_cost", self.strike_cost),
            ("recon_cost", self.recon_cost),
            ("hostile_value", self.hostile_value),
            ("infra_penalty", self.infra_penalty),
            ("risk_aversion", self.risk_aversion),
        ] {
            ensure_finite(name, value)?;
            if value < 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        ensure_finite("collateral_threshold", self.collateral_threshold)?;
        if !(0.0..=1.0).contains(&self.collateral_threshold) {
            return Err(CoreError::InvalidConfig(format!(
                "collateral_threshold must be in [0, 1], got {}",
                self.collateral_threshold
            )));
        }
        self.spatial.validate()?;
        self.beta_priors.validate()?;
        self.diffusion.validate()?;
        self.decision.validate()?;
        Ok(())
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidParameter(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

fn ensure_open_unit(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidConfig(format!(
            "{} must be strictly between 0 and 1, got {}",
            name, value
        )))
    }
}
