//! Sensor Simulation
//!
//! This module provides:
//! - Sensor catalog with nominal true/false positive rates and cost factors
//! - Deterministic per-cell environment context (terrain class, occlusion)
//! - Context-adjusted effective sensor performance
//! - Seeded simulation of noisy binary readings
//!
//! Context derivation is keyed by `(seed, CELL_CONTEXT, x, y)` and reading
//! simulation by `(seed, SENSOR_DRAW, turn, x, y, sensor)`, so replaying the
//! same action sequence with the same seed reproduces identical observations.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::deterministic::{stream, substream};

/// Available reconnaissance sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    /// Optical drone pass - sharp eyes, blind through cover.
    Drone,
    /// Ground surveillance radar - steady, struggles with clutter.
    GroundRadar,
    /// Signals intercept - ignores terrain, noisy baseline.
    Sigint,
}

impl SensorType {
    /// All sensors in catalog order.
    pub const ALL: [SensorType; 3] = [
        SensorType::Drone,
        SensorType::GroundRadar,
        SensorType::Sigint,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            SensorType::Drone => "drone",
            SensorType::GroundRadar => "ground_radar",
            SensorType::Sigint => "sigint",
        }
    }

    /// Detection rate over a present target in a clear, open cell.
    pub fn nominal_tpr(&self) -> f64 {
        match self {
            SensorType::Drone => 0.85,
            SensorType::GroundRadar => 0.75,
            SensorType::Sigint => 0.65,
        }
    }

    /// False alarm rate over an empty cell in clear conditions.
    pub fn nominal_fpr(&self) -> f64 {
        match self {
            SensorType::Drone => 0.08,
            SensorType::GroundRadar => 0.15,
            SensorType::Sigint => 0.25,
        }
    }

    /// Cost multiplier applied to the base recon cost.
    pub fn cost_multiplier(&self) -> f64 {
        match self {
            SensorType::Drone => 1.0,
            SensorType::GroundRadar => 0.6,
            SensorType::Sigint => 1.4,
        }
    }

    /// How strongly occlusion degrades this sensor's detection rate.
    fn occlusion_sensitivity(&self) -> f64 {
        match self {
            SensorType::Drone => 0.8,
            SensorType::GroundRadar => 0.5,
            SensorType::Sigint => 0.1,
        }
    }

    /// How strongly terrain clutter inflates this sensor's false alarms.
    fn clutter_sensitivity(&self) -> f64 {
        match self {
            SensorType::Drone => 0.3,
            SensorType::GroundRadar => 0.9,
            SensorType::Sigint => 0.6,
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            SensorType::Drone => "Optical drone pass: high detection, low false alarms, heavily occluded by cover",
            SensorType::GroundRadar => "Ground surveillance radar: cheap and steady, clutter-prone in built-up terrain",
            SensorType::Sigint => "Signals intercept: indifferent to terrain, noisy baseline, expensive",
        }
    }
}

/// Terrain class of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Open,
    Forest,
    Urban,
    Ridge,
}

impl TerrainClass {
    pub fn name(&self) -> &'static str {
        match self {
            TerrainClass::Open => "open",
            TerrainClass::Forest => "forest",
            TerrainClass::Urban => "urban",
            TerrainClass::Ridge => "ridge",
        }
    }

    /// Clutter level feeding false alarm inflation.
    pub fn clutter(&self) -> f64 {
        match self {
            TerrainClass::Open => 0.05,
            TerrainClass::Forest => 0.35,
            TerrainClass::Urban => 0.70,
            TerrainClass::Ridge => 0.25,
        }
    }

    /// Baseline occlusion contributed by the terrain itself.
    fn occlusion_bias(&self) -> f64 {
        match self {
            TerrainClass::Open => 0.0,
            TerrainClass::Forest => 0.30,
            TerrainClass::Urban => 0.25,
            TerrainClass::Ridge => 0.45,
        }
    }
}

/// Deterministic environmental context of one cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellContext {
    pub terrain: TerrainClass,
    /// Fraction of the cell hidden from overhead/lateral observation, in [0, 0.9].
    pub occlusion: f64,
}

impl CellContext {
    pub fn summary(&self) -> String {
        format!(
            "{} terrain, {:.0}% occluded",
            self.terrain.name(),
            self.occlusion * 100.0
        )
    }
}

/// Derive the context of cell `(x, y)` from the scenario seed.
///
/// Interior cells pick up extra occlusion relative to the map edge, so the
/// middle of the grid is consistently harder to observe than the fringes.
pub fn context(x: usize, y: usize, width: usize, height: usize, seed: u64) -> CellContext {
    let mut rng = substream(seed, stream::CELL_CONTEXT, &[x as u64, y as u64]);

    let terrain = match rng.gen_range(0u32..100) {
        0..=39 => TerrainClass::Open,
        40..=64 => TerrainClass::Forest,
        65..=84 => TerrainClass::Urban,
        _ => TerrainClass::Ridge,
    };

    let edge_x = x.min(width.saturating_sub(1).saturating_sub(x));
    let edge_y = y.min(height.saturating_sub(1).saturating_sub(y));
    let half_span = (width.min(height) as f64 / 2.0).max(1.0);
    let interior = (edge_x.min(edge_y) as f64 / half_span).min(1.0);

    let occlusion =
        (rng.gen_range(0.0..0.4) + terrain.occlusion_bias() + 0.1 * interior).clamp(0.0, 0.9);

    CellContext { terrain, occlusion }
}

/// Effective sensor performance in a specific context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorPerformance {
    pub effective_tpr: f64,
    pub effective_fpr: f64,
    pub effective_cost: f64,
    pub summary: String,
}

/// Adjust nominal sensor rates and cost by cell context.
///
/// The effective detection rate is always kept strictly above the effective
/// false alarm rate, so a reading is never anti-informative.
pub fn performance(sensor: SensorType, context: &CellContext, base_cost: f64) -> SensorPerformance {
    let degraded_tpr =
        sensor.nominal_tpr() * (1.0 - sensor.occlusion_sensitivity() * context.occlusion);
    let effective_fpr = (sensor.nominal_fpr()
        * (1.0 + sensor.clutter_sensitivity() * context.terrain.clutter()))
    .min(0.45);
    let effective_tpr = degraded_tpr.clamp(effective_fpr + 0.05, 0.99);
    let effective_cost =
        base_cost * sensor.cost_multiplier() * (1.0 + 0.5 * context.occlusion);

    SensorPerformance {
        effective_tpr,
        effective_fpr,
        effective_cost,
        summary: format!(
            "{} over {}: TPR {:.2}, FPR {:.2}, cost {:.1}",
            sensor.name(),
            context.summary(),
            effective_tpr,
            effective_fpr,
            effective_cost
        ),
    }
}

/// One simulated binary sensor reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor: SensorType,
    pub outcome: bool,
    /// Detection rate actually in effect when the reading was taken.
    pub effective_tpr: f64,
    /// False alarm rate actually in effect when the reading was taken.
    pub effective_fpr: f64,
}

/// Simulate one reading of cell `(x, y)` on the given turn.
///
/// The draw comes from the `(seed, SENSOR_DRAW, turn, x, y, sensor)` stream:
/// the same action on the same turn always observes the same outcome.
pub fn simulate(
    sensor: SensorType,
    true_state: bool,
    context: &CellContext,
    seed: u64,
    turn: u32,
    x: usize,
    y: usize,
) -> SensorReading {
    let perf = performance(sensor, context, 1.0);
    let mut rng = substream(
        seed,
        stream::SENSOR_DRAW,
        &[turn as u64, x as u64, y as u64, sensor as u64],
    );
    let hit_probability = if true_state {
        perf.effective_tpr
    } else {
        perf.effective_fpr
    };
    let outcome = rng.gen::<f64>() < hit_probability;

    SensorReading {
        sensor,
        outcome,
        effective_tpr: perf.effective_tpr,
        effective_fpr: perf.effective_fpr,
    }
}
