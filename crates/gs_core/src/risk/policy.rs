//! Composite policy recommendations.
//!
//! Three independent recommenders score the same belief grid: greedy
//! expected value, variance-penalized (risk-averse) value, and recon value
//! of information. Each picks the affordable argmax of its heatmap and
//! reports runner-up alternatives so the orchestration layer can show why
//! the top pick won.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, MonteCarloConfig};
use crate::decision::{ev_heatmap, voi_heatmap};
use crate::models::{self, BeliefGrid, Heatmap};
use crate::risk::heatmaps::variance_heatmap;
use crate::risk::monte_carlo::{monte_carlo_samples, SamplingError};
use crate::sensor::{self, SensorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Strike,
    Recon,
    Wait,
}

/// Runner-up location of a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyAlternative {
    pub x: usize,
    pub y: usize,
    pub value: f64,
}

/// One policy's advice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecommendation {
    pub action: RecommendedAction,
    pub x: usize,
    pub y: usize,
    pub sensor: Option<SensorType>,
    /// The recommending heatmap's value at the chosen cell.
    pub value: f64,
    pub confidence: f64,
    pub reasoning: String,
    pub alternatives: Vec<PolicyAlternative>,
}

/// Advice from all three policies over the same grid snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySet {
    pub greedy_ev: PolicyRecommendation,
    pub risk_averse: PolicyRecommendation,
    pub recon_voi: PolicyRecommendation,
}

/// Number of runner-up alternatives reported per policy.
const NUM_ALTERNATIVES: usize = 2;

/// Compute all three recommendations against the current beliefs.
///
/// Pure with respect to the grid; the Monte-Carlo batch behind the
/// risk-averse policy comes from the explicit `mc` configuration.
#[allow(clippy::too_many_arguments)]
pub fn policy_recommendations(
    grid: &BeliefGrid,
    config: &GameConfig,
    mc: &MonteCarloConfig,
    budget: f64,
    turn: u32,
    sensor: SensorType,
    risk_aversion: f64,
    radius: usize,
) -> Result<PolicySet, SamplingError> {
    let ev_map = ev_heatmap(grid, radius, config);

    let samples = monte_carlo_samples(grid, mc)?;
    let variance_map = variance_heatmap(grid, &samples, radius, config);
    let adjusted_map: Heatmap = ev_map
        .iter()
        .zip(&variance_map)
        .map(|(ev_row, var_row)| {
            ev_row
                .iter()
                .zip(var_row)
                .map(|(ev, var)| ev - risk_aversion * var)
                .collect()
        })
        .collect();

    let voi_map = voi_heatmap(grid, sensor, config, radius, config.seed);

    let greedy_ev = strike_recommendation(
        grid,
        &ev_map,
        config,
        budget,
        turn,
        "greedy EV",
    );
    let risk_averse = strike_recommendation(
        grid,
        &adjusted_map,
        config,
        budget,
        turn,
        "risk-averse EV",
    );
    let recon_voi = recon_recommendation(grid, &voi_map, config, budget, turn, sensor);

    Ok(PolicySet {
        greedy_ev,
        risk_averse,
        recon_voi,
    })
}

fn strike_recommendation(
    grid: &BeliefGrid,
    map: &Heatmap,
    config: &GameConfig,
    budget: f64,
    turn: u32,
    policy_name: &str,
) -> PolicyRecommendation {
    let Some((x, y, value)) = models::argmax(map) else {
        return wait_recommendation(0, 0, 0.0, format!("{}: empty grid", policy_name));
    };
    let alternatives = runner_ups(map);
    let posterior = grid.get(x, y).map(|cell| cell.posterior).unwrap_or(0.5);
    let confidence = (2.0 * posterior - 1.0).abs();

    if value <= 0.0 {
        return PolicyRecommendation {
            action: RecommendedAction::Wait,
            x,
            y,
            sensor: None,
            value,
            confidence,
            reasoning: format!(
                "turn {}: {} peaks at ({}, {}) with value {:.1}; no strike is worth taking",
                turn, policy_name, x, y, value
            ),
            alternatives,
        };
    }
    if config.strike_cost > budget {
        return PolicyRecommendation {
            action: RecommendedAction::Wait,
            x,
            y,
            sensor: None,
            value,
            confidence,
            reasoning: format!(
                "turn {}: {} favors ({}, {}) at {:.1} but strike cost {:.1} exceeds budget {:.1}",
                turn, policy_name, x, y, value, config.strike_cost, budget
            ),
            alternatives,
        };
    }

    PolicyRecommendation {
        action: RecommendedAction::Strike,
        x,
        y,
        sensor: None,
        value,
        confidence,
        reasoning: format!(
            "turn {}: {} peaks at ({}, {}) with value {:.1} (belief {:.2})",
            turn, policy_name, x, y, value, posterior
        ),
        alternatives,
    }
}

fn recon_recommendation(
    grid: &BeliefGrid,
    voi_map: &Heatmap,
    config: &GameConfig,
    budget: f64,
    turn: u32,
    sensor: SensorType,
) -> PolicyRecommendation {
    let Some((x, y, value)) = models::argmax(voi_map) else {
        return wait_recommendation(0, 0, 0.0, "recon VOI: empty grid".to_string());
    };
    let alternatives = runner_ups(voi_map);
    let posterior = grid.get(x, y).map(|cell| cell.posterior).unwrap_or(0.5);
    // Recon pays off where belief is undecided.
    let confidence = 1.0 - (2.0 * posterior - 1.0).abs();

    let context = sensor::context(x, y, grid.width(), grid.height(), config.seed);
    let cost = sensor::performance(sensor, &context, config.recon_cost).effective_cost;

    if value <= 0.0 {
        return wait_recommendation(
            x,
            y,
            value,
            format!(
                "turn {}: no cell offers information value through {}",
                turn,
                sensor.name()
            ),
        );
    }
    if cost > budget {
        return wait_recommendation(
            x,
            y,
            value,
            format!(
                "turn {}: recon at ({}, {}) worth {:.1} but {} cost {:.1} exceeds budget {:.1}",
                turn,
                x,
                y,
                value,
                sensor.name(),
                cost,
                budget
            ),
        );
    }

    PolicyRecommendation {
        action: RecommendedAction::Recon,
        x,
        y,
        sensor: Some(sensor),
        value,
        confidence,
        reasoning: format!(
            "turn {}: {} read of ({}, {}) is worth {:.1} against cost {:.1} (belief {:.2})",
            turn,
            sensor.name(),
            x,
            y,
            value,
            cost,
            posterior
        ),
        alternatives,
    }
}

fn wait_recommendation(
    x: usize,
    y: usize,
    value: f64,
    reasoning: String,
) -> PolicyRecommendation {
    PolicyRecommendation {
        action: RecommendedAction::Wait,
        x,
        y,
        sensor: None,
        value,
        confidence: 0.0,
        reasoning,
        alternatives: Vec::new(),
    }
}

fn runner_ups(map: &Heatmap) -> Vec<PolicyAlternative> {
    models::top_k(map, NUM_ALTERNATIVES + 1)
        .into_iter()
        .skip(1)
        .map(|(x, y, value)| PolicyAlternative { x, y, value })
        .collect()
}
