//! Monte-Carlo Risk Analysis
//!
//! This module provides:
//! - Joint Monte-Carlo realizations of the hidden grid state
//! - Risk-adjusted (CVaR), variance and loss-probability heatmaps
//! - Composite policy recommendations (greedy EV, risk-averse, recon VOI)

pub mod heatmaps;
pub mod monte_carlo;
pub mod policy;

pub use heatmaps::{loss_risk_heatmap, risk_averse_heatmap, variance_heatmap};
pub use monte_carlo::{monte_carlo_samples, MonteCarloSample, SamplingError};
pub use policy::{
    policy_recommendations, PolicyAlternative, PolicyRecommendation, PolicySet,
    RecommendedAction,
};
