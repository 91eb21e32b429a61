//! Ground-truth field generation
//!
//! This module provides:
//! - TruthField: the generated probability fields, sampled truth and priors
//! - SpatialFieldGenerator: seeded, spatially smoothed field construction

pub mod generator;

pub use generator::{SpatialFieldGenerator, TruthField};
