//! Strike Decision Analysis
//!
//! This module provides:
//! - Strike expected value and collateral-risk computation
//! - Structured strike validation (allow / confirm / deny, never an exception)
//! - Strike execution against ground truth (the only truth reader)
//! - Full-grid expected-value and value-of-information heatmaps

pub mod strike;
pub mod voi;

pub use strike::{
    ev_heatmap, execute_strike, strike_ev, validate_strike, StrikeOutcome, StrikeReport,
    StrikeValidation,
};
pub use voi::{voi, voi_heatmap};
