use serde::{Deserialize, Serialize};

use crate::sensor::SensorType;

/// One entry of a cell's reconnaissance history.
///
/// Records the full audit trail of a reading: the rates actually in effect,
/// and the prior/posterior pair the Bayesian update moved between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconResult {
    pub sensor: SensorType,
    pub outcome: bool,
    pub effective_tpr: f64,
    pub effective_fpr: f64,
    /// Discriminative power of the reading, `effective_tpr - effective_fpr`.
    pub confidence: f64,
    pub turn: u32,
    pub prior: f64,
    pub posterior: f64,
}

/// One grid cell.
///
/// Truth flags and priors are written once at generation; `posterior` is
/// mutated only by belief updates; `recon_history` is append-only and never
/// truncated or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub hostile_truth: bool,
    pub infra_truth: bool,
    pub posterior: f64,
    pub hostile_prior: f64,
    pub infra_prior: f64,
    pub recon_history: Vec<ReconResult>,
}

impl Cell {
    pub fn new(
        x: usize,
        y: usize,
        hostile_truth: bool,
        infra_truth: bool,
        hostile_prior: f64,
        infra_prior: f64,
    ) -> Self {
        Self {
            x,
            y,
            hostile_truth,
            infra_truth,
            // Belief starts at the epistemic prior.
            posterior: hostile_prior,
            hostile_prior,
            infra_prior,
            recon_history: Vec::new(),
        }
    }

    /// How many times this cell has been observed.
    pub fn observation_count(&self) -> usize {
        self.recon_history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_starts_at_prior() {
        let cell = Cell::new(2, 3, false, true, 0.3, 0.1);
        assert!((cell.posterior - 0.3).abs() < 1e-12);
        assert_eq!(cell.observation_count(), 0);
        assert!(cell.infra_truth);
    }

    #[test]
    fn test_cell_json_round_trip() {
        let mut cell = Cell::new(1, 1, true, false, 0.4, 0.2);
        cell.recon_history.push(ReconResult {
            sensor: SensorType::Drone,
            outcome: true,
            effective_tpr: 0.8,
            effective_fpr: 0.1,
            confidence: 0.7,
            turn: 4,
            prior: 0.4,
            posterior: 0.84,
        });
        let json = serde_json::to_string(&cell).unwrap();
        let back: Cell = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recon_history.len(), 1);
        assert_eq!(back.recon_history[0].turn, 4);
    }
}
