//! Engine data model
//!
//! Plain, JSON-serializable records exchanged with the orchestration layer:
//! cells with their recon history, the belief grid, and numeric heatmaps.

pub mod cell;
pub mod grid;
pub mod heatmap;

pub use cell::{Cell, ReconResult};
pub use grid::BeliefGrid;
pub use heatmap::{argmax, summarize, top_k, zeros, Heatmap, HeatmapSummary};
