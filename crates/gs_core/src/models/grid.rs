use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::field::TruthField;
use crate::models::cell::Cell;
use crate::models::heatmap::Heatmap;

/// The belief grid: one [`Cell`] per coordinate, row-major.
///
/// Owned by the orchestration layer. Heatmap and Monte-Carlo operations only
/// borrow it immutably; the explicit belief/strike entry points are the sole
/// mutators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl BeliefGrid {
    /// Build the starting grid from a generated truth field.
    pub fn from_truth(field: &TruthField) -> Self {
        let (width, height) = (field.width(), field.height());
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let i = y * width + x;
                cells.push(Cell::new(
                    x,
                    y,
                    field.hostile_truth()[i],
                    field.infra_truth()[i],
                    field.hostile_priors()[i],
                    field.infra_priors()[i],
                ));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a uniform grid with no hostiles or infrastructure on the ground.
    ///
    /// Used for controlled scenarios and benchmarks.
    pub fn uniform(
        width: usize,
        height: usize,
        posterior: f64,
        infra_prior: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y, false, false, posterior, infra_prior));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let i = y * self.width + x;
            self.cells.get_mut(i)
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Current posterior belief as a heatmap.
    pub fn posterior_heatmap(&self) -> Heatmap {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cells[y * self.width + x].posterior)
                    .collect()
            })
            .collect()
    }
}
