use serde::{Deserialize, Serialize};

/// Full-grid scalar field, indexed `[y][x]`, serialized as plain nested arrays.
pub type Heatmap = Vec<Vec<f64>>;

/// All-zero heatmap of the given shape.
pub fn zeros(width: usize, height: usize) -> Heatmap {
    vec![vec![0.0; width]; height]
}

/// Location and value of the maximum entry, or None for an empty map.
///
/// Ties resolve to the first cell in row-major order so results are stable.
pub fn argmax(map: &Heatmap) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (y, row) in map.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            match best {
                Some((_, _, b)) if value <= b => {}
                _ => best = Some((x, y, value)),
            }
        }
    }
    best
}

/// The `k` largest entries, descending, ties in row-major order.
pub fn top_k(map: &Heatmap, k: usize) -> Vec<(usize, usize, f64)> {
    let mut entries: Vec<(usize, usize, f64)> = map
        .iter()
        .enumerate()
        .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &v)| (x, y, v)))
        .collect();
    entries.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(k);
    entries
}

/// Range and mean of a heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Summary statistics, or None for an empty map.
pub fn summarize(map: &Heatmap) -> Option<HeatmapSummary> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in map {
        for &value in row {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
    }
    if count == 0 {
        return None;
    }
    Some(HeatmapSummary {
        min,
        max,
        mean: sum / count as f64,
    })
}
