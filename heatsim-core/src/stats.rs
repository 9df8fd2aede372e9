use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub min: f32,
    pub max: f32,
    pub max_abs: f32,
    pub mean: f32,
    /// Sum of all cells, accumulated in `f64`.
    pub total: f64,
    pub all_finite: bool,
}

impl FieldStats {
    pub fn of(cells: &[f32]) -> Self {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut max_abs = 0.0f32;
        let mut total = 0.0f64;
        let mut all_finite = true;

        for &v in cells {
            if !v.is_finite() {
                all_finite = false;
            }
            min = min.min(v);
            max = max.max(v);
            max_abs = max_abs.max(v.abs());
            total += f64::from(v);
        }

        let mean = if cells.is_empty() {
            0.0
        } else {
            (total / cells.len() as f64) as f32
        };

        Self {
            min,
            max,
            max_abs,
            mean,
            total,
            all_finite,
        }
    }
}
