//! Column standardization of CCA variable sets.
//!
//! A variable set is an `[N, P]` matrix: `N` observations (time samples) of
//! `P` variables (channels or harmonic rows).
//!
//! `standardize_columns_inplace`:
//!   μ_j = mean(x[:, j]),  σ_j = std(x[:, j]) (ddof = 1)
//!   x[:, j] = (x[:, j] − μ_j) / σ_j
//!
//! A column whose spread is negligible next to its magnitude (constant or
//! all-zero) carries no information for the fit and is set to zero instead of
//! being divided by a vanishing σ.
use ndarray::{Array2, Axis};

/// Relative spread below which a column is treated as constant.
pub const FLAT_COLUMN_TOL: f64 = 1e-9;

/// Standardize every column of `data` ([N, P]) in place.
/// Returns the `(mean, std)` pair of each column; flat columns report `std = 0`.
pub fn standardize_columns_inplace(data: &mut Array2<f64>) -> Vec<(f64, f64)> {
    let n = data.nrows();
    let ddof = if n > 1 { 1.0 } else { 0.0 };
    let mut stats = Vec::with_capacity(data.ncols());

    for mut col in data.axis_iter_mut(Axis(1)) {
        if n == 0 {
            stats.push((0.0, 0.0));
            continue;
        }
        let mean = col.sum() / n as f64;
        let var = col.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - ddof);
        let std = var.sqrt();
        let max_abs = col.iter().fold(0.0_f64, |m, v| m.max(v.abs()));

        if std > FLAT_COLUMN_TOL * max_abs && std > 0.0 {
            col.mapv_inplace(|v| (v - mean) / std);
            stats.push((mean, std));
        } else {
            col.fill(0.0);
            stats.push((mean, 0.0));
        }
    }
    stats
}
