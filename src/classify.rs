//! Decision rule: the best-scoring class wins.
//!
//! Ties go to the lowest class index (first maximum), so an all-equal
//! correlation vector predicts label 1.  NaN scores never win.
use ndarray::ArrayView1;

/// Index of the first maximum of `scores` (0 for an empty or all-NaN vector).
pub fn argmax_first(scores: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (i, &v) in scores.iter().enumerate() {
        if v > best_val {
            best = i;
            best_val = v;
        }
    }
    best
}

/// 1-based class label predicted from a correlation vector.
pub fn predict_label(scores: ArrayView1<'_, f64>) -> usize {
    argmax_first(scores) + 1
}
