//! Per-class canonical-correlation scores for one EEG segment.
//!
//! A segment `[C, N]` is paired with each class basis `[4, N]` of the
//! reference template set `[K, 4, N]`; both are turned into variable sets
//! with time samples as observations, and the class score is the largest
//! canonical correlation between them.
use ndarray::{Array1, ArrayView2, ArrayView3, Axis};

use crate::cca::{fit, CcaOptions, WhitenedSet};

/// Reference templates prepared for repeated scoring.
///
/// Each class basis is standardized and whitened once; every segment scored
/// against the set reuses that work.
#[derive(Debug, Clone)]
pub struct PreparedTemplates {
    classes: Vec<WhitenedSet>,
    n_samples: usize,
    opts: CcaOptions,
}

impl PreparedTemplates {
    /// Prepare `templates` (`[K, 4, N]`).
    pub fn new(templates: ArrayView3<'_, f64>, opts: CcaOptions) -> Self {
        let n_samples = templates.len_of(Axis(2));
        let classes = templates
            .outer_iter()
            .map(|basis| WhitenedSet::new(basis.t(), opts.regularization))
            .collect();
        Self { classes, n_samples, opts }
    }

    /// Number of classes `K`.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Samples per template `N`.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Harmonic rows per class basis (0 for an empty set).
    pub fn n_rows(&self) -> usize {
        self.classes.first().map_or(0, WhitenedSet::n_vars)
    }

    /// Correlation vector (length `K`) for one segment `[C, N]`.
    pub fn score(&self, segment: ArrayView2<'_, f32>) -> Array1<f64> {
        let x = segment.t().mapv(f64::from);
        let xs = WhitenedSet::new(x.view(), self.opts.regularization);
        self.classes
            .iter()
            .map(|ys| fit(&xs, ys, self.opts.n_components).max_correlation())
            .collect()
    }
}

/// Correlation vector (length `K`) of `segment` (`[C, N]`) against every class
/// basis in `templates` (`[K, 4, N]`).
///
/// Convenience wrapper preparing the templates for a single call; use
/// [`PreparedTemplates`] when scoring many segments.
pub fn find_correlation(
    segment: ArrayView2<'_, f32>,
    templates: ArrayView3<'_, f64>,
    opts: &CcaOptions,
) -> Array1<f64> {
    PreparedTemplates::new(templates, *opts).score(segment)
}
