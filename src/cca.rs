//! Regularized canonical correlation analysis between two variable sets.
//!
//! For `X` ([N, P]) and `Y` ([N, Q]) with observations along rows:
//!
//! ```text
//! 1. standardize the columns of X and Y                 (normalize.rs)
//! 2. Cxx = XᵀX/(N−1) + λI,  Cyy = YᵀY/(N−1) + λI,  Cxy = XᵀY/(N−1)
//! 3. M   = Cxx^{-1/2} · Cxy · Cyy^{-1/2}                 (eigen-based inverse sqrt)
//! 4. M   = U Σ Vᵀ;  a_k = Cxx^{-1/2} u_k,  b_k = Cyy^{-1/2} v_k
//! 5. r_k = pearson(X a_k, Y b_k)
//! ```
//!
//! `a_k`, `b_k` maximize `corr(X a, Y b)` subject to unit variance of both
//! projections, which is the defining problem of CCA; the SVD of the whitened
//! cross-covariance yields all component pairs at once in decreasing order.
//!
//! Degenerate inputs (flat channels, identical channels, fewer samples than
//! variables) are absorbed by the ridge `λ` and an eigenvalue floor: the fit
//! never fails and a projection with no variance correlates as `0.0`.
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::{Array2, ArrayView2};

use crate::config::CcaConfig;
use crate::normalize::standardize_columns_inplace;

/// Smallest eigenvalue kept when inverting a covariance square root.
pub const EIGEN_FLOOR: f64 = 1e-12;

/// Variance product below which a Pearson correlation is reported as `0.0`.
pub const PEARSON_EPS: f64 = 1e-20;

/// Parameters of a single CCA fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcaOptions {
    /// Number of canonical component pairs to fit (clamped to `min(P, Q)`).
    pub n_components: usize,
    /// Ridge added to the diagonal of `Cxx` and `Cyy`.
    pub regularization: f64,
}

impl Default for CcaOptions {
    fn default() -> Self {
        Self { n_components: 1, regularization: 1e-6 }
    }
}

impl From<&CcaConfig> for CcaOptions {
    fn from(cfg: &CcaConfig) -> Self {
        Self { n_components: cfg.n_components, regularization: cfg.regularization }
    }
}

/// One standardized variable set together with its whitening transform.
///
/// Preparing a set once lets it be paired with many others (a segment against
/// every class basis, or a class basis against every segment).
#[derive(Debug, Clone)]
pub struct WhitenedSet {
    /// Standardized observations, `[N, P]`.
    pub data: DMatrix<f64>,
    /// `(XᵀX/(N−1) + λI)^{-1/2}`, `[P, P]`.
    pub inv_sqrt_cov: DMatrix<f64>,
}

impl WhitenedSet {
    /// Standardize `x` ([N, P]) and compute its regularized whitening matrix.
    pub fn new(x: ArrayView2<'_, f64>, regularization: f64) -> Self {
        let mut owned: Array2<f64> = x.to_owned();
        standardize_columns_inplace(&mut owned);
        let (n, p) = owned.dim();
        let data = DMatrix::from_fn(n, p, |i, j| owned[[i, j]]);

        let denom = n.saturating_sub(1).max(1) as f64;
        let mut cov = data.transpose() * &data / denom;
        for i in 0..p {
            cov[(i, i)] += regularization;
        }
        Self { data, inv_sqrt_cov: inv_sqrt_psd(cov) }
    }

    /// Number of observations `N`.
    pub fn n_obs(&self) -> usize {
        self.data.nrows()
    }

    /// Number of variables `P`.
    pub fn n_vars(&self) -> usize {
        self.data.ncols()
    }
}

/// Result of fitting CCA between two sets.
#[derive(Debug, Clone)]
pub struct CcaFit {
    /// Weight vectors for the first set, one column per component, `[P, k]`.
    pub x_weights: DMatrix<f64>,
    /// Weight vectors for the second set, one column per component, `[Q, k]`.
    pub y_weights: DMatrix<f64>,
    /// Pearson correlation of each projected pair, in component order.
    pub correlations: Vec<f64>,
}

impl CcaFit {
    fn empty(p: usize, q: usize) -> Self {
        Self {
            x_weights: DMatrix::zeros(p, 0),
            y_weights: DMatrix::zeros(q, 0),
            correlations: vec![],
        }
    }

    /// Largest correlation over the fitted components (`0.0` if none).
    pub fn max_correlation(&self) -> f64 {
        self.correlations.iter().copied().fold(0.0, f64::max)
    }
}

/// Fit CCA between two prepared sets with the same number of observations.
pub fn fit(x: &WhitenedSet, y: &WhitenedSet, n_components: usize) -> CcaFit {
    debug_assert_eq!(x.n_obs(), y.n_obs(), "variable sets must share observations");
    let (p, q) = (x.n_vars(), y.n_vars());
    let k = n_components.min(p).min(q);
    if k == 0 {
        return CcaFit::empty(p, q);
    }

    let denom = x.n_obs().saturating_sub(1).max(1) as f64;
    let cxy = x.data.transpose() * &y.data / denom;
    let whitened = &x.inv_sqrt_cov * cxy * &y.inv_sqrt_cov;

    let svd = whitened.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return CcaFit::empty(p, q);
    };

    // Component order: decreasing singular value.
    let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
    order.sort_by(|&a, &b| svd.singular_values[b].total_cmp(&svd.singular_values[a]));

    let mut x_weights = DMatrix::zeros(p, k);
    let mut y_weights = DMatrix::zeros(q, k);
    let mut correlations = Vec::with_capacity(k);
    for (c, &idx) in order.iter().take(k).enumerate() {
        let a: DVector<f64> = &x.inv_sqrt_cov * u.column(idx);
        let b: DVector<f64> = &y.inv_sqrt_cov * v_t.row(idx).transpose();
        let xs = &x.data * &a;
        let ys = &y.data * &b;
        correlations.push(pearson(xs.as_slice(), ys.as_slice()));
        x_weights.set_column(c, &a);
        y_weights.set_column(c, &b);
    }

    CcaFit { x_weights, y_weights, correlations }
}

/// Fit CCA between `x` ([N, P]) and `y` ([N, Q]) and return the largest
/// canonical correlation.
pub fn canonical_correlation(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    opts: &CcaOptions,
) -> f64 {
    let xs = WhitenedSet::new(x, opts.regularization);
    let ys = WhitenedSet::new(y, opts.regularization);
    fit(&xs, &ys, opts.n_components).max_correlation()
}

/// Pearson correlation coefficient of two equally long sequences.
///
/// Returns `0.0` when either sequence has (numerically) zero variance, and is
/// clamped to `[-1, 1]`.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let ma = a[..n].iter().sum::<f64>() / n as f64;
    let mb = b[..n].iter().sum::<f64>() / n as f64;

    let (mut saa, mut sbb, mut sab) = (0.0, 0.0, 0.0);
    for (&x, &y) in a[..n].iter().zip(&b[..n]) {
        let (dx, dy) = (x - ma, y - mb);
        saa += dx * dx;
        sbb += dy * dy;
        sab += dx * dy;
    }

    let denom = saa * sbb;
    if !(denom > PEARSON_EPS) {
        tracing::trace!(saa, sbb, "flat projection, correlation set to 0");
        return 0.0;
    }
    (sab / denom.sqrt()).clamp(-1.0, 1.0)
}

/// Inverse square root of a symmetric positive semi-definite matrix, with
/// eigenvalues floored at [`EIGEN_FLOOR`].
fn inv_sqrt_psd(m: DMatrix<f64>) -> DMatrix<f64> {
    let eigen = SymmetricEigen::new(m);
    let inv_sqrt = eigen.eigenvalues.map(|v| 1.0 / v.max(EIGEN_FLOOR).sqrt());
    &eigen.eigenvectors * DMatrix::from_diagonal(&inv_sqrt) * eigen.eigenvectors.transpose()
}
