//! Harmonic reference signals for SSVEP detection.
//!
//! For a flicker frequency `f` the expected response is modelled by the basis
//!
//! ```text
//! [ sin(2π f t), cos(2π f t), sin(4π f t), cos(4π f t) ]     t = i / sfreq
//! ```
//!
//! sampled over one analysis window.  Stacking one basis per class gives the
//! reference template set `[K, 4, N]`.
use std::f64::consts::PI;

use ndarray::{Array2, Array3};

use crate::config::N_HARMONIC_ROWS;

/// Reference basis `[4, n_samples]` for one target frequency.
pub fn reference_signals(n_samples: usize, freq: f64, sfreq: f64) -> Array2<f64> {
    Array2::from_shape_fn((N_HARMONIC_ROWS, n_samples), |(row, i)| {
        let t = i as f64 / sfreq;
        let harmonic = (row / 2 + 1) as f64;
        let phase = 2.0 * PI * harmonic * freq * t;
        if row % 2 == 0 { phase.sin() } else { phase.cos() }
    })
}

/// Reference template set `[freqs.len(), 4, n_samples]`, one basis per class.
pub fn reference_templates(freqs: &[f64], n_samples: usize, sfreq: f64) -> Array3<f64> {
    let mut out = Array3::<f64>::zeros((freqs.len(), N_HARMONIC_ROWS, n_samples));
    for (mut basis, &f) in out.outer_iter_mut().zip(freqs) {
        basis.assign(&reference_signals(n_samples, f, sfreq));
    }
    out
}
