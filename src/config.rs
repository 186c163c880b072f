//! Classifier configuration.
//!
//! [`CcaConfig`] holds every tunable parameter of the SSVEP classifier.  All
//! fields have defaults that match the 12-target benchmark recordings the
//! classifier was developed against (256 Hz, 1 s windows).

use crate::error::CcaError;

/// Flicker frequencies (Hz) of the 12-target benchmark, in class order.
pub const DEFAULT_FLICKER_FREQS: [f64; 12] = [
    9.25, 11.25, 13.25, 9.75, 11.75, 13.75, 10.25, 12.25, 14.25, 10.75, 12.75, 14.75,
];

/// Number of harmonic rows in every reference basis (sin/cos × 2 harmonics).
pub const N_HARMONIC_ROWS: usize = 4;

/// Configuration for reference synthesis, CCA scoring and evaluation.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use ssvep_cca::CcaConfig;
///
/// let cfg = CcaConfig {
///     flicker_freqs: vec![10.0, 12.0],
///     window_len:    2.0,
///     ..CcaConfig::default()
/// };
/// assert_eq!(cfg.window_samples(), 512);
/// ```
#[derive(Debug, Clone)]
pub struct CcaConfig {
    /// Sampling rate of the epoch tensors in Hz.
    ///
    /// Default: `256.0` Hz.
    pub sample_rate: f64,

    /// Analysis window length in seconds.
    ///
    /// Every segment of the epoch tensor, and every reference template, is
    /// `floor(window_len × sample_rate)` samples long.
    ///
    /// Default: `1.0` s.
    pub window_len: f64,

    /// Step between consecutive segment starts in seconds, used when cutting a
    /// continuous trial into segments.
    ///
    /// Default: `1.0` s (non-overlapping).
    pub shift_len: f64,

    /// One target flicker frequency per class, ordered like the class axis of
    /// the epoch tensor.
    pub flicker_freqs: Vec<f64>,

    /// Canonical component pairs fitted per class.  The class score is the
    /// largest correlation among them.
    ///
    /// Default: `1`.
    pub n_components: usize,

    /// Ridge added to the diagonal of both within-set covariance matrices.
    ///
    /// Columns are standardized before the covariances are estimated, so this
    /// is relative to unit variance.  It keeps the fit well-posed for flat or
    /// rank-deficient segments (e.g. identical channels).
    ///
    /// Default: `1e-6`.
    pub regularization: f64,

    /// Score segments on the rayon thread pool.  Output order and values are
    /// identical either way.
    ///
    /// Default: `true`.
    pub parallel: bool,
}

impl Default for CcaConfig {
    /// Returns the benchmark configuration:
    /// 256 Hz · 1 s window · 1 s shift · 12 targets · 1 component.
    fn default() -> Self {
        Self {
            sample_rate: 256.0,
            window_len: 1.0,
            shift_len: 1.0,
            flicker_freqs: DEFAULT_FLICKER_FREQS.to_vec(),
            n_components: 1,
            regularization: 1e-6,
            parallel: true,
        }
    }
}

impl CcaConfig {
    /// Number of samples per analysis window.
    ///
    /// ```
    /// use ssvep_cca::CcaConfig;
    /// assert_eq!(CcaConfig::default().window_samples(), 256);
    /// ```
    pub fn window_samples(&self) -> usize {
        (self.window_len * self.sample_rate) as usize
    }

    /// Number of samples between consecutive segment starts.
    pub fn shift_samples(&self) -> usize {
        (self.shift_len * self.sample_rate) as usize
    }

    /// Number of classes, i.e. target frequencies.
    pub fn n_classes(&self) -> usize {
        self.flicker_freqs.len()
    }

    /// Reject settings no evaluation can run with.
    pub fn validate(&self) -> Result<(), CcaError> {
        if !(self.sample_rate > 0.0) {
            return Err(CcaError::InvalidConfig(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.window_samples() == 0 {
            return Err(CcaError::InvalidConfig(format!(
                "window of {} s at {} Hz holds no samples",
                self.window_len, self.sample_rate
            )));
        }
        if self.flicker_freqs.is_empty() {
            return Err(CcaError::InvalidConfig("no flicker frequencies given".into()));
        }
        if let Some(f) = self.flicker_freqs.iter().find(|f| !(**f >= 0.0)) {
            return Err(CcaError::InvalidConfig(format!(
                "flicker frequency must be non-negative, got {f}"
            )));
        }
        if self.n_components == 0 {
            return Err(CcaError::InvalidConfig("n_components must be at least 1".into()));
        }
        if !(self.regularization >= 0.0) {
            return Err(CcaError::InvalidConfig(format!(
                "regularization must be non-negative, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_benchmark() {
        let cfg = CcaConfig::default();
        assert_eq!(cfg.n_classes(), 12);
        assert_eq!(cfg.window_samples(), 256);
        assert_eq!(cfg.shift_samples(), 256);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_components_rejected() {
        let cfg = CcaConfig { n_components: 0, ..CcaConfig::default() };
        assert!(matches!(cfg.validate(), Err(CcaError::InvalidConfig(_))));
    }

    #[test]
    fn empty_window_rejected() {
        let cfg = CcaConfig { window_len: 0.001, sample_rate: 100.0, ..CcaConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_frequency_rejected() {
        let cfg = CcaConfig { flicker_freqs: vec![10.0, -1.0], ..CcaConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
