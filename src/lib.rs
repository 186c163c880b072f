//! # ssvep-cca — SSVEP target detection with canonical correlation analysis
//!
//! `ssvep-cca` decides which flickering stimulus a subject attends to from
//! multi-channel EEG.  Every segment is compared with synthetic sin/cos
//! references at each candidate flicker frequency using canonical correlation
//! analysis (CCA); the best-correlated frequency is the prediction.
//!
//! ## Pipeline overview
//!
//! ```text
//! filtered EEG [K, C, T, R]
//!   │
//!   ├─ epoch::segment_epochs()        sliding windows → [K, C, R, S, N]
//!   │
//!   │        reference::reference_templates()   [K, 4, N]  sin/cos × 2 harmonics
//!   │                       │
//!   ├─ score::PreparedTemplates::score()        one CCA fit per class → [K]
//!   ├─ classify::predict_label()                first argmax + 1
//!   └─ evaluate::evaluate_subject()             label pairs → confusion → accuracy
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use ssvep_cca::{evaluate_subjects, CcaConfig};
//! use ndarray::Array5;
//!
//! // 12 targets, 8 channels, 6 trials, 5 one-second segments at 256 Hz.
//! let s1: Array5<f32> = Array5::zeros((12, 8, 6, 5, 256));
//!
//! let cfg = CcaConfig::default();
//! let reports = evaluate_subjects([("s1", s1.view())], &cfg).unwrap();
//! for (subject, report) in reports {
//!     match report.map(|r| r.accuracy) {
//!         Ok(Some(acc)) => println!("{subject}: {:.1} %", acc * 100.0),
//!         Ok(None)      => println!("{subject}: no segments"),
//!         Err(e)        => println!("{subject}: {e}"),
//!     }
//! }
//! ```
//!
//! ## Scoring a single segment
//!
//! ```
//! use ssvep_cca::{find_correlation, predict_label, reference_templates, CcaOptions};
//! use ndarray::Array2;
//!
//! let templates = reference_templates(&[10.0, 12.0], 256, 256.0);
//! let segment = Array2::from_shape_fn((4, 256), |(c, t)| {
//!     (2.0 * std::f32::consts::PI * 12.0 * t as f32 / 256.0 + c as f32).sin()
//! });
//! let scores = find_correlation(segment.view(), templates.view(), &CcaOptions::default());
//! assert_eq!(predict_label(scores.view()), 2);
//! ```

pub mod cca;
pub mod classify;
pub mod config;
pub mod epoch;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod normalize;
pub mod reference;
pub mod score;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{CcaConfig, DEFAULT_FLICKER_FREQS, N_HARMONIC_ROWS};

// error
pub use error::CcaError;

// reference
pub use reference::{reference_signals, reference_templates};

// cca
pub use cca::{canonical_correlation, fit, pearson, CcaFit, CcaOptions, WhitenedSet};

// score
pub use score::{find_correlation, PreparedTemplates};

// classify
pub use classify::{argmax_first, predict_label};

// evaluate
pub use evaluate::{
    cca_classify, check_shapes, classify_segments, evaluate_subject, evaluate_subjects,
    segment_indices, ConfusionMatrix, LabelPair, SegmentIndex, SubjectReport,
};

// epoch
pub use epoch::{n_segments, segment_epochs};

// io — safetensors helpers
pub use io::{shared_sample_rate, write_epochs, EpochFile, StWriter};

use ndarray::{ArrayView4, Array5};

/// Cut a filtered recording (`[K, C, T, R]`) into the epoch tensor
/// `[K, C, R, S, N]` using the window and shift of `cfg`.
///
/// # Errors
///
/// Returns [`CcaError::InvalidConfig`] if the window or shift holds no samples.
pub fn segment_with_config(data: ArrayView4<'_, f32>, cfg: &CcaConfig) -> Result<Array5<f32>, CcaError> {
    epoch::segment_epochs(data, cfg.window_samples(), cfg.shift_samples())
}
