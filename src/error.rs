//! Error types for scoring and evaluation.

use thiserror::Error;

/// Errors raised by the classifier.
///
/// Degenerate (flat or rank-deficient) segments are not errors: the CCA fit
/// is regularized and the segment still yields one prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CcaError {
    /// Template set and epoch tensor disagree along one axis.
    #[error("shape mismatch on {axis}: templates have {templates}, epochs have {epochs}")]
    ShapeMismatch {
        /// Axis name (`"classes"` or `"samples"`)
        axis: &'static str,
        /// Size of the axis in the reference template set
        templates: usize,
        /// Size of the axis in the epoch tensor
        epochs: usize,
    },

    /// Configuration that no evaluation can run with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Accuracy requested for a subject with no evaluated segments.
    #[error("subject {subject:?} has no segments to evaluate; accuracy is undefined")]
    EmptyEvaluationSet {
        /// Subject key
        subject: String,
    },
}
