//! Evaluation loop: classify every segment of a subject and score accuracy.
//!
//! ```text
//! epochs [K, C, R, S, N] ──┐
//!                           ├─ for (class, trial, segment) in class → trial → segment order
//! templates [K, 4, N] ──────┘      score → argmax → LabelPair { truth, predicted }
//!                                   │
//!                                   └─→ ConfusionMatrix [K, K] → accuracy = trace / total
//! ```
//!
//! Shapes are checked before any segment is scored.  Segments are scored
//! independently; with `CcaConfig::parallel` they run on the rayon pool and
//! are collected back in traversal order, so the label-pair sequence is the
//! same as a sequential run.
use ndarray::{s, Array2, ArrayView3, ArrayView5, Axis};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::cca::CcaOptions;
use crate::classify::predict_label;
use crate::config::CcaConfig;
use crate::error::CcaError;
use crate::reference::reference_templates;
use crate::score::PreparedTemplates;

/// `(true label, predicted label)` for one segment, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LabelPair {
    pub truth: usize,
    pub predicted: usize,
}

/// Position of one segment in the epoch tensor (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentIndex {
    pub class: usize,
    pub trial: usize,
    pub segment: usize,
}

/// All `(class, trial, segment)` triples, class-major then trial then segment.
///
/// The iterator is lazy and can be cloned to restart the traversal.
pub fn segment_indices(
    n_classes: usize,
    n_trials: usize,
    n_segments: usize,
) -> impl Iterator<Item = SegmentIndex> + Clone {
    (0..n_classes).flat_map(move |class| {
        (0..n_trials).flat_map(move |trial| {
            (0..n_segments).map(move |segment| SegmentIndex { class, trial, segment })
        })
    })
}

/// Check an epoch tensor `[K, C, R, S, N]` against prepared templates.
pub fn check_shapes(
    epochs: &ArrayView5<'_, f32>,
    templates: &PreparedTemplates,
    n_components: usize,
) -> Result<(), CcaError> {
    let (n_cls, n_ch, _n_tr, _n_seg, n_t) = epochs.dim();
    if templates.n_classes() != n_cls {
        return Err(CcaError::ShapeMismatch {
            axis: "classes",
            templates: templates.n_classes(),
            epochs: n_cls,
        });
    }
    if templates.n_samples() != n_t {
        return Err(CcaError::ShapeMismatch {
            axis: "samples",
            templates: templates.n_samples(),
            epochs: n_t,
        });
    }
    let max_components = n_ch.min(templates.n_rows());
    if n_components == 0 || n_components > max_components {
        return Err(CcaError::InvalidConfig(format!(
            "n_components = {n_components} but {n_ch} channels and {} harmonic rows allow at most {max_components}",
            templates.n_rows()
        )));
    }
    Ok(())
}

/// Classify every segment of `epochs` (`[K, C, R, S, N]`) against prepared
/// templates and return one label pair per segment, in traversal order.
pub fn classify_segments(
    epochs: ArrayView5<'_, f32>,
    templates: &PreparedTemplates,
    parallel: bool,
) -> Vec<LabelPair> {
    let (n_cls, _n_ch, n_tr, n_seg, _n_t) = epochs.dim();
    let classify_one = |idx: SegmentIndex| {
        let segment = epochs.slice(s![idx.class, .., idx.trial, idx.segment, ..]);
        let scores = templates.score(segment);
        LabelPair { truth: idx.class + 1, predicted: predict_label(scores.view()) }
    };

    let indices = segment_indices(n_cls, n_tr, n_seg);
    if parallel {
        let indices: Vec<SegmentIndex> = indices.collect();
        indices.into_par_iter().map(classify_one).collect()
    } else {
        indices.map(classify_one).collect()
    }
}

/// Check shapes, then classify every segment of one subject.
pub fn cca_classify(
    epochs: ArrayView5<'_, f32>,
    templates: ArrayView3<'_, f64>,
    cfg: &CcaConfig,
) -> Result<Vec<LabelPair>, CcaError> {
    let prepared = PreparedTemplates::new(templates, CcaOptions::from(cfg));
    check_shapes(&epochs, &prepared, cfg.n_components)?;
    Ok(classify_segments(epochs, &prepared, cfg.parallel))
}

/// Class × class count table; rows are true labels, columns predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Array2<u64>,
}

impl ConfusionMatrix {
    /// Tally 1-based label pairs over the label space `1..=n_classes`.
    ///
    /// Pairs with a label outside that space are not counted.
    pub fn from_pairs(n_classes: usize, pairs: &[LabelPair]) -> Self {
        let mut counts = Array2::<u64>::zeros((n_classes, n_classes));
        let in_range = |l: usize| (1..=n_classes).contains(&l);
        for p in pairs {
            if in_range(p.truth) && in_range(p.predicted) {
                counts[[p.truth - 1, p.predicted - 1]] += 1;
            } else {
                warn!(truth = p.truth, predicted = p.predicted, n_classes, "label outside class range");
            }
        }
        Self { counts }
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.counts.nrows()
    }

    /// Raw counts, `[true, predicted]`, 0-based indices.
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Count for 1-based `(truth, predicted)` labels; `None` outside `1..=n_classes`.
    pub fn get(&self, truth: usize, predicted: usize) -> Option<u64> {
        let (t, p) = (truth.checked_sub(1)?, predicted.checked_sub(1)?);
        self.counts.get((t, p)).copied()
    }

    /// Sum of all entries.
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Sum of the diagonal (correct predictions).
    pub fn correct(&self) -> u64 {
        self.counts.diag().sum()
    }

    /// `trace / total`, or `None` if nothing was counted.
    pub fn accuracy(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.correct() as f64 / total as f64),
        }
    }

    /// Per-class recall (`diag / row sum`); `None` for classes with no segments.
    pub fn recall(&self) -> Vec<Option<f64>> {
        self.counts
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, row)| match row.sum() {
                0 => None,
                n => Some(row[i] as f64 / n as f64),
            })
            .collect()
    }
}

impl Serialize for ConfusionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<u64>> = self.counts.outer_iter().map(|r| r.to_vec()).collect();
        rows.serialize(serializer)
    }
}

/// Outcome of evaluating one subject.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectReport {
    /// Subject key, e.g. `"s1"`.
    pub subject: String,
    /// Number of evaluated segments.
    pub n_segments: usize,
    /// `None` when the subject had no segments.
    pub accuracy: Option<f64>,
    pub confusion: ConfusionMatrix,
    /// One pair per segment, class → trial → segment order.
    #[serde(skip)]
    pub pairs: Vec<LabelPair>,
}

impl SubjectReport {
    /// Accuracy, or [`CcaError::EmptyEvaluationSet`] if it is undefined.
    pub fn require_accuracy(&self) -> Result<f64, CcaError> {
        self.accuracy.ok_or_else(|| CcaError::EmptyEvaluationSet { subject: self.subject.clone() })
    }
}

/// Evaluate one subject's epoch tensor against prepared templates.
pub fn evaluate_subject(
    subject: &str,
    epochs: ArrayView5<'_, f32>,
    templates: &PreparedTemplates,
    cfg: &CcaConfig,
) -> Result<SubjectReport, CcaError> {
    check_shapes(&epochs, templates, cfg.n_components)?;
    debug!(subject, shape = ?epochs.shape(), "evaluating subject");

    let pairs = classify_segments(epochs, templates, cfg.parallel);
    let confusion = ConfusionMatrix::from_pairs(templates.n_classes(), &pairs);
    let accuracy = confusion.accuracy();
    match accuracy {
        Some(acc) => info!(subject, segments = pairs.len(), accuracy = acc, "subject evaluated"),
        None => warn!(subject, "no segments, accuracy undefined"),
    }

    Ok(SubjectReport {
        subject: subject.to_string(),
        n_segments: pairs.len(),
        accuracy,
        confusion,
        pairs,
    })
}

/// Evaluate several subjects with one template set built from `cfg`.
///
/// The configuration is validated up front; afterwards each subject succeeds
/// or fails on its own, so a shape error in one tensor does not stop the rest.
pub fn evaluate_subjects<'a, I>(
    subjects: I,
    cfg: &CcaConfig,
) -> Result<Vec<(String, Result<SubjectReport, CcaError>)>, CcaError>
where
    I: IntoIterator<Item = (&'a str, ArrayView5<'a, f32>)>,
{
    cfg.validate()?;
    let templates = reference_templates(&cfg.flicker_freqs, cfg.window_samples(), cfg.sample_rate);
    let prepared = PreparedTemplates::new(templates.view(), CcaOptions::from(cfg));

    Ok(subjects
        .into_iter()
        .map(|(key, epochs)| {
            let report = evaluate_subject(key, epochs, &prepared, cfg);
            if let Err(e) = &report {
                warn!(subject = key, error = %e, "subject skipped");
            }
            (key.to_string(), report)
        })
        .collect())
}
