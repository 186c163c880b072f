//! Sliding-window segmentation of filtered trials.
//!
//! Cuts every trial of a filtered recording `[K, C, T, R]`
//! (classes, channels, samples, trials) into windows of `window` samples
//! starting every `shift` samples, giving the epoch tensor
//! `[K, C, R, S, window]` consumed by the evaluation loop.
//! Trailing samples that do not fill a complete window are discarded.
use ndarray::{s, Array5, ArrayView4, Axis};

use crate::error::CcaError;

/// Number of windows of `window` samples, `shift` apart, that fit in `n_samples`.
pub fn n_segments(n_samples: usize, window: usize, shift: usize) -> usize {
    if window == 0 || shift == 0 || n_samples < window {
        return 0;
    }
    (n_samples - window) / shift + 1
}

/// Segment `data` (`[K, C, T, R]`) into `[K, C, R, S, window]`.
pub fn segment_epochs(
    data: ArrayView4<'_, f32>,
    window: usize,
    shift: usize,
) -> Result<Array5<f32>, CcaError> {
    if window == 0 || shift == 0 {
        return Err(CcaError::InvalidConfig(format!(
            "segment window ({window}) and shift ({shift}) must be positive"
        )));
    }
    let (n_cls, n_ch, n_t, n_tr) = data.dim();
    let n_seg = n_segments(n_t, window, shift);

    let mut out = Array5::<f32>::zeros((n_cls, n_ch, n_tr, n_seg, window));
    for seg in 0..n_seg {
        let start = seg * shift;
        // [K, C, window, R] → [K, C, R, window]
        let src = data.slice(s![.., .., start..start + window, ..]);
        let src = src.permuted_axes([0, 1, 3, 2]);
        out.index_axis_mut(Axis(3), seg).assign(&src);
    }
    tracing::debug!(
        classes = n_cls,
        channels = n_ch,
        trials = n_tr,
        segments = n_seg,
        window,
        "segmented epochs"
    );
    Ok(out)
}
