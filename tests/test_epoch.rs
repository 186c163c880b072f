use ndarray::{s, Array4};
use ssvep_cca::{evaluate_subjects, n_segments, reference_signals, segment_with_config, CcaConfig};

/// Filtered-recording layout `[K, C, T, R]`: class-k fundamental sine on
/// every channel and trial.
fn continuous_recording(freqs: &[f64], n_ch: usize, n_t: usize, n_trials: usize) -> Array4<f32> {
    let bases: Vec<_> = freqs.iter().map(|&f| reference_signals(n_t, f, 256.0)).collect();
    Array4::from_shape_fn((freqs.len(), n_ch, n_t, n_trials), |(k, _, t, _)| bases[k][[0, t]] as f32)
}

#[test]
fn segment_count_matches_window_and_shift() {
    let cfg = CcaConfig { flicker_freqs: vec![10.0, 12.0], ..CcaConfig::default() };
    let data = continuous_recording(&cfg.flicker_freqs, 3, 4 * 256 + 100, 2);
    let epochs = segment_with_config(data.view(), &cfg).unwrap();
    assert_eq!(epochs.shape(), &[2, 3, 2, 4, 256]);
    assert_eq!(n_segments(4 * 256 + 100, 256, 256), 4);
}

#[test]
fn half_overlap_doubles_segments() {
    let cfg = CcaConfig { flicker_freqs: vec![10.0], shift_len: 0.5, ..CcaConfig::default() };
    let data = continuous_recording(&cfg.flicker_freqs, 2, 5 * 256, 1);
    let epochs = segment_with_config(data.view(), &cfg).unwrap();
    assert_eq!(epochs.shape()[3], 9);
    // Segment 1 starts half a window into the trial.
    for i in 0..256 {
        assert_eq!(epochs[[0, 1, 0, 1, i]], data[[0, 1, 128 + i, 0]]);
    }
}

#[test]
fn recording_shorter_than_window_gives_no_segments() {
    let cfg = CcaConfig { flicker_freqs: vec![10.0, 12.0], ..CcaConfig::default() };
    let data = continuous_recording(&cfg.flicker_freqs, 2, 200, 3);
    let epochs = segment_with_config(data.view(), &cfg).unwrap();
    assert_eq!(epochs.shape(), &[2, 2, 3, 0, 256]);

    let reports = evaluate_subjects([("short", epochs.view())], &cfg).unwrap();
    assert_eq!(reports[0].1.as_ref().unwrap().accuracy, None);
}

#[test]
fn segmented_recording_classifies_end_to_end() {
    let cfg = CcaConfig { flicker_freqs: vec![8.0, 11.0, 13.0], ..CcaConfig::default() };
    let data = continuous_recording(&cfg.flicker_freqs, 4, 3 * 256, 2);
    let epochs = segment_with_config(data.view(), &cfg).unwrap();
    assert_eq!(epochs.slice(s![.., .., .., .., 0]).dim(), (3usize, 4usize, 2usize, 3usize));

    let reports = evaluate_subjects([("s1", epochs.view())], &cfg).unwrap();
    assert_eq!(reports[0].1.as_ref().unwrap().accuracy, Some(1.0));
}
