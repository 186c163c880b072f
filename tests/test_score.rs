mod common;
use common::{mixed_reference_segment, noisy_epochs};
use ndarray::{array, s, Array2};
use ssvep_cca::{
    argmax_first, find_correlation, pearson, predict_label, reference_templates, CcaOptions,
    PreparedTemplates, DEFAULT_FLICKER_FREQS,
};

#[test]
fn two_class_scenario_prefers_class_one() {
    // 2 classes at 10 / 12 Hz, 256 Hz, 1 s window; 8 channels mixed from the
    // 10 Hz reference rows only.
    let templates = reference_templates(&[10.0, 12.0], 256, 256.0);
    assert_eq!(templates.dim(), (2, 4, 256));

    let seg = mixed_reference_segment(10.0, 8, 256, 256.0);
    let scores = find_correlation(seg.view(), templates.view(), &CcaOptions::default());

    assert!(scores[0] > scores[1], "scores = {scores:?}");
    assert!(scores[0] > 0.999, "own-class score {}", scores[0]);
    assert_eq!(predict_label(scores.view()), 1);
}

#[test]
fn scores_lie_in_unit_interval() {
    let freqs = DEFAULT_FLICKER_FREQS;
    let templates = reference_templates(&freqs, 256, 256.0);
    let prepared = PreparedTemplates::new(templates.view(), CcaOptions::default());
    let epochs = noisy_epochs(&freqs[..3], 6, 2, 2, 256, 256.0, 2.0, 7);
    for k in 0..3 {
        for r in 0..2 {
            for sg in 0..2 {
                let seg = epochs.slice(s![k, .., r, sg, ..]);
                for &v in prepared.score(seg).iter() {
                    assert!((-1.0..=1.0).contains(&v), "score {v} out of range");
                }
            }
        }
    }
}

#[test]
fn identical_sequences_score_one() {
    let a: Vec<f64> = (0..300).map(|i| (i as f64 * 0.13).sin() + 0.2).collect();
    approx::assert_abs_diff_eq!(pearson(&a, &a), 1.0, epsilon = 1e-12);
}

#[test]
fn more_components_never_lower_the_score() {
    let templates = reference_templates(&[9.25, 11.25], 256, 256.0);
    let epochs = noisy_epochs(&[9.25, 11.25], 8, 1, 1, 256, 256.0, 1.0, 3);
    let seg = epochs.slice(s![0, .., 0, 0, ..]);
    let one = find_correlation(seg, templates.view(), &CcaOptions { n_components: 1, regularization: 1e-6 });
    let three = find_correlation(seg, templates.view(), &CcaOptions { n_components: 3, regularization: 1e-6 });
    for k in 0..2 {
        assert!(three[k] + 1e-9 >= one[k], "class {k}: {} < {}", three[k], one[k]);
    }
}

#[test]
fn identical_channels_are_regularized() {
    // Rank-1 segment: the same 12 Hz sine on all 8 channels.
    let templates = reference_templates(&[10.0, 12.0], 256, 256.0);
    let seg = Array2::from_shape_fn((8, 256), |(_, t)| {
        (2.0 * std::f64::consts::PI * 12.0 * t as f64 / 256.0).sin() as f32
    });
    let scores = find_correlation(seg.view(), templates.view(), &CcaOptions::default());
    assert!(scores.iter().all(|v| v.is_finite()));
    assert!(scores[1] > 0.999, "{scores:?}");
    assert!(scores[0] < 0.1, "{scores:?}");
}

#[test]
fn classifier_is_deterministic_and_first_max() {
    let v = array![0.2, 0.8, 0.8, 0.1, 0.2, 0.2];
    let first = argmax_first(v.view());
    for _ in 0..10 {
        assert_eq!(argmax_first(v.view()), first);
    }
    assert_eq!(first, 1);

    // Strict unique max with duplicate non-max ties elsewhere, any length.
    for len in 2..12 {
        for pos in 0..len {
            let mut w = vec![0.3; len];
            w[pos] = 0.9;
            let w = ndarray::Array1::from(w);
            assert_eq!(argmax_first(w.view()), pos);
        }
    }
}
