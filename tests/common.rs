/// Shared fixture builders for the integration tests.
use ndarray::{Array2, Array3, Array5};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use ssvep_cca::reference_templates;
use std::f64::consts::PI;
use std::path::PathBuf;

#[allow(unused)]
/// "Perfect signal" tensor `[K, C, R, S, N]`: every segment of class k is the
/// first harmonic row (fundamental sine) of class k's own reference basis,
/// repeated on every channel.
pub fn perfect_epochs(
    freqs: &[f64],
    n_ch: usize,
    n_trials: usize,
    n_segs: usize,
    n_t: usize,
    sfreq: f64,
) -> Array5<f32> {
    let templates = reference_templates(freqs, n_t, sfreq);
    Array5::from_shape_fn((freqs.len(), n_ch, n_trials, n_segs, n_t), |(k, _, _, _, i)| {
        templates[[k, 0, i]] as f32
    })
}

#[allow(unused)]
/// Noisy tensor `[K, C, R, S, N]`: class-k sinusoid with a random phase per
/// (class, channel, trial) plus zero-mean Gaussian noise of standard deviation `noise`.
pub fn noisy_epochs(
    freqs: &[f64],
    n_ch: usize,
    n_trials: usize,
    n_segs: usize,
    n_t: usize,
    sfreq: f64,
    noise: f64,
    seed: u64,
) -> Array5<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let gaussian = Normal::new(0.0, noise).unwrap();
    let phases = Array3::from_shape_fn((freqs.len(), n_ch, n_trials), |_| rng.gen_range(0.0..2.0 * PI));
    let mut out = Array5::<f32>::zeros((freqs.len(), n_ch, n_trials, n_segs, n_t));
    for ((k, c, r, s, i), v) in out.indexed_iter_mut() {
        let t = (s * n_t + i) as f64 / sfreq;
        *v = ((2.0 * PI * freqs[k] * t + phases[[k, c, r]]).sin() + gaussian.sample(&mut rng)) as f32;
    }
    out
}

#[allow(unused)]
/// Segment `[C, N]` built purely from linear mixtures of the four reference
/// rows of `freq`, with a different mixture on every channel.
pub fn mixed_reference_segment(freq: f64, n_ch: usize, n_t: usize, sfreq: f64) -> Array2<f32> {
    let basis = ssvep_cca::reference_signals(n_t, freq, sfreq);
    Array2::from_shape_fn((n_ch, n_t), |(c, i)| {
        (0..4)
            .map(|r| ((c + 1) as f64 * (r + 1) as f64 * 0.7).cos() * basis[[r, i]])
            .sum::<f64>() as f32
    })
}

#[allow(unused)]
/// Unique scratch path under the system temp dir.
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ssvep_cca_{}_{name}", std::process::id()))
}
