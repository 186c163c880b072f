/// synth_epochs: write a synthetic SSVEP subject file.
///
/// Every segment of class k carries the class-k flicker sinusoid on all
/// channels (random phase per channel) plus Gaussian noise, so a
/// correct classifier scores close to 100 % at low noise.
///
/// Output keys:
///   epochs   [K, C, R, S, N]  f32
///   sfreq    [1]              f32
use anyhow::Result;
use clap::Parser;
use ndarray::{Array3, Array5};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use std::path::PathBuf;

use ssvep_cca::{write_epochs, CcaConfig};

#[derive(Parser, Debug)]
#[command(name = "synth_epochs")]
struct Args {
    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Number of channels.
    #[arg(long, default_value_t = 8)]
    channels: usize,

    /// Trials per class.
    #[arg(long, default_value_t = 4)]
    trials: usize,

    /// Segments per trial.
    #[arg(long, default_value_t = 4)]
    segments: usize,

    /// Noise amplitude relative to the unit-amplitude sinusoid.
    #[arg(long, default_value_t = 1.0)]
    noise: f64,

    /// Flicker frequencies (comma-separated, Hz); defaults to the 12-target table.
    #[arg(long, value_delimiter = ',')]
    freqs: Option<Vec<f64>>,

    /// Sampling rate (Hz).
    #[arg(long, default_value_t = 256.0)]
    sfreq: f64,

    /// Segment length (s).
    #[arg(long, default_value_t = 1.0)]
    window_len: f64,

    /// RNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let freqs = args.freqs.unwrap_or_else(|| CcaConfig::default().flicker_freqs);
    let n_t = (args.window_len * args.sfreq) as usize;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let noise = Normal::new(0.0, args.noise)?;

    // One phase per (class, channel, trial) keeps the segments of a trial continuous.
    let phases = Array3::from_shape_fn((freqs.len(), args.channels, args.trials), |_| {
        rng.gen_range(0.0..2.0 * PI)
    });

    let shape = (freqs.len(), args.channels, args.trials, args.segments, n_t);
    let mut epochs = Array5::<f32>::zeros(shape);
    for ((k, c, r, s, i), v) in epochs.indexed_iter_mut() {
        let t = (s * n_t + i) as f64 / args.sfreq;
        *v = ((2.0 * PI * freqs[k] * t + phases[[k, c, r]]).sin() + noise.sample(&mut rng)) as f32;
    }

    write_epochs(&args.output, epochs.view(), args.sfreq as f32)?;
    println!("Wrote {:?} epochs → {}", epochs.shape(), args.output.display());
    Ok(())
}
