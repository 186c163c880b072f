use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ssvep_cca::{evaluate_subjects, shared_sample_rate, CcaConfig, EpochFile, SubjectReport};

#[derive(Parser)]
#[command(name = "cca_eval", about = "SSVEP classification accuracy per subject (CCA)")]
struct Args {
    /// Segmented epoch files, one per subject (key = file stem)
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Flicker frequencies in class order (comma-separated, Hz)
    #[arg(long, value_delimiter = ',')]
    freqs: Option<Vec<f64>>,

    /// Sampling rate in Hz; defaults to the rate stored in the files, else 256
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Analysis window length in seconds
    #[arg(long, default_value_t = 1.0)]
    window_len: f64,

    /// Canonical components fitted per class
    #[arg(long, default_value_t = 1)]
    n_components: usize,

    /// Ridge added to the within-set covariances
    #[arg(long, default_value_t = 1e-6)]
    regularization: f64,

    /// Score segments on a single thread
    #[arg(long)]
    sequential: bool,

    /// Write all subject reports as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut subjects = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("no subject key in {}", path.display()))?
            .to_string();
        let file = EpochFile::load(path)?;
        info!(subject = %key, shape = ?file.epochs.shape(), "loaded");
        subjects.push((key, file));
    }

    let file_rate =
        shared_sample_rate(subjects.iter().map(|(k, f)| (k.as_str(), f.sfreq)))?.map(f64::from);
    if let (Some(cli), Some(stored)) = (args.sample_rate, file_rate) {
        if cli != stored {
            warn!(cli, stored, "--sample-rate overrides the rate stored in the input files");
        }
    }
    let cfg = CcaConfig {
        sample_rate: args.sample_rate.or(file_rate).unwrap_or(256.0),
        window_len: args.window_len,
        flicker_freqs: args.freqs.unwrap_or_else(|| CcaConfig::default().flicker_freqs),
        n_components: args.n_components,
        regularization: args.regularization,
        parallel: !args.sequential,
        ..CcaConfig::default()
    };

    let results = evaluate_subjects(
        subjects.iter().map(|(k, f)| (k.as_str(), f.epochs.view())),
        &cfg,
    )?;

    let mut reports: Vec<SubjectReport> = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (subject, result) in results {
        match result {
            Ok(r) => {
                match r.accuracy {
                    Some(acc) => println!("Subject: {subject}, Accuracy: {:.2} %", acc * 100.0),
                    None => println!("Subject: {subject}, Accuracy: undefined (no segments)"),
                }
                reports.push(r);
            }
            Err(e) => {
                warn!(%subject, error = %e, "evaluation failed");
                println!("Subject: {subject}, error: {e}");
                failed += 1;
            }
        }
    }

    let defined: Vec<f64> = reports.iter().filter_map(|r| r.accuracy).collect();
    if !defined.is_empty() {
        let mean = defined.iter().sum::<f64>() / defined.len() as f64;
        println!("Mean accuracy over {} subjects: {:.2} %", defined.len(), mean * 100.0);
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Written → {}", path.display());
    }

    if failed == args.input.len() {
        bail!("no subject could be evaluated");
    }
    Ok(())
}
