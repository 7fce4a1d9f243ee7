//! Subcommand implementations.

use std::fs;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use spectra_core::signal::{constant, impulse, random, sine_wave};
use spectra_core::{
    Backend, ComplexSample, FftConfig, SpectrumBuffer, direct_dft,
    partition as partition_bins, planned_fft,
};
use tracing::info;

/// Built-in input signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignalKind {
    /// `sin(2π·cycles·i/N)`
    Sine,
    /// `x[0] = 1`, zeros elsewhere
    Impulse,
    /// Every sample is one
    Ones,
    /// Uniform complex noise in [-1, 1)
    Random,
}

#[derive(Args, Debug)]
pub struct SignalArgs {
    /// Number of samples (a power of two)
    #[arg(short = 'n', long, default_value_t = 8)]
    pub size: usize,

    #[arg(short = 's', long, value_enum, default_value_t = SignalKind::Sine)]
    pub signal: SignalKind,

    /// Periods of the sine wave across the buffer
    #[arg(long, default_value_t = 1.0)]
    pub cycles: f64,

    /// Seed for the random signal
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SignalArgs {
    fn build(&self) -> SpectrumBuffer {
        let n = self.size;
        match self.signal {
            SignalKind::Sine => sine_wave(n, self.cycles),
            SignalKind::Impulse => impulse(n),
            SignalKind::Ones => constant(n, ComplexSample::new(1.0, 0.0)),
            SignalKind::Random => match self.seed {
                Some(seed) => random(n, &mut StdRng::seed_from_u64(seed)),
                None => random(n, &mut rand::rng()),
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub signal: SignalArgs,

    /// Load the input from a JSON file of [re, im] pairs instead
    #[arg(short = 'i', long)]
    pub input: Option<String>,

    /// Save the spectrum as JSON to this file
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Print the spectrum as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub signal: SignalArgs,
}

#[derive(Args, Debug)]
pub struct PartitionArgs {
    /// Number of frequency bins
    #[arg(short = 'n', long, default_value_t = 8)]
    pub size: usize,
}

fn print_samples(title: &str, samples: &[ComplexSample]) {
    println!("{title}:");
    for c in samples {
        println!("({},{})", c.re, c.im);
    }
}

pub fn run(args: &RunArgs, config: &FftConfig) -> Result<()> {
    let input = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {path}"))?;
            serde_json::from_str::<SpectrumBuffer>(&text)
                .with_context(|| format!("failed to parse input file {path}"))?
        }
        None => args.signal.build(),
    };

    let engine = config.backend.build(config)?;
    info!(backend = engine.name(), len = input.len(), "transforming");
    let spectrum = engine.transform(&input)?;

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&spectrum)?;
        fs::write(path, json).with_context(|| format!("failed to write {path}"))?;
    }

    if args.json {
        println!("{}", serde_json::to_string(&spectrum)?);
    } else {
        print_samples("Input", &input);
        println!();
        print_samples("FFT Output", &spectrum);
    }
    Ok(())
}

pub fn verify(args: &VerifyArgs, config: &FftConfig) -> Result<()> {
    let input = args.signal.build();
    let n = input.len();
    let tolerance = 1e-9 * n.max(1) as f64;
    let oracle = direct_dft(&input);

    let mut failed = Vec::new();
    for backend in Backend::ALL {
        let engine = backend.build(config)?;
        let spectrum = engine.transform(&input)?;
        let deviation = spectrum.max_abs_diff(&oracle).unwrap_or(f64::INFINITY);
        let verdict = if deviation <= tolerance { "ok" } else { "FAIL" };
        println!("{:<14} max deviation {deviation:.3e}  {verdict}", engine.name());
        if deviation > tolerance {
            failed.push(engine.name());
        }
    }

    let reference = planned_fft(&input)
        .max_abs_diff(&oracle)
        .unwrap_or(f64::INFINITY);
    println!("{:<14} max deviation {reference:.3e}", "rustfft");

    if !failed.is_empty() {
        bail!(
            "{} exceeded tolerance {tolerance:e}: {}",
            failed.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

pub fn partition(args: &PartitionArgs, config: &FftConfig) -> Result<()> {
    let slices = partition_bins(args.size, config.workers)?;
    for (rank, slice) in slices.iter().enumerate() {
        println!(
            "rank {rank}: bins [{}, {}) ({} bins)",
            slice.start_bin,
            slice.end_bin,
            slice.len()
        );
    }
    Ok(())
}
