//! Configuration loading: JSON file first, then command line overrides.

use std::fs;

use anyhow::{Context, Result};
use spectra_core::FftConfig;

use crate::Cli;

pub fn load(cli: &Cli) -> Result<FftConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config file {path}"))?
        }
        None => FftConfig::default(),
    };

    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(threshold) = cli.threshold {
        config.parallel_threshold = threshold;
    }
    if let Some(threads) = cli.threads {
        config.threads = Some(threads);
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.collective_timeout_ms = timeout_ms;
    }

    Ok(config)
}
