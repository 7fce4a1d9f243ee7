//! # Engine Module
//!
//! The common interface of the three back-ends and selection by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::SpectrumBuffer;
use crate::config::FftConfig;
use crate::distributed::DistributedFft;
use crate::error::{FftError, Result};
use crate::parallel::TaskParallelFft;
use crate::sequential::SequentialFft;

/// A forward transform back-end.
///
/// Implementations validate the input length before doing any work, never
/// mutate the input, and return a freshly allocated spectrum of the same
/// length. All of them are safe to call concurrently on different inputs.
pub trait FftEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(&self, input: &SpectrumBuffer) -> Result<SpectrumBuffer>;
}

/// Selectable back-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    Sequential,
    TaskParallel,
    Distributed,
}

impl Backend {
    pub const ALL: [Backend; 3] = [
        Backend::Sequential,
        Backend::TaskParallel,
        Backend::Distributed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sequential => "sequential",
            Backend::TaskParallel => "task-parallel",
            Backend::Distributed => "distributed",
        }
    }

    /// Builds the back-end with the knobs from `config`.
    pub fn build(self, config: &FftConfig) -> Result<Box<dyn FftEngine>> {
        Ok(match self {
            Backend::Sequential => Box::new(SequentialFft::new()),
            Backend::TaskParallel => Box::new(TaskParallelFft::from_config(config)?),
            Backend::Distributed => Box::new(DistributedFft::from_config(config)),
        })
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = FftError;

    fn from_str(s: &str) -> Result<Self> {
        Backend::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| {
                FftError::InvalidInput(format!(
                    "unknown backend '{s}' (expected sequential, task-parallel or distributed)"
                ))
            })
    }
}
