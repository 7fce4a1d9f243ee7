//! # Configuration Module
//!
//! Tuning knobs for the back-ends. Every field has a default so a partial
//! JSON file (or none at all) is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::distributed::DEFAULT_WORKERS;
use crate::engine::Backend;
use crate::parallel::DEFAULT_PARALLEL_THRESHOLD;

/// Default bound on any blocking receive inside a collective.
pub const DEFAULT_COLLECTIVE_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FftConfig {
    /// Back-end used when the caller does not pick one explicitly.
    pub backend: Backend,
    /// Largest frame the task-parallel back-end transforms sequentially.
    pub parallel_threshold: usize,
    /// Size of a dedicated task-parallel pool; `None` uses rayon's global pool.
    pub threads: Option<usize>,
    /// Group size P of the distributed back-end.
    pub workers: usize,
    pub collective_timeout_ms: u64,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sequential,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            threads: None,
            workers: DEFAULT_WORKERS,
            collective_timeout_ms: DEFAULT_COLLECTIVE_TIMEOUT_MS,
        }
    }
}

impl FftConfig {
    pub fn collective_timeout(&self) -> Duration {
        Duration::from_millis(self.collective_timeout_ms)
    }
}
