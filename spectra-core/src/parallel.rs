//! # Task-Parallel FFT Module
//!
//! Fork-join version of the recursive Cooley-Tukey transform on a rayon
//! thread pool.
//!
//! ## Concurrency
//! - The even and odd half-transforms of a frame run as two tasks under
//!   `rayon::join`, which returns only after both finish
//! - The combine loop writes disjoint pairs `(k, k + n/2)` and runs as a
//!   parallel iterator over the two output halves
//! - Frames no longer than `parallel_threshold` use the sequential recursion
//!
//! Every output element goes through the same floating-point operations as
//! in [`SequentialFft`](crate::sequential::SequentialFft), so both back-ends
//! produce bit-identical spectra.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::buffer::SpectrumBuffer;
use crate::complex::ComplexSample;
use crate::config::FftConfig;
use crate::engine::FftEngine;
use crate::error::{FftError, Result};
use crate::sequential::{butterfly, fft_recursive, split_even_odd};

/// Frames at or below this length run sequentially unless configured otherwise.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// Fork-join Cooley-Tukey back-end.
#[derive(Debug)]
pub struct TaskParallelFft {
    parallel_threshold: usize,
    /// Dedicated pool; `None` runs on rayon's global pool.
    pool: Option<ThreadPool>,
}

impl Default for TaskParallelFft {
    fn default() -> Self {
        Self::new(DEFAULT_PARALLEL_THRESHOLD)
    }
}

impl TaskParallelFft {
    /// Creates a back-end that schedules onto rayon's global pool.
    ///
    /// # Arguments
    /// * `parallel_threshold` - Largest frame length handled sequentially.
    ///   `0` or `1` forks at every level of the recursion.
    pub fn new(parallel_threshold: usize) -> Self {
        Self {
            parallel_threshold,
            pool: None,
        }
    }

    /// Creates a back-end with its own pool of `threads` workers.
    pub fn with_threads(parallel_threshold: usize, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("spectra-fft-{i}"))
            .build()
            .map_err(|e| FftError::ThreadPool(e.to_string()))?;
        Ok(Self {
            parallel_threshold,
            pool: Some(pool),
        })
    }

    pub fn from_config(config: &FftConfig) -> Result<Self> {
        match config.threads {
            Some(threads) => Self::with_threads(config.parallel_threshold, threads),
            None => Ok(Self::new(config.parallel_threshold)),
        }
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }
}

impl FftEngine for TaskParallelFft {
    fn name(&self) -> &'static str {
        "task-parallel"
    }

    fn transform(&self, input: &SpectrumBuffer) -> Result<SpectrumBuffer> {
        input.validate_power_of_two()?;
        debug!(
            len = input.len(),
            threshold = self.parallel_threshold,
            dedicated_pool = self.pool.is_some(),
            "task-parallel transform"
        );

        let threshold = self.parallel_threshold;
        let out = match &self.pool {
            Some(pool) => pool.install(|| fft_fork_join(input, threshold)),
            None => fft_fork_join(input, threshold),
        };
        Ok(SpectrumBuffer::new(out))
    }
}

fn fft_fork_join(x: &[ComplexSample], threshold: usize) -> Vec<ComplexSample> {
    let n = x.len();
    if n <= threshold.max(1) {
        return fft_recursive(x);
    }

    let (even, odd) = split_even_odd(x);
    let (even, odd) = rayon::join(
        || fft_fork_join(&even, threshold),
        || fft_fork_join(&odd, threshold),
    );

    let half = n / 2;
    let mut out = vec![ComplexSample::new(0.0, 0.0); n];
    let (lower, upper) = out.split_at_mut(half);
    lower
        .par_iter_mut()
        .zip(upper.par_iter_mut())
        .enumerate()
        .for_each(|(k, (lo, hi))| {
            (*lo, *hi) = butterfly(even[k], odd[k], k, n);
        });
    out
}
