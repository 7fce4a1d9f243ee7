//! # Distributed FFT Module
//!
//! Coordinator/worker DFT over a fixed group of P ranks.
//!
//! ## Protocol (one round)
//! 1. The coordinator (rank 0) broadcasts the full input to every rank
//! 2. Each rank derives its own [`WorkerSlice`] from `(rank, P, N)`
//! 3. Each rank computes its bins by direct summation over all N samples
//! 4. The coordinator gathers the bins, placing each slice at its `start_bin`
//!    and tells every rank whether the round completed
//!
//! The per-rank protocol ([`run_rank`]) is generic over [`Collective`], so it
//! runs unchanged over any transport. [`DistributedFft`] runs it on scoped
//! threads connected by an in-process channel group.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::buffer::SpectrumBuffer;
use crate::collective::{ChannelEndpoint, Collective, channel_group};
use crate::complex::ComplexSample;
use crate::config::{DEFAULT_COLLECTIVE_TIMEOUT_MS, FftConfig};
use crate::dft::dft_bin;
use crate::engine::FftEngine;
use crate::error::{FftError, Result};
use crate::partition::{WorkerSlice, partition};

/// Rank that owns the input and receives the gathered spectrum.
pub const COORDINATOR: usize = 0;

pub const DEFAULT_WORKERS: usize = 4;

/// Runs one rank's share of a distributed round.
///
/// # Arguments
/// * `comm` - This rank's endpoint into the group
/// * `input` - The full input on the coordinator, `None` on every other rank
///
/// # Returns
/// * `Ok(Some(spectrum))` - On the coordinator, the complete spectrum in bin order
/// * `Ok(None)` - On every other rank, once the coordinator has the whole spectrum
/// * `Err(e)` - A collective failed or the partition was invalid; when the
///   round fails every rank returns an error
pub fn run_rank<C: Collective>(
    comm: &C,
    input: Option<&[ComplexSample]>,
) -> Result<Option<Vec<ComplexSample>>> {
    let samples = comm.broadcast(COORDINATOR, input)?;
    let n = samples.len();

    let slice = WorkerSlice::for_rank(comm.rank(), comm.size(), n)?;
    let local: Vec<ComplexSample> = slice.range().map(|k| dft_bin(&samples, k)).collect();
    trace!(
        rank = comm.rank(),
        start = slice.start_bin,
        end = slice.end_bin,
        "local bins computed"
    );

    let slices = partition(n, comm.size())?;
    comm.gather(COORDINATOR, &local, &slices)
}

/// Distributed back-end: P ranks, each computing a contiguous range of bins.
#[derive(Debug, Clone)]
pub struct DistributedFft {
    workers: usize,
    timeout: Duration,
}

impl Default for DistributedFft {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_millis(DEFAULT_COLLECTIVE_TIMEOUT_MS),
        }
    }
}

impl DistributedFft {
    /// Creates a back-end with a group of `workers` ranks.
    ///
    /// A group of zero is rejected at transform time.
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_config(config: &FftConfig) -> Self {
        Self::new(config.workers).with_timeout(config.collective_timeout())
    }

    /// Runs `body` once per rank on scoped threads and returns the
    /// coordinator's spectrum. A rank that errors or panics aborts the round.
    fn run_round<F>(&self, input: &SpectrumBuffer, body: F) -> Result<SpectrumBuffer>
    where
        F: Fn(&ChannelEndpoint, Option<&[ComplexSample]>) -> Result<Option<Vec<ComplexSample>>>
            + Sync,
    {
        let group = channel_group(self.workers, self.timeout)?;
        debug!(len = input.len(), workers = self.workers, "distributed round");
        let body = &body;

        let outcomes: Vec<Result<Option<Vec<ComplexSample>>>> = thread::scope(|s| {
            let handles: Vec<_> = group
                .into_iter()
                .map(|endpoint| {
                    let rank = endpoint.rank();
                    let own_input = (rank == COORDINATOR).then_some(input.as_slice());
                    let handle = s.spawn(move || {
                        panic::catch_unwind(AssertUnwindSafe(|| body(&endpoint, own_input)))
                            .unwrap_or_else(|_| Err(rank_panicked(rank)))
                            .inspect_err(|e| {
                                warn!(rank, error = %e, "rank aborted the round");
                                endpoint.abort(&e.to_string());
                            })
                    });
                    (rank, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(rank, handle)| handle.join().unwrap_or_else(|_| Err(rank_panicked(rank))))
                .collect()
        });

        // The round is all-or-nothing: any failed rank fails the transform.
        let mut coordinator = None;
        for (rank, outcome) in outcomes.into_iter().enumerate() {
            match outcome? {
                Some(spectrum) if rank == COORDINATOR => coordinator = Some(spectrum),
                _ => {}
            }
        }

        coordinator.map(SpectrumBuffer::new).ok_or_else(|| {
            FftError::collective("gather", "coordinator produced no spectrum")
        })
    }
}

fn rank_panicked(rank: usize) -> FftError {
    FftError::collective("round", format!("rank {rank} panicked"))
}

impl FftEngine for DistributedFft {
    fn name(&self) -> &'static str {
        "distributed"
    }

    fn transform(&self, input: &SpectrumBuffer) -> Result<SpectrumBuffer> {
        input.validate_power_of_two()?;
        self.run_round(input, run_rank::<ChannelEndpoint>)
    }
}
