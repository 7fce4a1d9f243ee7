//! # Partition Module
//!
//! Assignment of frequency bins to the workers of a distributed round.
//!
//! Every worker derives its own slice from `(rank, workers, n)` alone, so
//! the partition needs no communication. Non-final workers get `n / workers`
//! bins (floor); the last worker absorbs the remainder and always ends at `n`.

use std::ops::Range;

use crate::error::{FftError, Result};

/// Half-open range `[start_bin, end_bin)` of bins owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSlice {
    pub start_bin: usize,
    pub end_bin: usize,
}

impl WorkerSlice {
    /// Computes the slice owned by `rank` in a group of `workers` over `n` bins.
    ///
    /// # Returns
    /// * `Ok(slice)` - The rank's bin range, possibly empty when `workers > n`
    /// * `Err(FftError::InvalidInput)` - `workers` is zero or `rank` is out of range
    pub fn for_rank(rank: usize, workers: usize, n: usize) -> Result<Self> {
        if workers == 0 {
            return Err(FftError::InvalidInput(
                "worker group must have at least one member".into(),
            ));
        }
        if rank >= workers {
            return Err(FftError::InvalidInput(format!(
                "rank {rank} outside group of {workers} workers"
            )));
        }

        let per_worker = n / workers;
        let start_bin = rank * per_worker;
        let end_bin = if rank == workers - 1 {
            n
        } else {
            start_bin + per_worker
        };
        Ok(Self { start_bin, end_bin })
    }

    pub fn len(&self) -> usize {
        self.end_bin - self.start_bin
    }

    pub fn is_empty(&self) -> bool {
        self.start_bin == self.end_bin
    }

    pub fn range(&self) -> Range<usize> {
        self.start_bin..self.end_bin
    }
}

/// Slices for every rank of the group, in rank order.
pub fn partition(n: usize, workers: usize) -> Result<Vec<WorkerSlice>> {
    if workers == 0 {
        return Err(FftError::InvalidInput(
            "worker group must have at least one member".into(),
        ));
    }
    (0..workers)
        .map(|rank| WorkerSlice::for_rank(rank, workers, n))
        .collect()
}
