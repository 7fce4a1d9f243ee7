//! # Sequential FFT Module
//!
//! Recursive radix-2 Cooley-Tukey transform on a single thread.
//!
//! Each recursion frame splits its input into freshly allocated even and
//! odd halves, transforms them, and combines them into a fresh output.
//! Frames share no mutable state, which is what lets the task-parallel
//! back-end run the two halves concurrently.

use tracing::debug;

use crate::buffer::SpectrumBuffer;
use crate::complex::{ComplexSample, twiddle};
use crate::engine::FftEngine;
use crate::error::Result;

/// Single-threaded recursive Cooley-Tukey back-end.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialFft;

impl SequentialFft {
    pub fn new() -> Self {
        Self
    }
}

impl FftEngine for SequentialFft {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn transform(&self, input: &SpectrumBuffer) -> Result<SpectrumBuffer> {
        input.validate_power_of_two()?;
        debug!(len = input.len(), "sequential transform");
        Ok(SpectrumBuffer::new(fft_recursive(input)))
    }
}

/// Splits `x` into its even- and odd-indexed samples, preserving order.
pub(crate) fn split_even_odd(x: &[ComplexSample]) -> (Vec<ComplexSample>, Vec<ComplexSample>) {
    let half = x.len() / 2;
    let mut even = Vec::with_capacity(half);
    let mut odd = Vec::with_capacity(half);
    for pair in x.chunks_exact(2) {
        even.push(pair[0]);
        odd.push(pair[1]);
    }
    (even, odd)
}

/// The butterfly for output index `k` of an `n`-point frame.
///
/// Returns `(X[k], X[k + n/2])`.
#[inline]
pub(crate) fn butterfly(
    even: ComplexSample,
    odd: ComplexSample,
    k: usize,
    n: usize,
) -> (ComplexSample, ComplexSample) {
    let t = twiddle(k, n) * odd;
    (even + t, even - t)
}

/// Recursive transform. The length must already be a power of two.
pub(crate) fn fft_recursive(x: &[ComplexSample]) -> Vec<ComplexSample> {
    let n = x.len();
    if n <= 1 {
        return x.to_vec();
    }

    let (even, odd) = split_even_odd(x);
    let even = fft_recursive(&even);
    let odd = fft_recursive(&odd);

    let half = n / 2;
    let mut out = vec![ComplexSample::new(0.0, 0.0); n];
    for k in 0..half {
        let (lo, hi) = butterfly(even[k], odd[k], k, n);
        out[k] = lo;
        out[k + half] = hi;
    }
    out
}
