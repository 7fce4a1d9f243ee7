//! # Direct DFT Module
//!
//! Reference transforms used to check the fast back-ends.
//!
//! ## Features
//! - O(N²) direct summation, valid for any length
//! - A single-bin kernel shared with the distributed workers
//! - A planned transform from RustFFT as an independent second reference

use std::f64::consts::PI;

use rustfft::FftPlanner;

use crate::buffer::SpectrumBuffer;
use crate::complex::ComplexSample;

/// Computes one frequency bin `X[k] = Σ x[n]·exp(-2πi·k·n/N)`.
///
/// The angle is evaluated as `-2π·k·n/N` left to right. Distributed workers
/// call this same kernel, which keeps their bins identical to
/// [`direct_dft`].
pub fn dft_bin(x: &[ComplexSample], k: usize) -> ComplexSample {
    let len = x.len() as f64;
    let mut sum = ComplexSample::new(0.0, 0.0);
    for (n, &sample) in x.iter().enumerate() {
        let angle = -2.0 * PI * k as f64 * n as f64 / len;
        sum += sample * ComplexSample::new(angle.cos(), angle.sin());
    }
    sum
}

/// Direct O(N²) discrete Fourier transform.
///
/// Accepts any length, including zero.
pub fn direct_dft(x: &SpectrumBuffer) -> SpectrumBuffer {
    (0..x.len()).map(|k| dft_bin(x, k)).collect()
}

/// Forward transform through the RustFFT planner.
///
/// # Arguments
/// * `x` - Time-domain samples of any length
///
/// # Returns
/// * `SpectrumBuffer` - Complex frequency spectrum
pub fn planned_fft(x: &SpectrumBuffer) -> SpectrumBuffer {
    if x.is_empty() {
        return SpectrumBuffer::default();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(x.len());

    let mut buffer = x.to_vec();
    fft.process(&mut buffer);
    SpectrumBuffer::new(buffer)
}
