//! # Signal Module
//!
//! Test and demo signals. The canonical demo input is one period of a sine
//! wave over eight samples, `x[i] = sin(2π·i/8)`.

use std::f64::consts::PI;

use rand::Rng;

use crate::buffer::SpectrumBuffer;
use crate::complex::ComplexSample;

/// Real sine wave with `cycles` full periods over `n` samples.
pub fn sine_wave(n: usize, cycles: f64) -> SpectrumBuffer {
    (0..n)
        .map(|i| ComplexSample::new((2.0 * PI * cycles * i as f64 / n as f64).sin(), 0.0))
        .collect()
}

/// Unit impulse: `x[0] = 1`, every other sample zero.
pub fn impulse(n: usize) -> SpectrumBuffer {
    (0..n)
        .map(|i| ComplexSample::new(if i == 0 { 1.0 } else { 0.0 }, 0.0))
        .collect()
}

pub fn constant(n: usize, value: ComplexSample) -> SpectrumBuffer {
    SpectrumBuffer::new(vec![value; n])
}

/// Complex noise with both components uniform in `[-1, 1)`.
pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> SpectrumBuffer {
    (0..n)
        .map(|_| ComplexSample::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
        .collect()
}
