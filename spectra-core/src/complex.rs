//! # Complex Sample Module
//!
//! The scalar type shared by every back-end and the single definition of
//! the twiddle factor, so the sign of the exponent lives in one place.

use std::f64::consts::PI;

/// One complex amplitude. Value semantics; arithmetic comes from `num_complex`.
pub type ComplexSample = num_complex::Complex64;

/// Computes the twiddle factor `exp(-2πi·k/n)`.
///
/// The angle is evaluated as `-2π·k/n` in exactly that order so the
/// sequential and task-parallel back-ends round identically.
///
/// # Arguments
/// * `k` - Output index within the current butterfly (`0..n/2`)
/// * `n` - Length of the transform frame being combined
#[inline]
pub fn twiddle(k: usize, n: usize) -> ComplexSample {
    ComplexSample::from_polar(1.0, -2.0 * PI * k as f64 / n as f64)
}
