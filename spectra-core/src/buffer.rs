//! # Spectrum Buffer Module
//!
//! An ordered, fixed-length sequence of complex samples. The same type
//! holds a time-domain signal and its frequency-domain transform; after a
//! transform, index `k` is frequency bin `k`.
//!
//! Buffers handed to a back-end are never mutated. Every transform
//! allocates a fresh output buffer of the same length.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::complex::ComplexSample;
use crate::error::{FftError, Result};

/// Ordered sequence of complex samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpectrumBuffer(Vec<ComplexSample>);

impl SpectrumBuffer {
    pub fn new(samples: Vec<ComplexSample>) -> Self {
        Self(samples)
    }

    /// A buffer of `n` zero samples.
    pub fn zeros(n: usize) -> Self {
        Self(vec![ComplexSample::new(0.0, 0.0); n])
    }

    /// Builds a buffer from real samples, with every imaginary part zero.
    pub fn from_real(samples: &[f64]) -> Self {
        Self(samples.iter().map(|&re| ComplexSample::new(re, 0.0)).collect())
    }

    pub fn as_slice(&self) -> &[ComplexSample] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<ComplexSample> {
        self.0
    }

    /// Checks the radix-2 precondition: the length must be a power of two.
    ///
    /// An empty buffer is rejected as well, since zero is not a power of two.
    pub fn validate_power_of_two(&self) -> Result<()> {
        let n = self.0.len();
        if n.is_power_of_two() {
            Ok(())
        } else {
            Err(FftError::InvalidInput(format!(
                "sequence length {n} is not a power of two"
            )))
        }
    }

    /// Calculates the magnitude of every bin.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.0.iter().map(|c| c.norm()).collect()
    }

    /// Largest absolute difference between matching real or imaginary
    /// components of two equal-length buffers.
    ///
    /// # Returns
    /// * `Some(diff)` - Maximum per-component deviation
    /// * `None` - The buffers have different lengths
    pub fn max_abs_diff(&self, other: &SpectrumBuffer) -> Option<f64> {
        if self.len() != other.len() {
            return None;
        }
        let diff = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a.re - b.re).abs().max((a.im - b.im).abs()))
            .fold(0.0, f64::max);
        Some(diff)
    }

    /// Multiplies every sample by the complex scalar `a`.
    pub fn scale(&self, a: ComplexSample) -> SpectrumBuffer {
        Self(self.0.iter().map(|&c| c * a).collect())
    }

    /// Element-wise sum of two equal-length buffers.
    pub fn add(&self, other: &SpectrumBuffer) -> Result<SpectrumBuffer> {
        if self.len() != other.len() {
            return Err(FftError::InvalidInput(format!(
                "length mismatch: {} vs {}",
                self.len(),
                other.len()
            )));
        }
        Ok(Self(
            self.0.iter().zip(other.0.iter()).map(|(&a, &b)| a + b).collect(),
        ))
    }
}

impl Deref for SpectrumBuffer {
    type Target = [ComplexSample];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<ComplexSample>> for SpectrumBuffer {
    fn from(samples: Vec<ComplexSample>) -> Self {
        Self(samples)
    }
}

impl FromIterator<ComplexSample> for SpectrumBuffer {
    fn from_iter<I: IntoIterator<Item = ComplexSample>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
