// spectra-core/src/lib.rs

//! The core logic of the spectra FFT engine.
//! This crate computes forward discrete Fourier transforms of complex
//! power-of-two sequences with three interchangeable back-ends:
//! a sequential recursive Cooley-Tukey transform, a fork-join task-parallel
//! version of it, and a distributed coordinator/worker direct DFT.
//! It is completely headless and contains no printing or CLI code.

pub mod buffer;
pub mod collective;
pub mod complex;
pub mod config;
pub mod dft;
pub mod distributed;
pub mod engine;
pub mod error;
pub mod parallel;
pub mod partition;
pub mod sequential;
pub mod signal;

pub use buffer::SpectrumBuffer;
pub use complex::{ComplexSample, twiddle};
pub use config::FftConfig;
pub use dft::{direct_dft, planned_fft};
pub use distributed::DistributedFft;
pub use engine::{Backend, FftEngine};
pub use error::{FftError, Result};
pub use parallel::TaskParallelFft;
pub use partition::{WorkerSlice, partition};
pub use sequential::SequentialFft;
