//! # analytic-nd - Analytic signals of N-dimensional arrays
//!
//! Computes the discrete analytic signal of a real array along one chosen
//! axis: every 1-D line along that axis is transformed to the frequency
//! domain, multiplied by the `2U(k)` step mask, and transformed back. The
//! real part of the result reproduces the input, the imaginary part is its
//! Hilbert transform, and the modulus is the envelope used for e.g.
//! ultrasound B-mode imaging.
//!
//! ## Features
//!
//! - **Any line length**: radix-2 FFT for powers of two, Bluestein otherwise
//! - **Axis-aware parallelism**: work is split into regions that never cut a
//!   line, so results are bit-identical for any worker count
//! - **Spectral hooks**: an optional shared per-line filter runs on the raw
//!   spectrum before masking
//! - **Cached execution**: [`AnalyticSignalFilter::update`] only recomputes
//!   after a configuration or input change
//!
//! ## Cargo Features
//!
//! - `std` (default): worker-count discovery and environment configuration
//! - `parallel` (default): Rayon-backed region execution
//! - `verbose-logging`: `log` records from the stage and executor
//!
//! ## Configuration
//!
//! `ANALYTIC_ND_THREADS` sets the default worker count; see
//! [`executor::configured_workers`].
//!
//! ## Example
//!
//! ```
//! use analytic_nd::{AnalyticSignalFilter, NdArray};
//!
//! let input = NdArray::new([8], vec![1.0f64, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0, 0.0]).unwrap();
//! let mut filter = AnalyticSignalFilter::<f64, 1>::new(0).unwrap();
//! let analytic = filter.update(&input).unwrap();
//! assert!((analytic.as_slice()[1].im - 1.0).abs() < 1e-9);
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
extern crate alloc;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        log::debug!($($arg)*);
    };
}

macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        log::trace!($($arg)*);
    };
}

pub mod num;

/// One-dimensional FFT primitives
///
/// Radix-2 and Bluestein transforms behind the [`fft::FftImpl`] trait.
pub mod fft;

pub mod error;

/// N-dimensional sample container.
pub mod array;

/// Regions of the index domain and direction-aware splitting.
pub mod region;

/// Forward and inverse per-line transforms along an axis.
pub mod transform;

/// Spectral filter hooks
///
/// Per-line frequency-domain filters applied before the analytic mask.
pub mod spectral;

/// Analytic mask and single-line helpers
pub mod analytic;

/// Region-parallel stage execution.
pub mod executor;

pub mod filter;

pub use array::NdArray;
pub use error::AnalyticError;
pub use executor::Executor;
pub use filter::{AnalyticSignalFilter, SharedSpectralFilter};
pub use num::{Complex, Complex32, Complex64, Float};
pub use region::{DirectionalRegionSplitter, ImageRegion, RegionSplitter};
pub use spectral::{ButterworthBandpass, FrequencyDomainFilter, SpectralFilter};
