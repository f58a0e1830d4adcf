//! Spectral filter hooks applied to each line's spectrum before the
//! analytic mask.
//!
//! Hooks are shared (`Arc<dyn SpectralFilter<T>>`) and may be attached to
//! several stages at once, so their axis lives behind interior mutability.

use alloc::vec::Vec;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AnalyticError;
use crate::fft::{Complex, Float};
use crate::num::usize_to_float;

/// Per-line frequency-domain transform.
pub trait SpectralFilter<T: Float>: Send + Sync {
    /// Axis the hook currently expects its lines to run along.
    fn axis(&self) -> usize;

    /// Called by the owning stage whenever its axis changes.
    fn set_axis(&self, axis: usize);

    /// Filter the spectrum of one line. The vector may be replaced, but the
    /// stage rejects a result whose length differs from the line length.
    fn filter_line(&self, spectrum: &mut Vec<Complex<T>>) -> Result<(), AnalyticError>;
}

/// Atomic axis storage for hook implementations.
#[derive(Debug, Default)]
pub struct AxisCell(AtomicUsize);

impl AxisCell {
    pub fn new(axis: usize) -> Self {
        Self(AtomicUsize::new(axis))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, axis: usize) {
        self.0.store(axis, Ordering::Release);
    }
}

/// Real gain as a function of normalized frequency in `[0, 0.5]`.
pub trait FrequencyResponse<T: Float>: Send + Sync {
    fn evaluate(&self, normalized_frequency: T) -> T;
}

impl<T: Float, F> FrequencyResponse<T> for F
where
    F: Fn(T) -> T + Send + Sync,
{
    fn evaluate(&self, normalized_frequency: T) -> T {
        self(normalized_frequency)
    }
}

/// Butterworth band-pass gain: the product of a high-pass at `lower` and a
/// low-pass at `upper`, both of the given order. Cutoffs are normalized
/// frequencies; `lower == 0` disables the high-pass half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterworthBandpass<T: Float> {
    pub lower: T,
    pub upper: T,
    pub order: u32,
}

impl<T: Float> ButterworthBandpass<T> {
    pub fn new(lower: T, upper: T, order: u32) -> Self {
        Self {
            lower,
            upper,
            order: order.max(1),
        }
    }
}

impl<T: Float> FrequencyResponse<T> for ButterworthBandpass<T> {
    fn evaluate(&self, f: T) -> T {
        let two_n = 2 * self.order;
        let low_pass = T::one() / (T::one() + (f / self.upper).powi(two_n)).sqrt();
        let high_pass = if self.lower <= T::zero() {
            T::one()
        } else if f <= T::zero() {
            T::zero()
        } else {
            T::one() / (T::one() + (self.lower / f).powi(two_n)).sqrt()
        };
        low_pass * high_pass
    }
}

/// Hook that weights bin `k` of a length-`L` line by
/// `response(min(k, L - k) / L)`, treating positive and negative frequencies
/// symmetrically.
pub struct FrequencyDomainFilter<T: Float, R: FrequencyResponse<T>> {
    axis: AxisCell,
    response: R,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Float, R: FrequencyResponse<T>> FrequencyDomainFilter<T, R> {
    pub fn new(response: R) -> Self {
        Self {
            axis: AxisCell::new(0),
            response,
            _marker: PhantomData,
        }
    }

    pub fn response(&self) -> &R {
        &self.response
    }

    /// Gain applied to bin `k` of a line of length `len`. Bins past the end
    /// fold like bin `len`, i.e. DC.
    pub fn gain(&self, k: usize, len: usize) -> T {
        if len == 0 {
            return self.response.evaluate(T::zero());
        }
        let k = k.min(len);
        let folded = k.min(len - k);
        self.response
            .evaluate(usize_to_float::<T>(folded) / usize_to_float::<T>(len))
    }
}

impl<T: Float, R: FrequencyResponse<T>> core::fmt::Debug for FrequencyDomainFilter<T, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrequencyDomainFilter")
            .field("axis", &self.axis.get())
            .finish_non_exhaustive()
    }
}

impl<T: Float, R: FrequencyResponse<T>> SpectralFilter<T> for FrequencyDomainFilter<T, R> {
    fn axis(&self) -> usize {
        self.axis.get()
    }

    fn set_axis(&self, axis: usize) {
        self.axis.set(axis);
    }

    fn filter_line(&self, spectrum: &mut Vec<Complex<T>>) -> Result<(), AnalyticError> {
        let len = spectrum.len();
        for (k, bin) in spectrum.iter_mut().enumerate() {
            *bin = bin.scale(self.gain(k, len));
        }
        Ok(())
    }
}
