//! Analytic signal construction.
//!
//! The analytic signal of a real line `f` is `F⁻¹(F(k) · 2U(k))`: the DC
//! bin is kept, positive frequencies are doubled, negative frequencies are
//! dropped. For even lengths the Nyquist bin `L/2` belongs to neither half
//! and is kept at unit gain.

use alloc::vec::Vec;

use crate::array::NdArray;
use crate::error::AnalyticError;
use crate::fft::{Complex, FftImpl, Float, ScalarFftImpl};

/// Real multiplier `2U(k)` for bin `k` of a length-`len` spectrum.
pub fn mask_multiplier<T: Float>(k: usize, len: usize) -> T {
    if k == 0 {
        return T::one();
    }
    if len % 2 == 0 && k == len / 2 {
        return T::one();
    }
    // Positive frequencies occupy 1..ceil(len/2) for both parities.
    if k < len.div_ceil(2) {
        T::two()
    } else {
        T::zero()
    }
}

/// Multiply every bin of one line's spectrum by [`mask_multiplier`].
pub fn apply_analytic_mask<T: Float>(spectrum: &mut [Complex<T>]) {
    let len = spectrum.len();
    for (k, bin) in spectrum.iter_mut().enumerate() {
        *bin = bin.scale(mask_multiplier(k, len));
    }
}

/// Analytic signal of a single real line.
///
/// The real part of the result reproduces `input`; the imaginary part is
/// its Hilbert transform. Any length is accepted.
///
/// # Examples
/// ```
/// use analytic_nd::analytic::analytic_signal;
/// let x = [1.0f64, 0.0, -1.0, 0.0];
/// let a = analytic_signal(&x).unwrap();
/// assert!((a[0].re - 1.0).abs() < 1e-12);
/// assert!((a[1].im - 1.0).abs() < 1e-12);
/// ```
pub fn analytic_signal<T: Float>(input: &[T]) -> Result<Vec<Complex<T>>, AnalyticError> {
    let mut line: Vec<Complex<T>> = input.iter().map(|&x| Complex::from_re(x)).collect();
    if line.is_empty() {
        return Ok(line);
    }
    let fft = ScalarFftImpl::<T>::default();
    fft.fft(&mut line)?;
    apply_analytic_mask(&mut line);
    fft.ifft(&mut line)?;
    Ok(line)
}

/// Instantaneous amplitude `|a|` of an analytic array.
pub fn envelope<T: Float, const D: usize>(analytic: &NdArray<Complex<T>, D>) -> NdArray<T, D> {
    analytic.map(|c| c.norm())
}

/// Instantaneous phase `arg(a)` in `(-π, π]` of an analytic array.
pub fn instantaneous_phase<T: Float, const D: usize>(
    analytic: &NdArray<Complex<T>, D>,
) -> NdArray<T, D> {
    analytic.map(|c| c.arg())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;
    use alloc::vec;
    use core::f64::consts::PI;

    #[test]
    fn mask_even_length() {
        let m: Vec<f64> = (0..8).map(|k| mask_multiplier(k, 8)).collect();
        assert_eq!(m, vec![1.0, 2.0, 2.0, 2.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn mask_odd_length() {
        let m: Vec<f64> = (0..7).map(|k| mask_multiplier(k, 7)).collect();
        assert_eq!(m, vec![1.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn mask_tiny_lengths() {
        assert_eq!(mask_multiplier::<f32>(0, 1), 1.0);
        assert_eq!(mask_multiplier::<f32>(1, 2), 1.0);
        assert_eq!(mask_multiplier::<f32>(1, 3), 2.0);
        assert_eq!(mask_multiplier::<f32>(2, 3), 0.0);
    }

    #[test]
    fn mask_propagates_non_finite() {
        let mut line = vec![Complex64::new(f64::NAN, 0.0); 4];
        apply_analytic_mask(&mut line);
        assert!(line.iter().all(|c| c.re.is_nan()));
    }

    #[test]
    fn cosine_becomes_complex_exponential() {
        let n = 16;
        let f = 3.0;
        let x: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * f * i as f64 / n as f64).cos())
            .collect();
        let a = analytic_signal(&x).unwrap();
        for (i, c) in a.iter().enumerate() {
            let phase = 2.0 * PI * f * i as f64 / n as f64;
            assert!((c.re - phase.cos()).abs() < 1e-10);
            assert!((c.im - phase.sin()).abs() < 1e-10);
        }
    }

    #[test]
    fn odd_length_keeps_real_part() {
        let x = [0.3f64, -1.2, 2.5, 0.0, 4.1];
        let a = analytic_signal(&x).unwrap();
        for (c, &v) in a.iter().zip(x.iter()) {
            assert!((c.re - v).abs() < 1e-10);
        }
    }

    #[test]
    fn empty_line_is_empty() {
        assert!(analytic_signal::<f32>(&[]).unwrap().is_empty());
    }

    #[test]
    fn envelope_of_exponential_is_flat() {
        let n = 32;
        let line: Vec<Complex64> = (0..n)
            .map(|i| Complex64::expi(2.0 * PI * 5.0 * i as f64 / n as f64).scale(3.0))
            .collect();
        let arr = NdArray::new([n], line).unwrap();
        let env = envelope(&arr);
        assert!(env.as_slice().iter().all(|&v| (v - 3.0).abs() < 1e-12));
        let phase = instantaneous_phase(&arr);
        assert!(phase.as_slice()[0].abs() < 1e-12);
    }
}
