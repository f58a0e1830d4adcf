//! One-dimensional FFT primitives.
//!
//! Power-of-two lengths use an iterative radix-2 Cooley–Tukey kernel; every
//! other length goes through Bluestein's chirp-z algorithm, so lines of any
//! extent can be transformed. A [`FftPlanner`] caches twiddle tables and
//! Bluestein chirps keyed by length. The inverse transform is scaled by `1/n`
//! so `ifft(fft(x)) == x` up to rounding.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;

pub use crate::num::{Complex, Complex32, Complex64, Float};
use crate::num::usize_to_float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    EmptyInput,
}

impl core::fmt::Display for FftError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FftError::EmptyInput => f.write_str("FFT input is empty"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

type BluesteinPair<T> = (Arc<[Complex<T>]>, Arc<[Complex<T>]>);

/// Cloning shares the cached tables.
#[derive(Clone)]
pub struct FftPlanner<T: Float> {
    /// Twiddle tables keyed by transform size `n`. The table for `n` has
    /// `n/2` entries holding `exp(-2πi k / n)`.
    cache: HashMap<usize, Arc<[Complex<T>]>>,
    bluestein_cache: HashMap<usize, BluesteinPair<T>>,
}

impl<T: Float> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FftPlanner<T> {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            bluestein_cache: HashMap::new(),
        }
    }

    /// Build every table a length-`n` transform needs.
    pub fn prepare(&mut self, n: usize) {
        if n <= 1 {
            return;
        }
        if n.is_power_of_two() {
            self.get_twiddles(n);
        } else {
            self.get_bluestein(n);
        }
    }

    /// `true` when [`prepare`](Self::prepare) already ran for length `n`.
    pub fn is_planned(&self, n: usize) -> bool {
        n <= 1
            || if n.is_power_of_two() {
                self.cache.contains_key(&n)
            } else {
                self.bluestein_cache.contains_key(&n)
            }
    }

    /// Retrieve the twiddle table for a power-of-two size `n`.
    pub fn get_twiddles(&mut self, n: usize) -> Arc<[Complex<T>]> {
        let table = self.cache.entry(n).or_insert_with(|| {
            let half = n / 2;
            let n_f = usize_to_float::<T>(n);
            let table: Vec<Complex<T>> = (0..half)
                .map(|k| {
                    let angle = -T::two() * T::pi() * usize_to_float::<T>(k) / n_f;
                    Complex::expi(angle)
                })
                .collect();
            Arc::from(table)
        });
        Arc::clone(table)
    }

    /// Chirp `exp(-iπk²/n)` and the forward FFT of the padded conjugate chirp
    /// used by Bluestein's algorithm for a length-`n` transform.
    pub fn get_bluestein(&mut self, n: usize) -> BluesteinPair<T> {
        if let Some(pair) = self.bluestein_cache.get(&n) {
            return (Arc::clone(&pair.0), Arc::clone(&pair.1));
        }
        let m = (2 * n - 1).next_power_of_two();
        let n_f = usize_to_float::<T>(n);
        let mut chirp: Vec<Complex<T>> = Vec::with_capacity(n);
        let mut b: Vec<Complex<T>> = Vec::with_capacity(m);
        for i in 0..n {
            // k² mod 2n keeps the angle small for long lines.
            let k2 = (i * i) % (2 * n);
            let angle = T::pi() * usize_to_float::<T>(k2) / n_f;
            chirp.push(Complex::expi(-angle));
            b.push(Complex::expi(angle));
        }
        b.resize(m, Complex::zero());
        for i in 1..n {
            b[m - i] = b[i];
        }
        let twiddles = self.get_twiddles(m);
        radix2_in_place(&mut b, &twiddles);
        let pair: BluesteinPair<T> = (Arc::from(chirp), Arc::from(b));
        self.bluestein_cache
            .insert(n, (Arc::clone(&pair.0), Arc::clone(&pair.1)));
        pair
    }
}

pub trait FftImpl<T: Float> {
    fn fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError>;
    fn ifft(&self, input: &mut [Complex<T>]) -> Result<(), FftError>;
}

/// Iterative decimation-in-time radix-2 FFT. `input.len()` must be a power
/// of two and `twiddles` the matching table from [`FftPlanner::get_twiddles`].
fn radix2_in_place<T: Float>(input: &mut [Complex<T>], twiddles: &[Complex<T>]) {
    let n = input.len();
    if n <= 1 {
        return;
    }
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            input.swap(i, j);
        }
    }
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = n / len;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let w = twiddles[k * step];
                let a = input[start + k];
                let b = input[start + k + half].mul(w);
                input[start + k] = a.add(b);
                input[start + k + half] = a.sub(b);
            }
        }
        len <<= 1;
    }
}

/// Scalar FFT backed by a private planner. Not `Sync`: parallel callers
/// create one instance per worker.
pub struct ScalarFftImpl<T: Float> {
    planner: RefCell<FftPlanner<T>>,
}

impl<T: Float> Default for ScalarFftImpl<T> {
    fn default() -> Self {
        Self {
            planner: RefCell::new(FftPlanner::new()),
        }
    }
}

impl<T: Float> ScalarFftImpl<T> {
    pub fn with_planner(planner: FftPlanner<T>) -> Self {
        Self {
            planner: RefCell::new(planner),
        }
    }

    fn bluestein(&self, input: &mut [Complex<T>]) {
        let n = input.len();
        let (chirp_arc, fft_b_arc) = self.planner.borrow_mut().get_bluestein(n);
        let chirp = chirp_arc.as_ref();
        let fft_b = fft_b_arc.as_ref();
        let m = fft_b.len();
        let twiddles = self.planner.borrow_mut().get_twiddles(m);
        let mut a = Vec::with_capacity(m);
        for (x, &c) in input.iter().zip(chirp.iter()) {
            a.push(x.mul(c));
        }
        a.resize(m, Complex::zero());
        radix2_in_place(&mut a, &twiddles);
        for (ai, &bi) in a.iter_mut().zip(fft_b.iter()) {
            *ai = ai.mul(bi);
        }
        // Inverse via conjugation around a forward pass.
        for c in a.iter_mut() {
            *c = c.conj();
        }
        radix2_in_place(&mut a, &twiddles);
        let scale = T::one() / usize_to_float::<T>(m);
        for (out, (ai, &c)) in input.iter_mut().zip(a.iter().zip(chirp.iter())) {
            *out = ai.conj().scale(scale).mul(c);
        }
    }
}

impl<T: Float> FftImpl<T> for ScalarFftImpl<T> {
    fn fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n == 1 {
            return Ok(());
        }
        if n.is_power_of_two() {
            let twiddles = self.planner.borrow_mut().get_twiddles(n);
            radix2_in_place(input, &twiddles);
        } else {
            self.bluestein(input);
        }
        Ok(())
    }

    fn ifft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n == 1 {
            return Ok(());
        }
        for c in input.iter_mut() {
            *c = c.conj();
        }
        self.fft(input)?;
        let scale = T::one() / usize_to_float::<T>(n);
        for c in input.iter_mut() {
            *c = c.conj().scale(scale);
        }
        Ok(())
    }
}
