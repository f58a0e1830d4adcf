//! Per-line 1-D transforms along one axis of an N-d array.
//!
//! [`ForwardTransform1D`] takes real samples to their complex spectrum and
//! [`InverseTransform1D`] takes a complex spectrum back to the signal domain.
//! Both gather each line into a contiguous buffer, transform it with an
//! [`FftImpl`], and scatter it back, so lines never interact.

use alloc::vec::Vec;

use crate::array::NdArray;
use crate::error::{check_axis, AnalyticError};
use crate::fft::{Complex, FftImpl, Float, ScalarFftImpl};
use crate::region::ImageRegion;

/// Memory geometry of the lines along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    /// Distance between consecutive samples of a line.
    pub stride: usize,
    /// Samples per line.
    pub len: usize,
}

impl LineLayout {
    pub fn of<T: Copy, const D: usize>(array: &NdArray<T, D>, axis: usize) -> Self {
        Self {
            stride: array.strides()[axis],
            len: array.shape()[axis],
        }
    }

    pub fn gather<T: Copy, U>(&self, data: &[T], base: usize, line: &mut Vec<U>, f: impl Fn(T) -> U) {
        line.clear();
        line.extend((0..self.len).map(|k| f(data[base + k * self.stride])));
    }

    pub fn scatter<T: Copy>(&self, line: &[T], base: usize, data: &mut [T]) {
        for (k, &v) in line.iter().enumerate() {
            data[base + k * self.stride] = v;
        }
    }
}

/// Real-to-complex forward FFT of every line along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardTransform1D<const D: usize> {
    axis: usize,
}

impl<const D: usize> ForwardTransform1D<D> {
    pub fn new(axis: usize) -> Result<Self, AnalyticError> {
        check_axis(axis, D)?;
        Ok(Self { axis })
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn set_axis(&mut self, axis: usize) -> Result<(), AnalyticError> {
        check_axis(axis, D)?;
        self.axis = axis;
        Ok(())
    }

    /// Copy the real line starting at `origin` into `line` as complex samples.
    pub fn load_line<T: Float>(
        &self,
        input: &NdArray<T, D>,
        origin: [usize; D],
        line: &mut Vec<Complex<T>>,
    ) -> Result<(), AnalyticError> {
        let base = input.offset(origin).ok_or(AnalyticError::InvalidRegion)?;
        LineLayout::of(input, self.axis).gather(input.as_slice(), base, line, Complex::from_re);
        Ok(())
    }

    /// Forward FFT of one loaded line. Empty lines are left untouched.
    pub fn transform_line<T: Float>(
        &self,
        fft: &impl FftImpl<T>,
        line: &mut [Complex<T>],
    ) -> Result<(), AnalyticError> {
        if !line.is_empty() {
            fft.fft(line)?;
        }
        Ok(())
    }

    /// Spectrum of every line of `input` along the configured axis.
    pub fn transform<T: Float>(
        &self,
        input: &NdArray<T, D>,
    ) -> Result<NdArray<Complex<T>, D>, AnalyticError> {
        let fft = ScalarFftImpl::<T>::default();
        let layout = LineLayout::of(input, self.axis);
        let mut output = NdArray::filled(input.shape(), Complex::zero());
        let mut line = Vec::with_capacity(layout.len);
        for origin in input.largest_region().line_origins(self.axis) {
            self.load_line(input, origin, &mut line)?;
            self.transform_line(&fft, &mut line)?;
            let base = input.offset(origin).ok_or(AnalyticError::InvalidRegion)?;
            layout.scatter(&line, base, output.as_mut_slice());
        }
        Ok(output)
    }
}

/// Complex-to-complex inverse FFT of every line along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InverseTransform1D<const D: usize> {
    axis: usize,
}

impl<const D: usize> InverseTransform1D<D> {
    pub fn new(axis: usize) -> Result<Self, AnalyticError> {
        check_axis(axis, D)?;
        Ok(Self { axis })
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn set_axis(&mut self, axis: usize) -> Result<(), AnalyticError> {
        check_axis(axis, D)?;
        self.axis = axis;
        Ok(())
    }

    pub fn load_line<T: Float>(
        &self,
        input: &NdArray<Complex<T>, D>,
        origin: [usize; D],
        line: &mut Vec<Complex<T>>,
    ) -> Result<(), AnalyticError> {
        let base = input.offset(origin).ok_or(AnalyticError::InvalidRegion)?;
        LineLayout::of(input, self.axis).gather(input.as_slice(), base, line, |c| c);
        Ok(())
    }

    /// Inverse FFT (scaled by `1/L`) of one line. Empty lines are left untouched.
    pub fn transform_line<T: Float>(
        &self,
        fft: &impl FftImpl<T>,
        line: &mut [Complex<T>],
    ) -> Result<(), AnalyticError> {
        if !line.is_empty() {
            fft.ifft(line)?;
        }
        Ok(())
    }

    pub fn transform<T: Float>(
        &self,
        input: &NdArray<Complex<T>, D>,
    ) -> Result<NdArray<Complex<T>, D>, AnalyticError> {
        self.transform_region(input, &input.largest_region())
    }

    /// Inverse transform restricted to the lines crossing `region`; samples
    /// outside those lines are copied through unchanged.
    pub fn transform_region<T: Float>(
        &self,
        input: &NdArray<Complex<T>, D>,
        region: &ImageRegion<D>,
    ) -> Result<NdArray<Complex<T>, D>, AnalyticError> {
        if !region.is_inside(&input.largest_region()) {
            return Err(AnalyticError::InvalidRegion);
        }
        let fft = ScalarFftImpl::<T>::default();
        let layout = LineLayout::of(input, self.axis);
        let mut output = input.clone();
        let mut line = Vec::with_capacity(layout.len);
        let lines = region.with_axis_extent(self.axis, 0, layout.len);
        for origin in lines.line_origins(self.axis) {
            self.load_line(input, origin, &mut line)?;
            self.transform_line(&fft, &mut line)?;
            let base = input.offset(origin).ok_or(AnalyticError::InvalidRegion)?;
            layout.scatter(&line, base, output.as_mut_slice());
        }
        Ok(output)
    }
}
