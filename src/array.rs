//! Owned N-dimensional sample grid.
//!
//! Row-major layout: the last axis is contiguous in memory.

use alloc::vec::Vec;

use crate::error::AnalyticError;
use crate::region::ImageRegion;

#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<T, const D: usize> {
    shape: [usize; D],
    data: Vec<T>,
}

impl<T: Copy, const D: usize> NdArray<T, D> {
    /// Wrap `data` laid out row-major over `shape`.
    pub fn new(shape: [usize; D], data: Vec<T>) -> Result<Self, AnalyticError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(AnalyticError::ShapeMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn filled(shape: [usize; D], value: T) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: alloc::vec![value; len],
        }
    }

    /// Build an array by evaluating `f` at every index in row-major order.
    pub fn from_fn(shape: [usize; D], mut f: impl FnMut([usize; D]) -> T) -> Self {
        let data = ImageRegion::from_size(shape).indices().map(&mut f).collect();
        Self { shape, data }
    }

    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    /// Element strides per axis.
    pub fn strides(&self) -> [usize; D] {
        let mut strides = [1; D];
        for axis in (0..D.saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }
        strides
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Flat offset of `index`, or `None` when out of bounds.
    pub fn offset(&self, index: [usize; D]) -> Option<usize> {
        let strides = self.strides();
        let mut offset = 0;
        for axis in 0..D {
            if index[axis] >= self.shape[axis] {
                return None;
            }
            offset += index[axis] * strides[axis];
        }
        Some(offset)
    }

    pub fn get(&self, index: [usize; D]) -> Option<&T> {
        self.offset(index).map(|o| &self.data[o])
    }

    pub fn get_mut(&mut self, index: [usize; D]) -> Option<&mut T> {
        self.offset(index).map(move |o| &mut self.data[o])
    }

    /// Region covering the whole array.
    pub fn largest_region(&self) -> ImageRegion<D> {
        ImageRegion::from_size(self.shape)
    }

    pub fn map<U: Copy>(&self, f: impl FnMut(&T) -> U) -> NdArray<U, D> {
        NdArray {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }
}
