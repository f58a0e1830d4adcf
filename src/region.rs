//! Index-domain regions and the direction-aware splitter used to hand
//! disjoint groups of lines to workers.
//!
//! A region is a box `[index, index + size)` per axis. Arrays are row-major,
//! so axis `0` is the slowest-varying one.

use alloc::vec::Vec;

use crate::error::{check_axis, AnalyticError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRegion<const D: usize> {
    index: [usize; D],
    size: [usize; D],
}

impl<const D: usize> ImageRegion<D> {
    pub fn new(index: [usize; D], size: [usize; D]) -> Self {
        Self { index, size }
    }

    /// Region starting at the origin with the given extents.
    pub fn from_size(size: [usize; D]) -> Self {
        Self {
            index: [0; D],
            size,
        }
    }

    pub fn index(&self) -> [usize; D] {
        self.index
    }

    pub fn size(&self) -> [usize; D] {
        self.size
    }

    pub fn number_of_pixels(&self) -> usize {
        self.size.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.size.iter().any(|&s| s == 0)
    }

    /// One past the last index along `axis`, saturating at `usize::MAX`.
    pub fn upper(&self, axis: usize) -> usize {
        self.index[axis].saturating_add(self.size[axis])
    }

    pub fn contains_index(&self, idx: &[usize; D]) -> bool {
        (0..D).all(|a| idx[a] >= self.index[a] && idx[a] < self.upper(a))
    }

    /// `true` when `self` lies entirely within `other`.
    pub fn is_inside(&self, other: &ImageRegion<D>) -> bool {
        (0..D).all(|a| {
            self.index[a] >= other.index[a]
                && self.index[a]
                    .checked_add(self.size[a])
                    .is_some_and(|upper| upper <= other.upper(a))
        })
    }

    /// Copy of `self` with the extent along `axis` replaced.
    pub fn with_axis_extent(&self, axis: usize, index: usize, size: usize) -> Self {
        let mut out = *self;
        out.index[axis] = index;
        out.size[axis] = size;
        out
    }

    /// Every index of the region in row-major order.
    pub fn indices(&self) -> RegionIndices<D> {
        RegionIndices {
            region: *self,
            next: if self.is_empty() { None } else { Some(self.index) },
        }
    }

    /// First sample of every line along `axis` inside the region.
    pub fn line_origins(&self, axis: usize) -> Vec<[usize; D]> {
        if self.is_empty() {
            return Vec::new();
        }
        self.with_axis_extent(axis, self.index[axis], 1)
            .indices()
            .collect()
    }
}

/// Row-major iterator over the indices of an [`ImageRegion`].
pub struct RegionIndices<const D: usize> {
    region: ImageRegion<D>,
    next: Option<[usize; D]>,
}

impl<const D: usize> Iterator for RegionIndices<D> {
    type Item = [usize; D];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut idx = current;
        let mut axis = D;
        self.next = loop {
            if axis == 0 {
                break None;
            }
            axis -= 1;
            idx[axis] += 1;
            if idx[axis] < self.region.upper(axis) {
                break Some(idx);
            }
            idx[axis] = self.region.index[axis];
        };
        Some(current)
    }
}

/// Strategy for partitioning a region among workers.
pub trait RegionSplitter<const D: usize> {
    /// Number of pieces [`split`](Self::split) would return.
    fn number_of_splits(&self, region: &ImageRegion<D>, requested: usize) -> usize;

    /// Partition `region` into at most `requested` disjoint boxes whose
    /// union is `region`.
    fn split(&self, region: &ImageRegion<D>, requested: usize) -> Vec<ImageRegion<D>>;
}

/// Splitter that never cuts across its axis: every piece keeps the full
/// extent of the input region along `axis`, so a line is always handled by
/// exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalRegionSplitter {
    axis: usize,
}

impl DirectionalRegionSplitter {
    pub fn new(axis: usize) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn set_axis(&mut self, axis: usize) {
        self.axis = axis;
    }

    /// Pick the axis to cut along and the resulting chunk length.
    ///
    /// Prefers the slowest axis (other than the transform axis) that can
    /// supply `requested` pieces on its own, else the longest such axis.
    fn plan<const D: usize>(
        &self,
        region: &ImageRegion<D>,
        requested: usize,
    ) -> Option<(usize, usize, usize)> {
        let requested = requested.max(1);
        if requested == 1 || region.is_empty() {
            return None;
        }
        let size = region.size();
        let candidates = (0..D).filter(|&a| a != self.axis && size[a] > 1);
        let split_axis = candidates
            .clone()
            .find(|&a| size[a] >= requested)
            .or_else(|| candidates.max_by_key(|&a| (size[a], core::cmp::Reverse(a))))?;
        let extent = size[split_axis];
        let chunk = extent.div_ceil(requested);
        let pieces = extent.div_ceil(chunk);
        Some((split_axis, chunk, pieces))
    }
}

impl<const D: usize> RegionSplitter<D> for DirectionalRegionSplitter {
    fn number_of_splits(&self, region: &ImageRegion<D>, requested: usize) -> usize {
        self.plan(region, requested).map_or(1, |(_, _, pieces)| pieces)
    }

    fn split(&self, region: &ImageRegion<D>, requested: usize) -> Vec<ImageRegion<D>> {
        let Some((split_axis, chunk, pieces)) = self.plan(region, requested) else {
            return alloc::vec![*region];
        };
        let start = region.index()[split_axis];
        let end = region.upper(split_axis);
        (0..pieces)
            .map(|piece| {
                let lo = start + piece * chunk;
                let hi = (lo + chunk).min(end);
                region.with_axis_extent(split_axis, lo, hi - lo)
            })
            .collect()
    }
}

/// Region needed to produce `output` along `axis`: the full extent of
/// `largest` along the axis, the requested extents elsewhere.
pub fn full_line_region<const D: usize>(
    output: &ImageRegion<D>,
    largest: &ImageRegion<D>,
    axis: usize,
) -> Result<ImageRegion<D>, AnalyticError> {
    check_axis(axis, D)?;
    if !output.is_inside(largest) {
        return Err(AnalyticError::InvalidRegion);
    }
    Ok(output.with_axis_extent(axis, largest.index()[axis], largest.size()[axis]))
}
