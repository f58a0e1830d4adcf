//! The analytic-signal stage for N-d arrays.
//!
//! [`AnalyticSignalFilter`] owns the forward and inverse line transforms and
//! an optional shared [`SpectralFilter`] hook, and is the only place the
//! transform axis can change: every axis update reaches all three (and the
//! region splitter) together.
//!
//! Each execution splits the output into regions that keep whole lines,
//! and for every line runs forward FFT → hook → `2U(k)` mask → inverse FFT.
//! Lines share no state, so the result is identical for any worker count.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::analytic::apply_analytic_mask;
use crate::array::NdArray;
use crate::error::{check_axis, AnalyticError};
use crate::executor::{Executor, ImageStage};
use crate::fft::{Complex, FftPlanner, Float, ScalarFftImpl};
use crate::region::{full_line_region, DirectionalRegionSplitter, ImageRegion, RegionSplitter};
use crate::spectral::SpectralFilter;
use crate::transform::{ForwardTransform1D, InverseTransform1D, LineLayout};

/// Shared handle to a spectral hook.
pub type SharedSpectralFilter<T> = Arc<dyn SpectralFilter<T>>;

/// Analytic lines computed for one region.
#[derive(Debug, Clone)]
pub struct RegionLines<T: Float> {
    /// Flat offset of the first sample of each line.
    pub origins: Vec<usize>,
    /// Line samples back to back, `origins.len() * L` values.
    pub samples: Vec<Complex<T>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunStamp<const D: usize> {
    modified: u64,
    fingerprint: blake3::Hash,
    region: ImageRegion<D>,
}

pub struct AnalyticSignalFilter<T: Float, const D: usize> {
    forward: ForwardTransform1D<D>,
    inverse: InverseTransform1D<D>,
    splitter: DirectionalRegionSplitter,
    hook: Option<SharedSpectralFilter<T>>,
    /// Tables prepared before each run; workers start from a clone.
    planner: FftPlanner<T>,
    executor: Executor,
    modified: u64,
    last_run: Option<RunStamp<D>>,
    output: Option<NdArray<Complex<T>, D>>,
}

impl<T: Float, const D: usize> AnalyticSignalFilter<T, D> {
    /// Stage transforming along `axis`, executed with [`Executor::from_env`].
    pub fn new(axis: usize) -> Result<Self, AnalyticError> {
        Ok(Self {
            forward: ForwardTransform1D::new(axis)?,
            inverse: InverseTransform1D::new(axis)?,
            splitter: DirectionalRegionSplitter::new(axis),
            hook: None,
            planner: FftPlanner::new(),
            executor: Executor::from_env(),
            modified: 0,
            last_run: None,
            output: None,
        })
    }

    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Worker layout does not affect results, so this never invalidates the
    /// cached output.
    pub fn set_executor(&mut self, executor: Executor) {
        self.executor = executor;
    }

    pub fn axis(&self) -> usize {
        self.forward.axis()
    }

    /// Change the transform axis. Setting the current axis again is a no-op
    /// and leaves the stage clean.
    pub fn set_axis(&mut self, axis: usize) -> Result<(), AnalyticError> {
        check_axis(axis, D)?;
        if axis == self.axis() {
            return Ok(());
        }
        self.forward.set_axis(axis)?;
        self.inverse.set_axis(axis)?;
        self.splitter.set_axis(axis);
        if let Some(hook) = &self.hook {
            hook.set_axis(axis);
        }
        self.modified += 1;
        debug_log!("analytic signal axis set to {}", axis);
        Ok(())
    }

    pub fn spectral_filter(&self) -> Option<&SharedSpectralFilter<T>> {
        self.hook.as_ref()
    }

    /// Attach a shared hook run on each line's spectrum before masking. The
    /// hook's axis is synchronized to this stage's axis immediately.
    /// Re-attaching the hook already in place is a no-op.
    pub fn attach_spectral_filter(&mut self, hook: SharedSpectralFilter<T>) {
        if let Some(current) = &self.hook {
            if core::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(&hook)) {
                return;
            }
        }
        hook.set_axis(self.axis());
        self.hook = Some(hook);
        self.modified += 1;
        debug_log!("spectral filter attached on axis {}", self.axis());
    }

    /// Remove the hook, returning it. Spectra pass through unchanged afterwards.
    pub fn detach_spectral_filter(&mut self) -> Option<SharedSpectralFilter<T>> {
        let hook = self.hook.take();
        if hook.is_some() {
            self.modified += 1;
            debug_log!("spectral filter detached");
        }
        hook
    }

    /// Counter bumped by every effective configuration change.
    pub fn modified_count(&self) -> u64 {
        self.modified
    }

    /// `true` when the configuration changed since the last successful run.
    pub fn needs_execution(&self) -> bool {
        self.last_run.map_or(true, |run| run.modified != self.modified)
    }

    /// Output of the last successful run.
    pub fn output(&self) -> Option<&NdArray<Complex<T>, D>> {
        self.output.as_ref()
    }

    /// Input region needed for `output`: whole lines along the axis.
    pub fn required_input_region(
        &self,
        output: &ImageRegion<D>,
        largest: &ImageRegion<D>,
    ) -> Result<ImageRegion<D>, AnalyticError> {
        full_line_region(output, largest, self.axis())
    }

    /// Output region produced for a request: whole lines along the axis.
    pub fn enlarged_output_region(
        &self,
        output: &ImageRegion<D>,
        largest: &ImageRegion<D>,
    ) -> Result<ImageRegion<D>, AnalyticError> {
        full_line_region(output, largest, self.axis())
    }

    /// Compute the analytic signal of the whole input, unconditionally.
    pub fn execute(
        &mut self,
        input: &NdArray<T, D>,
    ) -> Result<&NdArray<Complex<T>, D>, AnalyticError> {
        self.run(input, input.largest_region(), fingerprint(input))
    }

    /// Like [`execute`](Self::execute), but returns the cached output when
    /// neither the configuration nor the input changed since the last run.
    pub fn update(
        &mut self,
        input: &NdArray<T, D>,
    ) -> Result<&NdArray<Complex<T>, D>, AnalyticError> {
        self.update_region(input, input.largest_region())
    }

    /// Compute only the lines crossing `region`; other output samples are
    /// zero. Cached like [`update`](Self::update).
    pub fn update_region(
        &mut self,
        input: &NdArray<T, D>,
        region: ImageRegion<D>,
    ) -> Result<&NdArray<Complex<T>, D>, AnalyticError> {
        let fingerprint = fingerprint(input);
        let region = self.enlarged_output_region(&region, &input.largest_region())?;
        let fresh = self.last_run.is_some_and(|run| {
            run.modified == self.modified
                && run.fingerprint == fingerprint
                && run.region == region
        });
        match self.output.take() {
            Some(output) if fresh => {
                debug_log!("analytic signal up to date, reusing output");
                Ok(self.output.insert(output))
            }
            _ => self.run(input, region, fingerprint),
        }
    }

    fn run(
        &mut self,
        input: &NdArray<T, D>,
        region: ImageRegion<D>,
        fingerprint: blake3::Hash,
    ) -> Result<&NdArray<Complex<T>, D>, AnalyticError> {
        self.output = None;
        self.last_run = None;
        let executor = self.executor.clone();
        let output = executor.run(self, input, &region)?;
        self.last_run = Some(RunStamp {
            modified: self.modified,
            fingerprint,
            region,
        });
        Ok(self.output.insert(output))
    }

    fn process_line(
        &self,
        fft: &ScalarFftImpl<T>,
        input: &NdArray<T, D>,
        origin: [usize; D],
        line: &mut Vec<Complex<T>>,
    ) -> Result<(), AnalyticError> {
        self.forward.load_line(input, origin, line)?;
        let len = line.len();
        self.forward.transform_line(fft, line)?;
        if let Some(hook) = &self.hook {
            hook.filter_line(line)?;
            if line.len() != len {
                return Err(AnalyticError::ShapeMismatch {
                    expected: len,
                    found: line.len(),
                });
            }
        }
        apply_analytic_mask(line);
        self.inverse.transform_line(fft, line)
    }
}

impl<T: Float, const D: usize> ImageStage<D> for AnalyticSignalFilter<T, D> {
    type Input = NdArray<T, D>;
    type Partial = RegionLines<T>;
    type Output = NdArray<Complex<T>, D>;

    fn largest_region(&self, input: &Self::Input) -> ImageRegion<D> {
        input.largest_region()
    }

    fn required_input_region(
        &self,
        output: &ImageRegion<D>,
        largest: &ImageRegion<D>,
    ) -> Result<ImageRegion<D>, AnalyticError> {
        AnalyticSignalFilter::required_input_region(self, output, largest)
    }

    fn enlarged_output_region(
        &self,
        output: &ImageRegion<D>,
        largest: &ImageRegion<D>,
    ) -> Result<ImageRegion<D>, AnalyticError> {
        AnalyticSignalFilter::enlarged_output_region(self, output, largest)
    }

    fn split_regions(&self, region: &ImageRegion<D>, requested: usize) -> Vec<ImageRegion<D>> {
        self.splitter.split(region, requested)
    }

    fn before_execute(&mut self, input: &Self::Input) -> Result<(), AnalyticError> {
        let axis = self.axis();
        check_axis(axis, D)?;
        self.planner.prepare(input.shape()[axis]);
        // A shared hook may have been re-aimed by another owner.
        if let Some(hook) = &self.hook {
            if hook.axis() != axis {
                hook.set_axis(axis);
            }
        }
        Ok(())
    }

    fn execute_region(
        &self,
        input: &Self::Input,
        region: &ImageRegion<D>,
    ) -> Result<Self::Partial, AnalyticError> {
        let axis = self.axis();
        let fft = ScalarFftImpl::with_planner(self.planner.clone());
        let origins = region.line_origins(axis);
        let len = input.shape()[axis];
        let mut out = RegionLines {
            origins: Vec::with_capacity(origins.len()),
            samples: Vec::with_capacity(origins.len() * len),
        };
        let mut line = Vec::with_capacity(len);
        for origin in origins {
            self.process_line(&fft, input, origin, &mut line)?;
            out.origins
                .push(input.offset(origin).ok_or(AnalyticError::InvalidRegion)?);
            out.samples.extend_from_slice(&line);
        }
        Ok(out)
    }

    fn after_execute(
        &mut self,
        input: &Self::Input,
        _region: &ImageRegion<D>,
        partials: Vec<Self::Partial>,
    ) -> Result<Self::Output, AnalyticError> {
        let layout = LineLayout::of(input, self.axis());
        let mut output = NdArray::filled(input.shape(), Complex::zero());
        for part in partials {
            if layout.len == 0 {
                continue;
            }
            for (base, line) in part.origins.iter().zip(part.samples.chunks_exact(layout.len)) {
                layout.scatter(line, *base, output.as_mut_slice());
            }
        }
        Ok(output)
    }
}

impl<T: Float, const D: usize> core::fmt::Debug for AnalyticSignalFilter<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnalyticSignalFilter")
            .field("dimension", &D)
            .field("axis", &self.axis())
            .field("spectral_filter", &self.hook.is_some())
            .field("workers", &self.executor.workers())
            .field("modified", &self.modified)
            .field("needs_execution", &self.needs_execution())
            .finish()
    }
}

/// Content hash over shape and sample bits.
fn fingerprint<T: Float, const D: usize>(input: &NdArray<T, D>) -> blake3::Hash {
    const CHUNK: usize = 512;
    let mut hasher = blake3::Hasher::new();
    for extent in input.shape() {
        hasher.update(&(extent as u64).to_le_bytes());
    }
    let mut buf = [0u8; CHUNK * 8];
    for chunk in input.as_slice().chunks(CHUNK) {
        for (dst, x) in buf.chunks_exact_mut(8).zip(chunk) {
            dst.copy_from_slice(&x.to_bits_u64().to_le_bytes());
        }
        hasher.update(&buf[..chunk.len() * 8]);
    }
    hasher.finalize()
}
