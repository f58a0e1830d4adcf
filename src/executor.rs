//! Region-parallel execution of image stages.
//!
//! A stage declares which input it needs for a requested output, how to
//! split its output region, and how to compute one piece. The [`Executor`]
//! runs the single-threaded setup, fans the pieces out to a worker pool,
//! joins, and hands the partial results back to the stage in region order.
//!
//! The worker count resolves, in order, from [`set_worker_override`], the
//! `ANALYTIC_ND_THREADS` environment variable, and the number of CPUs. With
//! the `parallel` feature each executor builds its Rayon pool on first use
//! and keeps it; clones share the pool.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::OnceLock;

use crate::error::AnalyticError;
use crate::region::ImageRegion;

/// Override for the worker count. `0` means no override.
static WORKER_OVERRIDE: AtomicUsize = AtomicUsize::new(0);

#[cfg(feature = "std")]
static WORKER_ENV: OnceLock<usize> = OnceLock::new();

/// Force the worker count used by [`Executor::from_env`]. `0` reverts to the
/// environment variable or CPU count.
pub fn set_worker_override(workers: usize) {
    WORKER_OVERRIDE.store(workers, Ordering::Relaxed);
}

/// Worker count currently in effect for [`Executor::from_env`].
pub fn configured_workers() -> usize {
    let override_workers = WORKER_OVERRIDE.load(Ordering::Relaxed);
    if override_workers != 0 {
        return override_workers;
    }
    #[cfg(feature = "std")]
    {
        *WORKER_ENV.get_or_init(|| {
            std::env::var("ANALYTIC_ND_THREADS")
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or_else(|| num_cpus::get().max(1))
        })
    }
    #[cfg(not(feature = "std"))]
    {
        1
    }
}

/// Capabilities a stage exposes to the executor.
pub trait ImageStage<const D: usize>: Sync {
    type Input: Sync;
    type Partial: Send;
    type Output;

    fn largest_region(&self, input: &Self::Input) -> ImageRegion<D>;

    /// Input region needed to produce `output`.
    fn required_input_region(
        &self,
        output: &ImageRegion<D>,
        largest: &ImageRegion<D>,
    ) -> Result<ImageRegion<D>, AnalyticError>;

    /// Output region actually produced when `output` is requested.
    fn enlarged_output_region(
        &self,
        output: &ImageRegion<D>,
        largest: &ImageRegion<D>,
    ) -> Result<ImageRegion<D>, AnalyticError>;

    fn split_regions(&self, region: &ImageRegion<D>, requested: usize) -> Vec<ImageRegion<D>>;

    /// Single-threaded setup before any region runs.
    fn before_execute(&mut self, _input: &Self::Input) -> Result<(), AnalyticError> {
        Ok(())
    }

    /// Work for one region. Must only touch that region's lines.
    fn execute_region(
        &self,
        input: &Self::Input,
        region: &ImageRegion<D>,
    ) -> Result<Self::Partial, AnalyticError>;

    /// Single-threaded teardown after every region joined. `partials` are in
    /// the order produced by [`split_regions`](Self::split_regions).
    fn after_execute(
        &mut self,
        input: &Self::Input,
        region: &ImageRegion<D>,
        partials: Vec<Self::Partial>,
    ) -> Result<Self::Output, AnalyticError>;
}

#[derive(Clone)]
pub struct Executor {
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: Arc<OnceLock<rayon::ThreadPool>>,
}

impl PartialEq for Executor {
    fn eq(&self, other: &Self) -> bool {
        self.workers == other.workers
    }
}

impl Eq for Executor {}

impl core::fmt::Debug for Executor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Executor")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Executor {
    /// Executor sized by [`configured_workers`].
    pub fn from_env() -> Self {
        Self::with_workers(configured_workers())
    }

    /// Executor with a fixed worker count; `0` is treated as `1`.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            #[cfg(feature = "parallel")]
            pool: Arc::new(OnceLock::new()),
        }
    }

    pub fn sequential() -> Self {
        Self::with_workers(1)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Produce `requested` (enlarged as the stage demands) from `input`.
    pub fn run<S, const D: usize>(
        &self,
        stage: &mut S,
        input: &S::Input,
        requested: &ImageRegion<D>,
    ) -> Result<S::Output, AnalyticError>
    where
        S: ImageStage<D>,
    {
        let largest = stage.largest_region(input);
        let output_region = stage.enlarged_output_region(requested, &largest)?;
        let input_region = stage.required_input_region(&output_region, &largest)?;
        if !input_region.is_inside(&largest) {
            return Err(AnalyticError::InvalidRegion);
        }
        stage.before_execute(input)?;
        let regions = stage.split_regions(&output_region, self.workers);
        debug_log!(
            "executing {} region(s) of {:?} on {} worker(s)",
            regions.len(),
            output_region.size(),
            self.workers
        );
        let partials = self.dispatch(&*stage, input, &regions)?;
        stage.after_execute(input, &output_region, partials)
    }

    fn dispatch<S, const D: usize>(
        &self,
        stage: &S,
        input: &S::Input,
        regions: &[ImageRegion<D>],
    ) -> Result<Vec<S::Partial>, AnalyticError>
    where
        S: ImageStage<D>,
    {
        #[cfg(feature = "parallel")]
        {
            if self.workers > 1 && regions.len() > 1 {
                use rayon::prelude::*;
                return self.pool()?.install(|| {
                    regions
                        .par_iter()
                        .map(|region| {
                            trace_log!("region {:?} size {:?}", region.index(), region.size());
                            stage.execute_region(input, region)
                        })
                        .collect()
                });
            }
        }
        regions
            .iter()
            .map(|region| {
                trace_log!("region {:?} size {:?}", region.index(), region.size());
                stage.execute_region(input, region)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn pool(&self) -> Result<&rayon::ThreadPool, AnalyticError> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|_| AnalyticError::WorkerPool)?;
        debug_log!("built worker pool with {} thread(s)", self.workers);
        // A racing clone may have installed its pool first.
        let _ = self.pool.set(pool);
        self.pool.get().ok_or(AnalyticError::WorkerPool)
    }
}
