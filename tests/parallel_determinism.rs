// Test intent: verifies the analytic signal output is bit-identical for any
// worker count and axis, with and without a spectral hook.
use std::sync::Arc;

use analytic_nd::{
    AnalyticSignalFilter, ButterworthBandpass, Executor, FrequencyDomainFilter, NdArray,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Worker counts compared against the single-worker baseline.
const WORKER_COUNTS: [usize; 4] = [2, 3, 4, 8];

fn random_volume(seed: u64) -> NdArray<f64, 3> {
    let mut rng = StdRng::seed_from_u64(seed);
    NdArray::from_fn([5, 7, 12], |_| rng.gen_range(-1.0..1.0))
}

#[test]
fn worker_count_does_not_change_output() {
    let input = random_volume(3);
    for axis in 0..3 {
        let mut baseline = AnalyticSignalFilter::<f64, 3>::new(axis)
            .unwrap()
            .with_executor(Executor::sequential());
        let expected = baseline.execute(&input).unwrap().clone();
        for workers in WORKER_COUNTS {
            let mut filter = AnalyticSignalFilter::<f64, 3>::new(axis)
                .unwrap()
                .with_executor(Executor::with_workers(workers));
            let got = filter.execute(&input).unwrap();
            assert_eq!(got, &expected, "axis {} workers {}", axis, workers);
        }
    }
}

#[test]
fn worker_count_does_not_change_filtered_output() {
    let input = random_volume(9);
    let hook = Arc::new(FrequencyDomainFilter::<f64, _>::new(
        ButterworthBandpass::new(0.05, 0.35, 3),
    ));
    let mut one = AnalyticSignalFilter::<f64, 3>::new(2)
        .unwrap()
        .with_executor(Executor::sequential());
    one.attach_spectral_filter(hook.clone());
    let expected = one.execute(&input).unwrap().clone();

    let mut many = AnalyticSignalFilter::<f64, 3>::new(2)
        .unwrap()
        .with_executor(Executor::with_workers(6));
    many.attach_spectral_filter(hook);
    assert_eq!(many.execute(&input).unwrap(), &expected);
}

#[test]
fn changing_executor_keeps_cached_output() {
    let input = random_volume(5);
    let mut filter = AnalyticSignalFilter::<f64, 3>::new(1)
        .unwrap()
        .with_executor(Executor::with_workers(2));
    let first = filter.update(&input).unwrap().clone();
    filter.set_executor(Executor::with_workers(5));
    assert!(!filter.needs_execution());
    assert_eq!(filter.update(&input).unwrap(), &first);
}
