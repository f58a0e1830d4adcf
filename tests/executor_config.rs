// Test intent: verifies worker-count configuration through the programmatic
// override. Kept in its own binary because the override is process-global.
use analytic_nd::executor::{configured_workers, set_worker_override};
use analytic_nd::{AnalyticSignalFilter, Executor};

#[test]
fn override_controls_default_executor() {
    set_worker_override(3);
    assert_eq!(configured_workers(), 3);
    assert_eq!(Executor::from_env().workers(), 3);
    let filter = AnalyticSignalFilter::<f32, 2>::new(0).unwrap();
    assert_eq!(filter.executor().workers(), 3);

    set_worker_override(0);
    assert!(configured_workers() >= 1);
}
