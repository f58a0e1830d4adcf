// Test intent: verifies spectral hook axis synchronization, its position
// before the analytic mask, and band-pass filtering through the stage.
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use analytic_nd::analytic::envelope;
use analytic_nd::spectral::AxisCell;
use analytic_nd::{
    AnalyticError, AnalyticSignalFilter, ButterworthBandpass, Complex64, Executor,
    FrequencyDomainFilter, NdArray, SharedSpectralFilter, SpectralFilter,
};

/// Hook recording whether every spectrum it saw was still Hermitian
/// (i.e. had not been masked yet) and how many lines it filtered.
struct Probe {
    axis: AxisCell,
    hermitian: AtomicBool,
    lines: AtomicUsize,
}

impl Probe {
    fn new(axis: usize) -> Self {
        Self {
            axis: AxisCell::new(axis),
            hermitian: AtomicBool::new(true),
            lines: AtomicUsize::new(0),
        }
    }
}

impl SpectralFilter<f64> for Probe {
    fn axis(&self) -> usize {
        self.axis.get()
    }

    fn set_axis(&self, axis: usize) {
        self.axis.set(axis);
    }

    fn filter_line(&self, spectrum: &mut Vec<Complex64>) -> Result<(), AnalyticError> {
        let n = spectrum.len();
        for k in 1..n {
            let a = spectrum[k];
            let b = spectrum[n - k].conj();
            if (a.re - b.re).abs() > 1e-9 || (a.im - b.im).abs() > 1e-9 {
                self.hermitian.store(false, Ordering::SeqCst);
            }
        }
        self.lines.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn attaching_syncs_hook_axis() {
    let mut filter = AnalyticSignalFilter::<f64, 3>::new(2).unwrap();
    let probe = Arc::new(Probe::new(0));
    filter.attach_spectral_filter(probe.clone());
    assert_eq!(probe.axis(), 2);
}

#[test]
fn set_axis_propagates_to_attached_hook() {
    let mut filter = AnalyticSignalFilter::<f64, 3>::new(0).unwrap();
    let probe = Arc::new(Probe::new(0));
    filter.attach_spectral_filter(probe.clone());
    filter.set_axis(1).unwrap();
    assert_eq!(probe.axis(), 1);
    assert_eq!(filter.axis(), 1);
}

#[test]
fn shared_hook_is_reaimed_before_execution() {
    let probe: SharedSpectralFilter<f64> = Arc::new(Probe::new(0));
    let mut rows = AnalyticSignalFilter::<f64, 2>::new(1)
        .unwrap()
        .with_executor(Executor::sequential());
    let mut cols = AnalyticSignalFilter::<f64, 2>::new(0)
        .unwrap()
        .with_executor(Executor::sequential());
    rows.attach_spectral_filter(probe.clone());
    cols.attach_spectral_filter(probe.clone());
    assert_eq!(probe.axis(), 0);
    rows.execute(&NdArray::filled([2, 4], 1.0)).unwrap();
    assert_eq!(probe.axis(), 1);
}

#[test]
fn hook_sees_unmasked_spectrum_once_per_line() {
    let input = NdArray::from_fn([3, 10], |[r, c]| ((r * 7 + c * 3) % 5) as f64 - 2.0);
    let probe = Arc::new(Probe::new(0));
    let mut filter = AnalyticSignalFilter::<f64, 2>::new(1)
        .unwrap()
        .with_executor(Executor::with_workers(2));
    filter.attach_spectral_filter(probe.clone());
    filter.execute(&input).unwrap();
    assert!(probe.hermitian.load(Ordering::SeqCst));
    assert_eq!(probe.lines.load(Ordering::SeqCst), 3);
}

#[test]
fn identity_when_no_hook_attached() {
    let input = NdArray::from_fn([16], |[i]| (PI * i as f64 / 4.0).sin());
    let mut plain = AnalyticSignalFilter::<f64, 1>::new(0).unwrap();
    let expected = plain.execute(&input).unwrap().clone();
    let mut hooked = AnalyticSignalFilter::<f64, 1>::new(0).unwrap();
    hooked.attach_spectral_filter(Arc::new(FrequencyDomainFilter::<f64, _>::new(|_f: f64| 1.0)));
    assert_eq!(hooked.execute(&input).unwrap(), &expected);
    hooked.detach_spectral_filter();
    assert!(hooked.needs_execution());
    assert_eq!(hooked.update(&input).unwrap(), &expected);
}

#[test]
fn bandpass_hook_strips_offset_and_drift() {
    let n = 128;
    // DC offset + slow drift + carrier at bin 32.
    let input = NdArray::from_fn([n], |[i]| {
        let t = i as f64 / n as f64;
        3.0 + 0.8 * (2.0 * PI * t).cos() + (2.0 * PI * 32.0 * t).cos()
    });
    let mut filter = AnalyticSignalFilter::<f64, 1>::new(0).unwrap();
    filter.attach_spectral_filter(Arc::new(FrequencyDomainFilter::<f64, _>::new(
        ButterworthBandpass::new(0.15, 0.35, 8),
    )));
    let env = envelope(filter.update(&input).unwrap());
    for &e in env.as_slice() {
        assert!((e - 1.0).abs() < 0.02, "envelope {}", e);
    }
}
