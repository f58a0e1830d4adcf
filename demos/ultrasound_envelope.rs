//! Envelope detection on a synthetic ultrasound frame.
//!
//! Each column is an RF line: a band-limited echo at a column-dependent
//! depth. The analytic signal is taken along depth (axis 0) after a
//! Butterworth band-pass around the transducer center frequency.
//!
//! Add `--features verbose-logging` to see the stage's debug records.

use std::f64::consts::PI;
use std::sync::Arc;

use analytic_nd::analytic::envelope;
use analytic_nd::{
    AnalyticSignalFilter, ButterworthBandpass, Executor, FrequencyDomainFilter, NdArray,
};

const DEPTH: usize = 512;
const LINES: usize = 16;
const CENTER: f64 = 0.2;

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let frame = NdArray::from_fn([DEPTH, LINES], |[z, line]| {
        let echo_at = 100.0 + 20.0 * line as f64;
        let gate = (-((z as f64 - echo_at) / 12.0).powi(2)).exp();
        gate * (2.0 * PI * CENTER * z as f64).cos()
    });

    let mut filter = AnalyticSignalFilter::<f64, 2>::new(0)
        .expect("axis 0 exists")
        .with_executor(Executor::from_env());
    filter.attach_spectral_filter(Arc::new(FrequencyDomainFilter::<f64, _>::new(
        ButterworthBandpass::new(0.1, 0.3, 4),
    )));

    let analytic = filter.update(&frame).expect("analytic signal");
    let env = envelope(analytic);
    log::info!("processed {:?} with {:?}", frame.shape(), filter);

    for line in 0..LINES {
        let (peak_depth, peak) = (0..DEPTH)
            .map(|z| (z, *env.get([z, line]).unwrap_or(&0.0)))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        println!("line {:2}: echo at depth {:3} (amplitude {:.3})", line, peak_depth, peak);
    }
}
