//! Analytic-signal envelope.
//!
//! The picker works on `|hilbert(x)|` rather than the raw trace so that the
//! STA/LTA curve follows wave-group energy instead of every oscillation.
//! The Hilbert transform is computed in the frequency domain: zero the
//! negative frequencies, double the positive ones, transform back.

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Envelope (magnitude of the analytic signal) of a real trace.
pub fn envelope(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut spectrum: Vec<Complex64> = data.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    forward.process(&mut spectrum);

    // DC (and Nyquist for even n) stay as they are.
    let positive_end = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };
    for bin in spectrum.iter_mut().take(positive_end).skip(1) {
        *bin *= 2.0;
    }
    let negative_start = if n % 2 == 0 { n / 2 + 1 } else { (n + 1) / 2 };
    for bin in spectrum.iter_mut().skip(negative_start) {
        *bin = Complex64::new(0.0, 0.0);
    }

    inverse.process(&mut spectrum);
    let scale = 1.0 / n as f64;
    spectrum.iter().map(|c| c.norm() * scale).collect()
}
