//! STA/LTA picking and initial candidate windows.
//!
//! The short-term and long-term averages are recursive decaying sums of the
//! envelope, with time constants tied to the shortest period of the pass
//! band. Their ratio rises sharply at a wave-group onset and decays through
//! the coda, so the peaks of the ratio mark arrivals and the troughs mark
//! natural window boundaries.
//!
//! Every above-water-level peak seeds one candidate per (left trough, right
//! trough) pair around it. The rejection cascade prunes that set.

use crate::types::Candidate;

/// Samples of noise floor prepended to warm up both averages.
const WARMUP_SAMPLES: usize = 1000;

/// LTA values below this yield a zero ratio.
const LTA_TOLERANCE: f64 = 1e-9;

/// STA/LTA ratio of an envelope, same length as the input.
///
/// `y[i] = x[i] + C * y[i-1]` with `Cs = 10^(-dt/min_period)` for the short
/// average and `Cl = 10^(-dt/(12*min_period))` for the long one.
pub fn sta_lta(data: &[f64], dt: f64, min_period: f64) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }

    let cs = 10f64.powf(-dt / min_period);
    let cl = 10f64.powf(-dt / (12.0 * min_period));
    let noise = data.iter().copied().fold(f64::NEG_INFINITY, f64::max) / 1e5;

    let mut sta = 0.0;
    let mut lta = 0.0;
    for _ in 0..WARMUP_SAMPLES {
        sta = noise + cs * sta;
        lta = noise + cl * lta;
    }

    data.iter()
        .map(|&x| {
            let value = x + noise;
            sta = value + cs * sta;
            lta = value + cl * lta;
            if lta < LTA_TOLERANCE {
                0.0
            } else {
                sta / lta
            }
        })
        .collect()
}

/// Indices of interior local maxima and minima, `(peaks, troughs)`.
///
/// A flat top or bottom is reported at its first index. The end points are
/// never extrema.
pub fn find_local_extrema(data: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let mut peaks = Vec::new();
    let mut troughs = Vec::new();

    let mut run_start = 0;
    let mut last_direction = 0i8;
    for i in 1..data.len() {
        let step = data[i] - data[i - 1];
        let direction = if step > 0.0 {
            1
        } else if step < 0.0 {
            -1
        } else {
            // Flat (or NaN): still on the current run.
            continue;
        };

        if last_direction > 0 && direction < 0 {
            peaks.push(run_start);
        } else if last_direction < 0 && direction > 0 {
            troughs.push(run_start);
        }
        run_start = i;
        last_direction = direction;
    }

    (peaks, troughs)
}

/// Sample range in which signal (rather than pre-event noise or late coda)
/// can be expected, derived from the first predicted arrival and the slowest
/// surface wave. Times are seconds from the first sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseBounds {
    pub min_time: f64,
    pub max_time: f64,
}

impl NoiseBounds {
    /// Bound indices clamped to `0..len`.
    fn indices(&self, dt: f64, len: usize) -> (usize, usize) {
        let last = len.saturating_sub(1) as f64;
        let min_idx = (self.min_time / dt).trunc().clamp(0.0, last) as usize;
        let max_idx = (self.max_time / dt).trunc().clamp(0.0, last) as usize;
        (min_idx, max_idx)
    }
}

/// Picker output: the ratio curve and its extrema.
#[derive(Debug, Clone, Default)]
pub struct Picks {
    pub stalta: Vec<f64>,
    pub peaks: Vec<usize>,
    pub troughs: Vec<usize>,
}

impl Picks {
    /// Run STA/LTA on an envelope and locate its extrema.
    pub fn from_envelope(envelope: &[f64], dt: f64, min_period: f64) -> Self {
        let stalta = sta_lta(envelope, dt, min_period);
        let (peaks, troughs) = find_local_extrema(&stalta);
        Self {
            stalta,
            peaks,
            troughs,
        }
    }

    /// Drop troughs outside the noise bounds, re-inserting the bound index as
    /// an artificial trough at each end that lost one, and keep only peaks
    /// strictly between the outermost troughs.
    pub fn restrict_to(&mut self, bounds: &NoiseBounds, dt: f64) {
        let (Some(&first_trough), Some(&last_trough)) = (self.troughs.first(), self.troughs.last())
        else {
            return;
        };
        let (min_idx, max_idx) = bounds.indices(dt, self.stalta.len());

        self.troughs.retain(|&t| t >= min_idx && t <= max_idx);
        if !self.troughs.is_empty() {
            if self.troughs[0] != first_trough {
                self.troughs.insert(0, min_idx);
            }
            if self.troughs[self.troughs.len() - 1] != last_trough {
                self.troughs.push(max_idx);
            }
        }

        match (self.troughs.first(), self.troughs.last()) {
            (Some(&lo), Some(&hi)) => self.peaks.retain(|&p| p > lo && p < hi),
            _ => self.peaks.clear(),
        }
    }

    /// Every (trough < peak, trough > peak) pair around every peak above the
    /// water level.
    ///
    /// On each side the search stops at the first trough at or below `floor`:
    /// a pair reaching past it would enclose it. Pass `f64::NEG_INFINITY` for
    /// the full set.
    pub(crate) fn initial_candidates(&self, waterlevel: f64, floor: f64) -> Vec<Candidate> {
        let (Some(&first_trough), Some(&last_trough)) = (self.troughs.first(), self.troughs.last())
        else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for &peak in &self.peaks {
            if peak <= first_trough || peak >= last_trough {
                continue;
            }
            if self.stalta[peak] <= waterlevel {
                continue;
            }
            // A peak is never also a trough, so the split is strict on both sides.
            let split = self.troughs.partition_point(|&t| t < peak);
            let (smaller, larger) = self.troughs.split_at(split);
            let low = |&t: &usize| self.stalta[t] <= floor;
            let first_left = smaller.iter().rposition(low).unwrap_or(0);
            let last_right = larger.iter().position(low).map_or(larger.len(), |i| i + 1);
            for &left in &smaller[first_left..] {
                for &right in &larger[..last_right] {
                    candidates.push(Candidate::new(left, right, peak));
                }
            }
        }
        candidates
    }
}
