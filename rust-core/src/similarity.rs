//! Waveform similarity of observed and synthetic segments.
//!
//! For each surviving candidate the observed segment `left..right` is
//! compared against synthetic segments shifted by up to
//! `tshift_acceptance_level` seconds. The best normalized correlation, its
//! lag, and the RMS amplitude ratio at that lag decide whether the window is
//! accepted.

use tracing::debug;

use crate::config::Config;
use crate::types::{Candidate, Trace, Window};

/// Correlation and amplitude measurements of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub max_cc_value: f64,
    /// Positive when the observed arrival lags the synthetic.
    pub cc_shift: i64,
    pub dlna: f64,
}

impl Similarity {
    /// Result for segments with no usable energy.
    pub const DEGENERATE: Similarity = Similarity {
        max_cc_value: -1.0,
        cc_shift: 0,
        dlna: f64::NAN,
    };
}

/// Shifts visited from the smallest magnitude outwards, negative first.
fn shift_order(max_shift: usize) -> impl Iterator<Item = i64> {
    std::iter::once(0).chain((1..=max_shift as i64).flat_map(|k| [-k, k]))
}

fn energy(segment: &[f64]) -> f64 {
    segment.iter().map(|x| x * x).sum()
}

/// Best lag within `±max_shift` samples. Shifts that would move the
/// synthetic segment off either end of the trace are skipped; equal
/// correlations keep the smaller lag.
pub fn measure(
    observed: &[f64],
    synthetic: &[f64],
    left: usize,
    right: usize,
    max_shift: usize,
) -> Similarity {
    let right = right.min(observed.len()).min(synthetic.len());
    if left >= right {
        return Similarity::DEGENERATE;
    }
    let d = &observed[left..right];
    let d_energy = energy(d);

    let mut best: Option<(f64, i64, f64)> = None;
    for shift in shift_order(max_shift) {
        let Some(start) = left.checked_add_signed(-shift as isize) else {
            continue;
        };
        let end = start + d.len();
        if end > synthetic.len() {
            continue;
        }
        let s = &synthetic[start..end];
        let s_energy = energy(s);
        let norm = d_energy.sqrt() * s_energy.sqrt();
        if !(norm.is_finite() && norm > 0.0) {
            continue;
        }
        let cc = d.iter().zip(s).map(|(a, b)| a * b).sum::<f64>() / norm;
        if best.map_or(true, |(best_cc, _, _)| cc > best_cc) {
            best = Some((cc, shift, s_energy));
        }
    }

    match best {
        Some((max_cc_value, cc_shift, s_energy)) => Similarity {
            max_cc_value,
            cc_shift,
            dlna: 0.5 * (d_energy / s_energy).ln(),
        },
        None => Similarity::DEGENERATE,
    }
}

/// The data-fit stage of the pipeline.
pub(crate) struct SimilarityScorer<'a> {
    observed: &'a Trace,
    synthetic: &'a Trace,
    config: &'a Config,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(observed: &'a Trace, synthetic: &'a Trace, config: &'a Config) -> Self {
        Self {
            observed,
            synthetic,
            config,
        }
    }

    /// Largest lag searched, in samples.
    pub fn max_shift_samples(&self) -> usize {
        (self.config.tshift_acceptance_level / self.observed.delta).floor() as usize
    }

    pub fn score(&self, candidate: &Candidate) -> Window {
        let similarity = measure(
            &self.observed.data,
            &self.synthetic.data,
            candidate.left,
            candidate.right,
            self.max_shift_samples(),
        );
        Window {
            left: candidate.left,
            right: candidate.right,
            center: candidate.center,
            channel_id: self.observed.channel_id.clone(),
            time_of_first_sample: self.observed.starttime,
            dt: self.observed.delta,
            min_period: self.config.min_period,
            max_cc_value: similarity.max_cc_value,
            cc_shift: similarity.cc_shift,
            dlna: similarity.dlna,
            phase_arrivals: Vec::new(),
        }
    }

    /// Inclusive acceptance gate; NaN measurements never pass.
    pub fn accepts(&self, window: &Window) -> bool {
        let config = self.config;
        if !(window.max_cc_value >= config.cc_acceptance_level) {
            return false;
        }
        if !(window.cc_shift_in_seconds().abs() <= config.tshift_acceptance_level) {
            return false;
        }
        window.dlna.abs() <= config.dlna_acceptance_level
    }

    pub fn apply(&self, candidates: &[Candidate]) -> Vec<Window> {
        let windows: Vec<Window> = candidates
            .iter()
            .map(|c| self.score(c))
            .filter(|w| self.accepts(w))
            .collect();
        debug!(count = windows.len(), "after data fit rejection");
        windows
    }
}
