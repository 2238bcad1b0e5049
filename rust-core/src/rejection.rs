//! Shape-based rejection of candidate windows.
//!
//! Candidates are pruned by a fixed sequence of tests on the STA/LTA curve:
//!
//! 1. travel-time noise bounds (only when arrivals are known)
//! 2. minimum length (`c_1`)
//! 3. maximum length (`max_window_periods`, optional)
//! 4. internal minima water level (`c_0`)
//! 5. prominence of the central peak (`c_2`, skipped at zero)
//! 6. separation from other internal peaks (`c_3a`, `c_3b`)
//! 7. curtailment of long flanks (`c_4a`, `c_4b`)
//! 8. duplicate removal, then minimum length again
//!
//! Every test is a pure predicate of one candidate, so raising `c_0`, `c_1`
//! or `c_2` can only shrink the surviving set.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::Config;
use crate::stalta::{NoiseBounds, Picks};
use crate::types::Candidate;

/// The rejection stage of the pipeline.
pub(crate) struct RejectionCascade<'a> {
    picks: &'a Picks,
    config: &'a Config,
    dt: f64,
    noise_bounds: Option<NoiseBounds>,
}

impl<'a> RejectionCascade<'a> {
    pub fn new(picks: &'a Picks, config: &'a Config, dt: f64) -> Self {
        Self {
            picks,
            config,
            dt,
            noise_bounds: None,
        }
    }

    pub fn with_noise_bounds(mut self, bounds: Option<NoiseBounds>) -> Self {
        self.noise_bounds = bounds;
        self
    }

    /// Run every test in order.
    pub fn apply(&self, mut windows: Vec<Candidate>) -> Vec<Candidate> {
        debug!(count = windows.len(), "initial candidate windows");

        if let Some(bounds) = self.noise_bounds {
            windows.retain(|w| self.within_noise_bounds(w, &bounds));
            debug!(count = windows.len(), "after travel-time rejection");
        }

        windows.retain(|w| self.long_enough(w));
        windows.retain(|w| self.short_enough(w));
        debug!(count = windows.len(), "after length rejection");

        windows.retain(|w| self.minima_above_water_level(w));
        debug!(count = windows.len(), "after minima water level rejection");

        if self.config.c_2 > 0.0 {
            windows.retain(|w| self.central_peak_prominent(w));
            debug!(count = windows.len(), "after prominence rejection");
        }

        windows.retain(|w| self.phases_separated(w));
        debug!(count = windows.len(), "after phase separation rejection");

        for window in windows.iter_mut() {
            self.curtail(window);
        }

        let mut windows = remove_duplicates(windows);
        // Curtailing may have shortened some windows.
        windows.retain(|w| self.long_enough(w));
        debug!(count = windows.len(), "after curtailment and duplicate removal");
        windows
    }

    pub fn within_noise_bounds(&self, window: &Candidate, bounds: &NoiseBounds) -> bool {
        let start = window.left as f64 * self.dt;
        let end = window.right as f64 * self.dt;
        end >= bounds.min_time && start <= bounds.max_time
    }

    pub fn long_enough(&self, window: &Candidate) -> bool {
        let min_length = self.config.c_1 * self.config.min_period / self.dt;
        window.len() as f64 >= min_length
    }

    pub fn short_enough(&self, window: &Candidate) -> bool {
        match self.config.max_window_periods {
            Some(periods) => window.len() as f64 * self.dt <= periods * self.config.max_period,
            None => true,
        }
    }

    /// No trough strictly inside the window may sit at or below
    /// `c_0 * stalta_waterlevel`.
    pub fn minima_above_water_level(&self, window: &Candidate) -> bool {
        let level = self.config.c_0 * self.config.stalta_waterlevel;
        self.troughs_between(window.left, window.right, false)
            .iter()
            .all(|&t| self.picks.stalta[t] > level)
    }

    /// The central peak must rise at least `c_2 * peak` above the nearest
    /// trough on each side.
    pub fn central_peak_prominent(&self, window: &Candidate) -> bool {
        let troughs = &self.picks.troughs;
        let split = troughs.partition_point(|&t| t < window.center);
        let Some(&left) = split.checked_sub(1).and_then(|i| troughs.get(i)) else {
            return false;
        };
        let Some(&right) = troughs[split..].iter().find(|&&t| t > window.center) else {
            return false;
        };

        let stalta = &self.picks.stalta;
        let center = stalta[window.center];
        let threshold = self.config.c_2 * center;
        center - stalta[left] >= threshold && center - stalta[right] >= threshold
    }

    /// Reject windows whose other internal peaks are comparable in height to
    /// the central one, allowing more height the further away they are.
    pub fn phases_separated(&self, window: &Candidate) -> bool {
        let stalta = &self.picks.stalta;
        let stalta_min = self
            .troughs_between(window.left, window.right, true)
            .iter()
            .map(|&t| stalta[t])
            .fold(f64::INFINITY, f64::min);
        let d_center = stalta[window.center] - stalta_min;

        let c_3a = self.config.c_3a;
        let c_3b = self.config.c_3b;
        self.peaks_between(window.left, window.right)
            .iter()
            .filter(|&&p| p != window.center)
            .all(|&peak| {
                let d_stalta = stalta[peak] - stalta_min;
                let d_time =
                    window.center.abs_diff(peak) as f64 * self.dt / self.config.min_period;
                let f_time = if d_time >= c_3b {
                    (-((d_time - c_3b) / c_3b).powi(2)).exp()
                } else {
                    1.0
                };
                d_stalta <= c_3a * d_center * f_time
            })
    }

    /// Trim flanks that extend further than the expected decay length beyond
    /// the outermost non-central internal peaks.
    pub fn curtail(&self, window: &mut Candidate) {
        let internal: Vec<usize> = self
            .peaks_between(window.left, window.right)
            .iter()
            .copied()
            .filter(|&p| p != window.center)
            .collect();
        let (Some(&first), Some(&last)) = (internal.first(), internal.last()) else {
            return;
        };
        if internal.len() < 2 {
            return;
        }

        let decay_left = self.config.c_4a * self.config.min_period / self.dt;
        let decay_right = self.config.c_4b * self.config.min_period / self.dt;

        if (first - window.left) as f64 > decay_left {
            let left = (first as f64 - decay_left) as usize;
            info!(from = window.left, to = left, "curtailing window left");
            window.left = left;
        }
        if (window.right - last) as f64 > decay_right {
            let right = (last as f64 + decay_right) as usize;
            info!(from = window.right, to = right, "curtailing window right");
            window.right = right;
        }
    }

    fn troughs_between(&self, left: usize, right: usize, inclusive: bool) -> &[usize] {
        between(&self.picks.troughs, left, right, inclusive)
    }

    fn peaks_between(&self, left: usize, right: usize) -> &[usize] {
        between(&self.picks.peaks, left, right, true)
    }
}

/// Slice of a sorted index list inside `[left, right]` or `(left, right)`.
fn between(indices: &[usize], left: usize, right: usize, inclusive: bool) -> &[usize] {
    let (start, end) = if inclusive {
        (
            indices.partition_point(|&i| i < left),
            indices.partition_point(|&i| i <= right),
        )
    } else {
        (
            indices.partition_point(|&i| i <= left),
            indices.partition_point(|&i| i < right),
        )
    };
    if start >= end {
        &[]
    } else {
        &indices[start..end]
    }
}

/// Keep the first candidate for each `(left, right)`, sorted by `left`.
fn remove_duplicates(mut windows: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    windows.retain(|w| seen.insert((w.left, w.right)));
    windows.sort_by_key(|w| w.left);
    windows
}
