//! Overlap resolution of accepted windows.
//!
//! Windows are half-open sample ranges, so two windows sharing an endpoint
//! can both be kept. Weights come from the configured [`WindowWeight`].

use tracing::debug;

use crate::config::{ResolutionStrategy, WindowWeight};
use crate::types::Window;

/// Non-finite weights count as zero.
fn weight_of(strategy: &dyn WindowWeight, window: &Window) -> f64 {
    let w = window.weight(strategy);
    if w.is_finite() {
        w
    } else {
        0.0
    }
}

/// Resolve overlaps with the given strategy. Output is sorted by `left` and
/// pairwise non-overlapping; windows of weight `<= 0` are never kept.
pub fn resolve(
    windows: Vec<Window>,
    strategy: ResolutionStrategy,
    weight: &dyn WindowWeight,
) -> Vec<Window> {
    let mut kept = match strategy {
        ResolutionStrategy::IntervalScheduling => schedule_weighted_intervals(windows, weight),
        ResolutionStrategy::Greedy => greedy(windows, weight),
    };
    kept.sort_by_key(|w| (w.left, w.right));
    debug!(count = kept.len(), ?strategy, "after overlap resolution");
    kept
}

/// Maximum total weight over mutually non-overlapping windows.
///
/// Classic dynamic program over windows sorted by end point. `opt[j]` is the
/// best total using the first `j` windows; `p[j]` the number of windows that
/// end at or before window `j` starts.
pub fn schedule_weighted_intervals(
    mut windows: Vec<Window>,
    weight: &dyn WindowWeight,
) -> Vec<Window> {
    windows.retain(|w| weight_of(weight, w) > 0.0);
    if windows.is_empty() {
        return windows;
    }
    windows.sort_by_key(|w| (w.right, w.left));

    let weights: Vec<f64> = windows.iter().map(|w| weight_of(weight, w)).collect();
    let predecessors: Vec<usize> = windows
        .iter()
        .map(|w| windows.partition_point(|other| other.right <= w.left))
        .collect();

    let mut opt = vec![0.0; windows.len() + 1];
    for j in 0..windows.len() {
        opt[j + 1] = (weights[j] + opt[predecessors[j]]).max(opt[j]);
    }

    let mut chosen = Vec::new();
    let mut j = windows.len();
    while j > 0 {
        let i = j - 1;
        if weights[i] + opt[predecessors[i]] > opt[i] {
            chosen.push(i);
            j = predecessors[i];
        } else {
            j = i;
        }
    }

    let mut slots: Vec<Option<Window>> = windows.into_iter().map(Some).collect();
    chosen
        .into_iter()
        .rev()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Heaviest first; ties go to the longer window, then the earlier one.
/// A window is kept when it overlaps nothing already kept.
pub fn greedy(windows: Vec<Window>, weight: &dyn WindowWeight) -> Vec<Window> {
    let mut ranked: Vec<(f64, Window)> = windows
        .into_iter()
        .map(|w| (weight_of(weight, &w), w))
        .filter(|(w, _)| *w > 0.0)
        .collect();
    ranked.sort_by(|(wa, a), (wb, b)| {
        wb.total_cmp(wa)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.left.cmp(&b.left))
    });

    let mut kept: Vec<Window> = Vec::new();
    for (_, window) in ranked {
        if kept.iter().all(|k| !k.overlaps(&window)) {
            kept.push(window);
        }
    }
    kept
}
