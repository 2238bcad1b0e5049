//! Window selection pipeline.
//!
//! Orchestrates the full data flow from an observed/synthetic trace pair to
//! the final list of windows.
//!
//! # Architecture
//!
//! 1. **Metadata**: resolve event and station, warn once if either is missing
//! 2. **Picking**: STA/LTA of the envelope, local extrema, noise-bound trimming
//! 3. **Rejection**: shape tests on every candidate trough pair
//! 4. **Data fit**: cross-correlation, lag, and amplitude ratio gate
//! 5. **Resolution**: overlap removal by window weight
//! 6. **Phases**: theoretical arrivals attached to each final window
//!
//! Each run is independent. Nothing but the last run's picks and warnings is
//! kept on the selector, and the input traces are never modified.

use tracing::{debug, info, warn};

use crate::config::{Config, PickerSource};
use crate::envelope::envelope;
use crate::error::{Result, SelectionError, SelectionWarning};
use crate::metadata;
use crate::phases::{PredictedArrivals, TravelTimeLookup};
use crate::rejection::RejectionCascade;
use crate::scheduling;
use crate::similarity::SimilarityScorer;
use crate::stalta::Picks;
use crate::types::{Event, EventSource, Station, Trace, Window};

/// Relative tolerance on equal sampling intervals.
const DELTA_TOLERANCE: f64 = 1e-9;

/// Window selector for one observed/synthetic trace pair.
pub struct WindowSelector<'a> {
    observed: &'a Trace,
    synthetic: &'a Trace,
    config: &'a Config,
    travel_times: Option<&'a dyn TravelTimeLookup>,
    event: Option<Event>,
    station: Option<Station>,
    warnings: Vec<SelectionWarning>,
    picks: Picks,
    accepted: Vec<Window>,
}

impl<'a> WindowSelector<'a> {
    /// Validate the inputs and resolve metadata.
    ///
    /// Fails on an invalid configuration or on traces that cannot be compared
    /// sample by sample. Missing metadata is not an error.
    pub fn new(
        observed: &'a Trace,
        synthetic: &'a Trace,
        config: &'a Config,
        event: EventSource<'_>,
    ) -> Result<Self> {
        config.validate()?;
        check_trace("observed", observed)?;
        check_trace("synthetic", synthetic)?;
        check_shapes(observed, synthetic)?;

        let (event, station) = metadata::resolve(observed, event);
        Ok(Self {
            observed,
            synthetic,
            config,
            travel_times: None,
            event,
            station,
            warnings: Vec::new(),
            picks: Picks::default(),
            accepted: Vec::new(),
        })
    }

    /// Use `lookup` for travel-time rejection and phase association.
    pub fn with_travel_times(mut self, lookup: &'a dyn TravelTimeLookup) -> Self {
        self.travel_times = Some(lookup);
        self
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn station(&self) -> Option<&Station> {
        self.station.as_ref()
    }

    /// Warnings of the most recent run.
    pub fn warnings(&self) -> &[SelectionWarning] {
        &self.warnings
    }

    /// STA/LTA curve of the most recent run.
    pub fn stalta(&self) -> &[f64] {
        &self.picks.stalta
    }

    pub fn peaks(&self) -> &[usize] {
        &self.picks.peaks
    }

    pub fn troughs(&self) -> &[usize] {
        &self.picks.troughs
    }

    /// Windows that passed the acceptance gate in the most recent run,
    /// before overlap resolution.
    pub fn accepted(&self) -> &[Window] {
        &self.accepted
    }

    /// Run the full pipeline.
    ///
    /// Returns windows sorted by `left`, pairwise non-overlapping, each
    /// passing the acceptance gate. Deterministic for identical inputs.
    pub fn select_windows(&mut self) -> Vec<Window> {
        self.warnings.clear();
        let arrivals = self.predicted_arrivals();

        let picker_trace = match self.config.picker_source {
            PickerSource::Synthetic => self.synthetic,
            PickerSource::Observed => self.observed,
        };
        let dt = self.observed.delta;
        let mut picks = Picks::from_envelope(&envelope(&picker_trace.data), dt, self.config.min_period);

        let noise_bounds = arrivals.as_ref().and_then(|a| a.noise_bounds(self.config));
        if let Some(bounds) = &noise_bounds {
            picks.restrict_to(bounds, dt);
        }
        debug!(
            peaks = picks.peaks.len(),
            troughs = picks.troughs.len(),
            "picked STA/LTA extrema"
        );

        let minima_level = self.config.c_0 * self.config.stalta_waterlevel;
        let candidates = picks.initial_candidates(self.config.stalta_waterlevel, minima_level);
        let candidates = RejectionCascade::new(&picks, self.config, dt)
            .with_noise_bounds(noise_bounds)
            .apply(candidates);
        self.picks = picks;

        self.accepted = SimilarityScorer::new(self.observed, self.synthetic, self.config).apply(&candidates);
        let mut windows = scheduling::resolve(
            self.accepted.clone(),
            self.config.resolution_strategy,
            self.config.weight_strategy(),
        );

        if let Some(arrivals) = &arrivals {
            arrivals.attach(&mut windows);
        }

        info!(
            count = windows.len(),
            channel = self.observed.channel_id.as_deref().unwrap_or(""),
            "selected windows"
        );
        windows
    }

    /// Predicted arrivals, or `None` with a warning when the event or the
    /// station is unknown.
    fn predicted_arrivals(&mut self) -> Option<PredictedArrivals> {
        match (&self.event, &self.station) {
            (Some(event), Some(station)) => {
                let lookup = self.travel_times?;
                Some(PredictedArrivals::compute(
                    event,
                    station,
                    self.observed.starttime,
                    lookup,
                ))
            }
            (event, station) => {
                let warning = SelectionWarning::MetadataUnavailable {
                    event_missing: event.is_none(),
                    station_missing: station.is_none(),
                };
                warn!("{warning}");
                self.warnings.push(warning);
                None
            }
        }
    }
}

/// Result of a one-shot selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Final windows, sorted by `left`.
    pub windows: Vec<Window>,
    /// At most one [`SelectionWarning::MetadataUnavailable`].
    pub warnings: Vec<SelectionWarning>,
}

/// Select windows for one trace pair in a single call.
pub fn select_windows(
    observed: &Trace,
    synthetic: &Trace,
    config: &Config,
    event: EventSource<'_>,
    travel_times: Option<&dyn TravelTimeLookup>,
) -> Result<Selection> {
    let mut selector = WindowSelector::new(observed, synthetic, config, event)?;
    if let Some(lookup) = travel_times {
        selector = selector.with_travel_times(lookup);
    }
    let windows = selector.select_windows();
    Ok(Selection {
        windows,
        warnings: selector.warnings,
    })
}

fn check_trace(name: &str, trace: &Trace) -> Result<()> {
    if trace.is_empty() {
        return Err(SelectionError::InvalidTrace(format!("{name} trace has no samples")));
    }
    if !(trace.delta.is_finite() && trace.delta > 0.0) {
        return Err(SelectionError::InvalidTrace(format!(
            "{name} trace has sampling interval {}",
            trace.delta
        )));
    }
    if let Some(index) = trace.data.iter().position(|x| !x.is_finite()) {
        return Err(SelectionError::InvalidTrace(format!(
            "{name} trace has a non-finite sample at index {index}"
        )));
    }
    Ok(())
}

fn check_shapes(observed: &Trace, synthetic: &Trace) -> Result<()> {
    let delta_mismatch =
        (observed.delta - synthetic.delta).abs() > DELTA_TOLERANCE * observed.delta.max(synthetic.delta);
    if observed.len() != synthetic.len() || delta_mismatch {
        return Err(SelectionError::ShapeMismatch {
            observed_len: observed.len(),
            synthetic_len: synthetic.len(),
            observed_delta: observed.delta,
            synthetic_delta: synthetic.delta,
        });
    }
    Ok(())
}
