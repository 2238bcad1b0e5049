//! Core data types for window selection.
//!
//! This module defines the values that flow through the selection pipeline:
//! the two input traces, the event/station metadata that gates phase
//! association, intermediate candidate windows, and the final windows handed
//! back to the caller.
//!
//! Design principle: if a concept exists, it gets a type. Sample indices are
//! `usize` throughout, times are seconds as `f64`, and absolute instants are
//! `chrono::DateTime<Utc>`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WindowWeight;

// ============================================================================
// TRACES
// ============================================================================

/// Header fields that may be embedded in a trace (SAC naming).
///
/// Every field is optional; the metadata resolver only uses a group of
/// fields when all of its members are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SacHeader {
    /// Event latitude in degrees.
    pub evla: Option<f64>,
    /// Event longitude in degrees.
    pub evlo: Option<f64>,
    /// Event depth in kilometres.
    pub evdp: Option<f64>,
    /// Origin time relative to the reference time, in seconds.
    pub o: Option<f64>,
    /// Begin time of the trace relative to the reference time, in seconds.
    pub b: Option<f64>,
    /// Station latitude in degrees.
    pub stla: Option<f64>,
    /// Station longitude in degrees.
    pub stlo: Option<f64>,
    /// Station elevation in metres.
    pub stel: Option<f64>,
}

/// A uniformly sampled, already pre-processed time series.
///
/// Owned by the caller; the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Sample values.
    pub data: Vec<f64>,
    /// Sampling interval in seconds.
    pub delta: f64,
    /// Absolute time of the first sample.
    pub starttime: DateTime<Utc>,
    /// Optional channel identifier (e.g. `II.ABKT.00.LHZ`).
    pub channel_id: Option<String>,
    /// Optional embedded header used as metadata fallback.
    pub sac: Option<SacHeader>,
}

impl Trace {
    /// Create a trace without channel id or header.
    pub fn new(data: Vec<f64>, delta: f64, starttime: DateTime<Utc>) -> Self {
        Self {
            data,
            delta,
            starttime,
            channel_id: None,
            sac: None,
        }
    }

    /// Attach an embedded header.
    pub fn with_sac_header(mut self, sac: SacHeader) -> Self {
        self.sac = Some(sac);
        self
    }

    /// Attach a channel identifier.
    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the trace holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Trace length in seconds.
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 * self.delta
    }
}

/// Seconds elapsed from `from` to `to` (negative if `to` is earlier).
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 * 1e-6,
        None => delta.num_milliseconds() as f64 * 1e-3,
    }
}

/// Offset an instant by a (possibly fractional) number of seconds.
///
/// `None` when the offset is not finite or the result leaves chrono's range.
pub fn add_seconds(instant: DateTime<Utc>, seconds: f64) -> Option<DateTime<Utc>> {
    let micros = (seconds * 1e6).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    instant.checked_add_signed(Duration::microseconds(micros as i64))
}

// ============================================================================
// EVENT AND STATION METADATA
// ============================================================================

/// Seismic source location and origin time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub latitude: f64,
    pub longitude: f64,
    pub depth_in_m: f64,
    pub origin_time: DateTime<Utc>,
}

impl Event {
    pub fn new(latitude: f64, longitude: f64, depth_in_m: f64, origin_time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            depth_in_m,
            origin_time,
        }
    }
}

/// Receiver location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_in_m: Option<f64>,
}

impl Station {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_in_m: None,
        }
    }
}

/// One origin solution of a catalog event. Depth in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub latitude: f64,
    pub longitude: f64,
    pub depth: f64,
    pub time: DateTime<Utc>,
}

/// A catalog event with one or more origin solutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEvent {
    pub origins: Vec<Origin>,
}

/// Ordered collection of catalog events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub events: Vec<CatalogEvent>,
}

impl Catalog {
    pub fn new(events: Vec<CatalogEvent>) -> Self {
        Self { events }
    }
}

/// Where the event information for a selection run comes from.
#[derive(Debug, Clone, Copy, Default)]
pub enum EventSource<'a> {
    /// Use this event unchanged.
    Explicit(Event),
    /// Use the first origin of the first event in the catalog.
    Catalog(&'a Catalog),
    /// Fall back to the observed trace's embedded header.
    #[default]
    FromTraceHeader,
}

// ============================================================================
// WINDOWS
// ============================================================================

/// Intermediate window candidate produced by the picker.
///
/// `right` is exclusive. `center` is the STA/LTA peak the candidate was
/// built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Candidate {
    pub left: usize,
    pub right: usize,
    pub center: usize,
}

impl Candidate {
    pub fn new(left: usize, right: usize, center: usize) -> Self {
        Self { left, right, center }
    }

    /// Length in samples.
    pub fn len(&self) -> usize {
        self.right - self.left
    }
}

/// A travel-time prediction returned by a [`TravelTimeLookup`](crate::phases::TravelTimeLookup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelTime {
    pub phase_name: String,
    /// Travel time in seconds after the origin time.
    pub time: f64,
}

impl TravelTime {
    pub fn new(phase_name: impl Into<String>, time: f64) -> Self {
        Self {
            phase_name: phase_name.into(),
            time,
        }
    }
}

/// A theoretical arrival attached to a selected window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseArrival {
    pub phase_name: String,
    /// Travel time in seconds after the origin time.
    pub time: f64,
    /// Epicentral distance in degrees.
    pub distance_in_deg: f64,
}

/// A selected window with its similarity measurements.
///
/// `left..right` indexes both traces (`right` exclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub left: usize,
    pub right: usize,
    /// STA/LTA peak the window was built around.
    pub center: usize,
    pub channel_id: Option<String>,
    pub time_of_first_sample: DateTime<Utc>,
    pub dt: f64,
    pub min_period: f64,
    /// Best normalized cross-correlation over the allowed shifts.
    pub max_cc_value: f64,
    /// Lag in samples of the best correlation; positive when the observed
    /// arrival lags the synthetic.
    pub cc_shift: i64,
    /// `ln(A_obs / A_syn)` from RMS amplitudes at the optimal shift.
    #[serde(rename = "dlnA")]
    pub dlna: f64,
    pub phase_arrivals: Vec<PhaseArrival>,
}

impl Window {
    /// Length in samples.
    pub fn len(&self) -> usize {
        self.right - self.left
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 * self.dt
    }

    /// Start time in seconds relative to the first sample.
    pub fn relative_starttime(&self) -> f64 {
        self.left as f64 * self.dt
    }

    /// End time in seconds relative to the first sample.
    pub fn relative_endtime(&self) -> f64 {
        self.right as f64 * self.dt
    }

    /// `None` if the start falls outside the representable time range.
    pub fn absolute_starttime(&self) -> Option<DateTime<Utc>> {
        add_seconds(self.time_of_first_sample, self.relative_starttime())
    }

    pub fn absolute_endtime(&self) -> Option<DateTime<Utc>> {
        add_seconds(self.time_of_first_sample, self.relative_endtime())
    }

    /// The correlation lag in seconds.
    pub fn cc_shift_in_seconds(&self) -> f64 {
        self.cc_shift as f64 * self.dt
    }

    /// Half-open overlap test; windows sharing an endpoint do not overlap.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.left < other.right && other.left < self.right
    }

    /// Weight of this window under the given strategy.
    pub fn weight(&self, strategy: &dyn WindowWeight) -> f64 {
        strategy.weight(self)
    }
}
