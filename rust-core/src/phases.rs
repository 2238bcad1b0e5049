//! Theoretical arrivals.
//!
//! Travel times come from an external [`TravelTimeLookup`]. They serve twice:
//! the first arrival and the slowest surface wave bound the part of the
//! trace worth picking in, and every final window is labelled with the
//! phases predicted inside it.

use crate::config::Config;
use crate::metadata::{epicentral_distance_deg, epicentral_distance_km};
use crate::stalta::NoiseBounds;
use crate::types::{seconds_between, Event, PhaseArrival, Station, TravelTime, Window};

use chrono::{DateTime, Utc};

/// Source of predicted phase travel times.
///
/// Any `Fn(f64, f64) -> Vec<TravelTime>` taking `(distance_in_deg,
/// source_depth_in_km)` is a lookup.
pub trait TravelTimeLookup {
    /// Travel times in seconds after the origin, in any order.
    fn travel_times(&self, distance_in_deg: f64, source_depth_in_km: f64) -> Vec<TravelTime>;
}

impl<F> TravelTimeLookup for F
where
    F: Fn(f64, f64) -> Vec<TravelTime>,
{
    fn travel_times(&self, distance_in_deg: f64, source_depth_in_km: f64) -> Vec<TravelTime> {
        self(distance_in_deg, source_depth_in_km)
    }
}

/// Travel times of one event/station pair, relative to a trace.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedArrivals {
    pub distance_in_deg: f64,
    pub distance_in_km: f64,
    /// Origin time minus the trace's first sample, seconds.
    pub origin_offset: f64,
    /// Sorted by time; only finite times.
    pub travel_times: Vec<TravelTime>,
}

impl PredictedArrivals {
    pub fn compute(
        event: &Event,
        station: &Station,
        trace_start: DateTime<Utc>,
        lookup: &dyn TravelTimeLookup,
    ) -> Self {
        let distance_in_deg = epicentral_distance_deg(event, station);
        let mut travel_times: Vec<TravelTime> = lookup
            .travel_times(distance_in_deg, event.depth_in_m / 1000.0)
            .into_iter()
            .filter(|tt| tt.time.is_finite())
            .collect();
        travel_times.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self {
            distance_in_deg,
            distance_in_km: epicentral_distance_km(event, station),
            origin_offset: seconds_between(trace_start, event.origin_time),
            travel_times,
        }
    }

    pub fn first_arrival(&self) -> Option<f64> {
        self.travel_times.first().map(|tt| tt.time)
    }

    /// Time range, from the first sample, where signal can be expected.
    /// `None` when the lookup returned nothing.
    pub fn noise_bounds(&self, config: &Config) -> Option<NoiseBounds> {
        let first_arrival = self.first_arrival()?;
        Some(NoiseBounds {
            min_time: first_arrival - config.time_before_first_arrival() + self.origin_offset,
            max_time: self.distance_in_km / config.min_surface_wave_velocity
                + self.origin_offset
                + config.max_period,
        })
    }

    /// Arrivals predicted within `[left*dt, right*dt]`.
    pub fn within(&self, window: &Window) -> Vec<PhaseArrival> {
        let start = window.relative_starttime() - self.origin_offset;
        let end = window.relative_endtime() - self.origin_offset;
        self.travel_times
            .iter()
            .filter(|tt| tt.time >= start && tt.time <= end)
            .map(|tt| PhaseArrival {
                phase_name: tt.phase_name.clone(),
                time: tt.time,
                distance_in_deg: self.distance_in_deg,
            })
            .collect()
    }

    pub fn attach(&self, windows: &mut [Window]) {
        for window in windows {
            window.phase_arrivals = self.within(window);
        }
    }
}
