//! Event and station resolution.
//!
//! Event information comes from one of three places, chosen once at the top
//! of a selection run: an explicit [`Event`], the first origin of a
//! [`Catalog`], or the SAC header embedded in the observed trace. Station
//! coordinates always come from the observed trace header.
//!
//! Missing metadata is not an error. The resolver simply returns `None` and
//! the selector reports one warning per run.

use crate::types::{add_seconds, Catalog, Event, EventSource, SacHeader, Station, Trace};

/// Mean Earth radius used for great-circle distances, km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Resolve `(event, station)` for a selection run.
pub fn resolve(observed: &Trace, source: EventSource<'_>) -> (Option<Event>, Option<Station>) {
    let event = match source {
        EventSource::Explicit(event) => Some(event),
        EventSource::Catalog(catalog) => event_from_catalog(catalog),
        EventSource::FromTraceHeader => observed
            .sac
            .as_ref()
            .and_then(|sac| event_from_header(observed, sac)),
    };
    let station = observed.sac.as_ref().and_then(station_from_header);
    (event, station)
}

/// First origin of the first event. Further events are ignored.
pub fn event_from_catalog(catalog: &Catalog) -> Option<Event> {
    let origin = catalog.events.first()?.origins.first()?;
    Some(Event::new(
        origin.latitude,
        origin.longitude,
        origin.depth,
        origin.time,
    ))
}

/// Event from SAC header fields. Origin time is `starttime + (o - b)`.
///
/// An origin offset that cannot be placed on the calendar makes the event
/// unavailable.
pub fn event_from_header(trace: &Trace, sac: &SacHeader) -> Option<Event> {
    let latitude = sac.evla?;
    let longitude = sac.evlo?;
    let depth_in_km = sac.evdp?;
    let origin_offset = sac.o? - sac.b.unwrap_or(0.0);
    let origin_time = add_seconds(trace.starttime, origin_offset)?;
    Some(Event::new(latitude, longitude, depth_in_km * 1000.0, origin_time))
}

pub fn station_from_header(sac: &SacHeader) -> Option<Station> {
    Some(Station {
        latitude: sac.stla?,
        longitude: sac.stlo?,
        elevation_in_m: sac.stel,
    })
}

/// Great-circle epicentral distance in degrees (haversine).
pub fn epicentral_distance_deg(event: &Event, station: &Station) -> f64 {
    let lat1 = event.latitude.to_radians();
    let lat2 = station.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (station.longitude - event.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin().to_degrees()
}

/// Great-circle epicentral distance in kilometres.
pub fn epicentral_distance_km(event: &Event, station: &Station) -> f64 {
    epicentral_distance_deg(event, station).to_radians() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogEvent, Origin};
    use chrono::{TimeZone, Utc};

    fn header() -> SacHeader {
        SacHeader {
            evla: Some(-3.77),
            evlo: Some(-77.07),
            evdp: Some(112.8),
            o: Some(0.0),
            b: Some(-600.0),
            stla: Some(37.93),
            stlo: Some(58.12),
            stel: Some(678.0),
        }
    }

    fn trace_with(sac: Option<SacHeader>) -> Trace {
        let start = Utc.with_ymd_and_hms(1995, 5, 2, 5, 56, 13).unwrap();
        let mut trace = Trace::new(vec![0.0; 16], 1.0, start);
        trace.sac = sac;
        trace
    }

    #[test]
    fn test_event_from_header() {
        let trace = trace_with(Some(header()));
        let (event, station) = resolve(&trace, EventSource::FromTraceHeader);
        let event = event.unwrap();
        assert!((event.latitude + 3.77).abs() <= 1e-5);
        assert!((event.longitude + 77.07).abs() <= 1e-5);
        assert!((event.depth_in_m - 112_800.0).abs() <= 1e-5);
        assert_eq!(
            event.origin_time,
            Utc.with_ymd_and_hms(1995, 5, 2, 6, 6, 13).unwrap()
        );

        let station = station.unwrap();
        assert_eq!(station.latitude, 37.93);
        assert_eq!(station.elevation_in_m, Some(678.0));
    }

    #[test]
    fn test_unplaceable_origin_offset_drops_event() {
        for o in [1e20, -1e20, f64::INFINITY, f64::NAN] {
            let trace = trace_with(Some(SacHeader { o: Some(o), ..header() }));
            let (event, station) = resolve(&trace, EventSource::FromTraceHeader);
            assert!(event.is_none(), "o = {o}");
            assert!(station.is_some());
        }
    }

    #[test]
    fn test_explicit_event_wins_over_header() {
        let trace = trace_with(Some(header()));
        let ev = Event::new(1.0, 2.0, 3.0, Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap());
        let (event, station) = resolve(&trace, EventSource::Explicit(ev));
        assert_eq!(event, Some(ev));
        assert!(station.is_some());
    }

    #[test]
    fn test_catalog_uses_first_event() {
        let t = Utc.with_ymd_and_hms(2012, 4, 4, 14, 21, 42).unwrap();
        let catalog = Catalog::new(vec![
            CatalogEvent {
                origins: vec![Origin { latitude: 41.8, longitude: 79.9, depth: 10_000.0, time: t }],
            },
            CatalogEvent {
                origins: vec![Origin { latitude: 0.0, longitude: 0.0, depth: 0.0, time: t }],
            },
        ]);
        let trace = trace_with(None);
        let (event, station) = resolve(&trace, EventSource::Catalog(&catalog));
        assert_eq!(event, Some(Event::new(41.8, 79.9, 10_000.0, t)));
        assert!(station.is_none());
    }

    #[test]
    fn test_empty_catalog_is_unavailable() {
        let trace = trace_with(Some(header()));
        let (event, _) = resolve(&trace, EventSource::Catalog(&Catalog::default()));
        assert!(event.is_none());
    }

    #[test]
    fn test_partial_header_is_unavailable() {
        let mut sac = header();
        sac.o = None;
        sac.stlo = None;
        let trace = trace_with(Some(sac));
        let (event, station) = resolve(&trace, EventSource::FromTraceHeader);
        assert!(event.is_none());
        assert!(station.is_none());

        let (event, station) = resolve(&trace_with(None), EventSource::FromTraceHeader);
        assert!(event.is_none() && station.is_none());
    }

    #[test]
    fn test_epicentral_distance() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let event = Event::new(0.0, 0.0, 0.0, t);
        assert!((epicentral_distance_deg(&event, &Station::new(0.0, 90.0)) - 90.0).abs() < 1e-9);
        assert!((epicentral_distance_deg(&event, &Station::new(0.0, 180.0)) - 180.0).abs() < 1e-9);
        assert!((epicentral_distance_deg(&event, &Station::new(45.0, 0.0)) - 45.0).abs() < 1e-9);
        let km = epicentral_distance_km(&event, &Station::new(0.0, 1.0));
        assert!((km - 111.19).abs() < 0.01);
    }
}
