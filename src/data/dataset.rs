//! Decoded trip datasets and point-level filtering

use crate::data::Result;
use geo::{Coord, Rect};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One raw wire record: `[timestamp, latitude, longitude, ...]`.
type RawRecord = Vec<serde_json::Value>;

/// A decoded trip dataset.
///
/// The wire format is a JSON object mapping trip identifiers to ordered
/// record lists. Trips are stored in a [`BTreeMap`] so iteration order is
/// deterministic, which keeps seeded sampling reproducible across runs.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    trips: BTreeMap<String, Vec<RawRecord>>,
}

impl Dataset {
    /// Decode a dataset from its JSON wire form.
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Number of trips in the dataset.
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Total number of records across all trips, valid or not.
    pub fn record_count(&self) -> usize {
        self.trips.values().map(|records| records.len()).sum()
    }

    /// Flatten the per-trip record lists into a single point list.
    ///
    /// Trips are visited in key order and records in sequence order, so the
    /// output is deterministic for a given dataset. Records that are too
    /// short or carry unusable coordinates are skipped and counted.
    pub fn flatten(&self) -> (Vec<TripPoint>, DatasetInfo) {
        profiling::scope!("flatten_dataset");

        let per_trip: Vec<(Vec<TripPoint>, usize)> = self
            .trips
            .par_iter()
            .map(|(trip_id, records)| {
                let mut points = Vec::with_capacity(records.len());
                let mut skipped = 0usize;
                for record in records {
                    match TripPoint::from_record(record) {
                        Some(point) => points.push(point),
                        None => {
                            skipped += 1;
                            tracing::trace!("Skipping invalid record in trip {trip_id}");
                        }
                    }
                }
                (points, skipped)
            })
            .collect();

        let mut points = Vec::with_capacity(self.record_count());
        let mut skipped_records = 0;
        for (trip_points, skipped) in per_trip {
            points.extend(trip_points);
            skipped_records += skipped;
        }

        if skipped_records > 0 {
            tracing::warn!("Skipped {skipped_records} invalid records while flattening");
        }

        let info = DatasetInfo {
            trip_count: self.trip_count(),
            record_count: self.record_count(),
            point_count: points.len(),
            skipped_records,
        };
        (points, info)
    }
}

/// A single observed position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Unix timestamp in seconds; `None` when the leading field is missing
    /// or not numeric
    pub time: Option<f64>,
}

impl TripPoint {
    /// Build a point from one wire record, rejecting records that are too
    /// short or whose coordinates are not usable. A non-numeric timestamp
    /// does not reject the record, it only leaves `time` unset.
    fn from_record(record: &[serde_json::Value]) -> Option<Self> {
        if record.len() < 3 {
            return None;
        }

        let lat = record[1].as_f64()?;
        let lon = record[2].as_f64()?;
        if !is_valid_coordinate(lat, lon) {
            return None;
        }

        Some(Self {
            lat,
            lon,
            time: record[0].as_f64(),
        })
    }
}

/// Latitude/longitude sanity check (finite and within geographic range).
#[inline(always)]
fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Counters describing one flattened dataset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DatasetInfo {
    /// Number of trips in the dataset
    pub trip_count: usize,
    /// Total records on the wire, valid or not
    pub record_count: usize,
    /// Records that became points
    pub point_count: usize,
    /// Records rejected while flattening
    pub skipped_records: usize,
}

/// Compute the bounding rectangle of a point list.
///
/// Follows the `geo` convention of x = longitude and y = latitude. Returns
/// `None` for an empty input.
pub fn bounding_box(points: &[TripPoint]) -> Option<Rect<f64>> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;

    for point in points {
        min_lat = min_lat.min(point.lat);
        max_lat = max_lat.max(point.lat);
        min_lon = min_lon.min(point.lon);
        max_lon = max_lon.max(point.lon);
    }

    Some(Rect::new(
        Coord {
            x: min_lon,
            y: min_lat,
        },
        Coord {
            x: max_lon,
            y: max_lat,
        },
    ))
}

/// Default window extent before the reference time, in seconds (2 hours).
pub const DEFAULT_WINDOW_BEFORE: f64 = 2.0 * 3600.0;

/// Default window extent after the reference time, in seconds (4 hours).
pub const DEFAULT_WINDOW_AFTER: f64 = 4.0 * 3600.0;

/// Asymmetric time window around a reference timestamp, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    /// Reference unix timestamp in seconds
    pub center: f64,
    /// Seconds accepted before the reference time
    pub before: f64,
    /// Seconds accepted after the reference time
    pub after: f64,
}

impl TimeWindow {
    pub fn new(center: f64, before: f64, after: f64) -> Self {
        Self {
            center,
            before,
            after,
        }
    }

    /// Whether `time` falls inside the window (bounds inclusive).
    pub fn contains(&self, time: f64) -> bool {
        if time < self.center {
            self.center - time <= self.before
        } else {
            time - self.center <= self.after
        }
    }

    /// Keep only points whose timestamp lies inside the window. Points
    /// without a usable timestamp are dropped.
    pub fn apply(&self, points: &mut Vec<TripPoint>) {
        points.retain(|point| point.time.is_some_and(|time| self.contains(time)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_dataset() -> Dataset {
        Dataset::parse(
            r#"{
                "trip-b": [[200.0, 37.775, -122.434], [300.0, 37.776, -122.435]],
                "trip-a": [[100.0, 37.774, -122.433]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_wire_format() {
        let dataset = create_test_dataset();

        assert_eq!(dataset.trip_count(), 2);
        assert_eq!(dataset.record_count(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(Dataset::parse("{\"trip\": [[1,").is_err());
        assert!(Dataset::parse("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_flatten_visits_trips_in_key_order() {
        let (points, info) = create_test_dataset().flatten();

        assert_eq!(info.point_count, 3);
        // "trip-a" sorts before "trip-b"
        assert_eq!(points[0].time, Some(100.0));
        assert_eq!(points[1].time, Some(200.0));
        assert_eq!(points[2].time, Some(300.0));
    }

    #[test]
    fn test_flatten_skips_short_and_invalid_records() {
        let dataset = Dataset::parse(
            r#"{
                "trip": [
                    [100.0, 37.774, -122.433],
                    [200.0, 37.775],
                    [300.0, 95.0, -122.435],
                    [400.0, 37.777, -200.0],
                    [500.0, "north", -122.438]
                ]
            }"#,
        )
        .unwrap();

        let (points, info) = dataset.flatten();

        assert_eq!(points.len(), 1);
        assert_eq!(info.record_count, 5);
        assert_eq!(info.skipped_records, 4);
    }

    #[test]
    fn test_flatten_tolerates_records_with_extra_elements() {
        let dataset = Dataset::parse(
            r#"{"trip": [[100.0, 37.774, -122.433, "speed", 42]]}"#,
        )
        .unwrap();

        let (points, info) = dataset.flatten();

        assert_eq!(info.point_count, 1);
        assert_eq!(info.skipped_records, 0);
        assert_eq!(points[0].time, Some(100.0));
        assert_eq!(points[0].lat, 37.774);
        assert_eq!(points[0].lon, -122.433);
    }

    #[test]
    fn test_flatten_keeps_points_with_non_numeric_timestamp() {
        let dataset = Dataset::parse(
            r#"{"trip": [["2014-09-05 00:30:00", 37.774, -122.433]]}"#,
        )
        .unwrap();

        let (points, info) = dataset.flatten();

        assert_eq!(info.point_count, 1);
        assert_eq!(points[0].time, None);
        assert_eq!(points[0].lat, 37.774);
    }

    #[test]
    fn test_bounding_box_spans_all_points() {
        let (points, _) = create_test_dataset().flatten();

        let bbox = bounding_box(&points).unwrap();

        assert_eq!(bbox.min().y, 37.774);
        assert_eq!(bbox.max().y, 37.776);
        assert_eq!(bbox.min().x, -122.435);
        assert_eq!(bbox.max().x, -122.433);
    }

    #[test]
    fn test_bounding_box_of_empty_input_is_none() {
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn test_time_window_bounds_are_inclusive() {
        let window = TimeWindow::new(1000.0, 200.0, 400.0);

        assert!(window.contains(800.0));
        assert!(window.contains(1000.0));
        assert!(window.contains(1400.0));
        assert!(!window.contains(799.9));
        assert!(!window.contains(1400.1));
    }

    #[test]
    fn test_time_window_drops_untimestamped_points() {
        let window = TimeWindow::new(1000.0, 200.0, 400.0);
        let mut points = vec![
            TripPoint {
                lat: 37.774,
                lon: -122.433,
                time: Some(900.0),
            },
            TripPoint {
                lat: 37.775,
                lon: -122.434,
                time: None,
            },
            TripPoint {
                lat: 37.776,
                lon: -122.435,
                time: Some(1500.0),
            },
        ];

        window.apply(&mut points);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].time, Some(900.0));
    }
}
