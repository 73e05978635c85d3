use time::OffsetDateTime;

use crate::error::ParseError;
use crate::gpx_types::*;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates, using the
/// haversine formula on a sphere of radius [`EARTH_RADIUS_METERS`].
///
/// Elevation is ignored: a climb does not lengthen the horizontal distance.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

pub fn distance_between(from: &TrackPoint, to: &TrackPoint) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Single-pass accumulator for bounds, distance, elevation and time.
///
/// Points are consumed in document order; nothing is re-sorted.
#[derive(Debug)]
pub struct TrackAccumulator {
    points: Vec<TrackPoint>,
    bounds: BoundingBox,
    total_distance: f64,
    elevation_gain: f64,
    elevation_loss: f64,
    start_time: Option<OffsetDateTime>,
    end_time: Option<OffsetDateTime>,
}

impl Default for TrackAccumulator {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            bounds: BoundingBox::empty(),
            total_distance: 0.0,
            elevation_gain: 0.0,
            elevation_loss: 0.0,
            start_time: None,
            end_time: None,
        }
    }
}

impl TrackAccumulator {
    pub fn push(&mut self, point: TrackPoint) {
        self.bounds.extend(&point);

        if let Some(time) = point.timestamp {
            if self.start_time.is_none_or(|start| time < start) {
                self.start_time = Some(time);
            }
            if self.end_time.is_none_or(|end| time > end) {
                self.end_time = Some(time);
            }
        }

        if let Some(prev) = self.points.last() {
            self.total_distance += distance_between(prev, &point);

            if let (Some(prev_ele), Some(ele)) = (prev.elevation, point.elevation) {
                let diff = ele - prev_ele;
                // a zero delta lands in the loss branch with magnitude 0
                if diff > 0.0 {
                    self.elevation_gain += diff;
                } else {
                    self.elevation_loss += diff.abs();
                }
            }
        }

        self.points.push(point);
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    /// Assemble the track, failing when no point was pushed.
    pub fn finish(self, name: String) -> Result<Track, ParseError> {
        if self.points.is_empty() {
            return Err(ParseError::NoTrackPoints);
        }

        let duration_seconds = match (self.start_time, self.end_time) {
            // end >= start, so truncation is a floor
            (Some(start), Some(end)) => Some((end - start).whole_seconds()),
            _ => None,
        };

        let stats = TrackStatistics {
            total_distance_meters: self.total_distance,
            elevation_gain_meters: self.elevation_gain,
            elevation_loss_meters: self.elevation_loss,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds,
        };

        Ok(Track::new(name, self.points, self.bounds, stats))
    }
}

/// Build a track from an already extracted point sequence.
pub fn build_track<I>(name: impl Into<String>, points: I) -> Result<Track, ParseError>
where
    I: IntoIterator<Item = TrackPoint>,
{
    let mut acc = TrackAccumulator::default();
    for point in points {
        acc.push(point);
    }
    acc.finish(name.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn point(lat: f64, lon: f64, ele: Option<f64>) -> TrackPoint {
        TrackPoint {
            elevation: ele,
            ..TrackPoint::new(lat, lon)
        }
    }

    #[test]
    fn test_one_degree_at_equator() {
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1.0);
        assert!((d - 111_195.0).abs() < 1.0);
    }

    #[test]
    fn test_distance_symmetric_and_non_negative() {
        let pairs = [
            ((51.5, -0.12), (48.85, 2.35)),
            ((-33.9, 151.2), (40.7, -74.0)),
            ((89.9, 10.0), (-89.9, -170.0)),
            ((0.0, 179.9), (0.0, -179.9)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = haversine_distance(lat1, lon1, lat2, lon2);
            let ba = haversine_distance(lat2, lon2, lat1, lon1);
            assert!(ab > 0.0);
            assert!((ab - ba).abs() < 1e-6);
        }
    }

    #[test]
    fn test_distance_zero_for_identical_points() {
        assert_eq!(haversine_distance(51.0, -0.1, 51.0, -0.1), 0.0);
        assert_eq!(haversine_distance(-45.5, 170.25, -45.5, 170.25), 0.0);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let d = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - EARTH_RADIUS_METERS * std::f64::consts::PI).abs() < 1.0);
    }

    #[test]
    fn test_gain_loss_decomposition() {
        let elevations = [100.0, 112.5, 98.0, 98.0, 143.25, 120.0, 121.0];
        let points = elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| point(45.0 + i as f64 * 0.001, 7.0, Some(e)));
        let track = build_track("hill", points).unwrap();
        let stats = track.stats();

        assert!(stats.elevation_gain_meters >= 0.0);
        assert!(stats.elevation_loss_meters >= 0.0);
        let net = stats.elevation_gain_meters - stats.elevation_loss_meters;
        assert!((net - (121.0 - 100.0)).abs() < 1e-9);
        assert!((stats.elevation_gain_meters - (12.5 + 45.25 + 1.0)).abs() < 1e-9);
        assert!((stats.elevation_loss_meters - (14.5 + 23.25)).abs() < 1e-9);
    }

    #[test]
    fn test_elevation_skipped_when_either_side_missing() {
        let points = vec![
            point(45.0, 7.0, Some(100.0)),
            point(45.001, 7.0, None),
            point(45.002, 7.0, Some(50.0)),
            point(45.003, 7.0, Some(60.0)),
        ];
        let track = build_track("gaps", points).unwrap();
        assert_eq!(track.stats().elevation_gain_meters, 10.0);
        assert_eq!(track.stats().elevation_loss_meters, 0.0);
    }

    #[test]
    fn test_time_bounds_are_min_max_not_first_last() {
        let t0 = datetime!(2024-01-01 00:00:00 UTC);
        let t1 = datetime!(2024-01-01 01:30:00 UTC);
        let points = vec![
            TrackPoint {
                timestamp: Some(t1),
                ..TrackPoint::new(10.0, 10.0)
            },
            TrackPoint {
                timestamp: Some(t0),
                ..TrackPoint::new(10.001, 10.0)
            },
        ];
        let track = build_track("reversed", points).unwrap();
        assert_eq!(track.stats().start_time, Some(t0));
        assert_eq!(track.stats().end_time, Some(t1));
        assert_eq!(track.stats().duration_seconds, Some(5400));
    }

    #[test]
    fn test_duration_floors_fractional_seconds() {
        let points = vec![
            TrackPoint {
                timestamp: Some(datetime!(2024-01-01 00:00:00.250 UTC)),
                ..TrackPoint::new(10.0, 10.0)
            },
            TrackPoint {
                timestamp: Some(datetime!(2024-01-01 00:00:10.900 UTC)),
                ..TrackPoint::new(10.001, 10.0)
            },
        ];
        let track = build_track("fractional", points).unwrap();
        assert_eq!(track.stats().duration_seconds, Some(10));
    }

    #[test]
    fn test_no_timestamps_means_no_duration() {
        let track = build_track("untimed", vec![point(1.0, 1.0, None)]).unwrap();
        assert!(track.stats().start_time.is_none());
        assert!(track.stats().end_time.is_none());
        assert!(track.stats().duration_seconds.is_none());
    }

    #[test]
    fn test_bounds_contain_every_point() {
        let points = vec![
            point(-12.5, 130.0, None),
            point(3.25, -170.5, None),
            point(60.0, 0.0, None),
            point(-80.0, 179.0, None),
        ];
        let track = build_track("wide", points).unwrap();
        let b = track.bounds();
        assert_eq!(b.min_latitude, -80.0);
        assert_eq!(b.max_latitude, 60.0);
        assert_eq!(b.min_longitude, -170.5);
        assert_eq!(b.max_longitude, 179.0);
        assert!(track.points().iter().all(|p| b.contains(p)));
    }

    #[test]
    fn test_single_point_track() {
        let track = build_track("dot", vec![point(51.0, -0.1, Some(10.0))]).unwrap();
        assert_eq!(track.stats().total_distance_meters, 0.0);
        assert_eq!(track.bounds().min_latitude, 51.0);
        assert_eq!(track.bounds().max_latitude, 51.0);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = build_track("nothing", Vec::new()).unwrap_err();
        assert!(matches!(err, ParseError::NoTrackPoints));
    }
}
