use serde::Serialize;
use time::OffsetDateTime;

/// Name used when the document has no `<trk><name>` element.
pub const DEFAULT_TRACK_NAME: &str = "Unnamed Track";

/// A single recorded GPS fix (`<trkpt>`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            timestamp: None,
        }
    }
}

/// Minimal latitude/longitude rectangle containing every point of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Identity box: the first call to `extend` tightens every side.
    pub(crate) fn empty() -> Self {
        Self {
            min_latitude: 90.0,
            max_latitude: -90.0,
            min_longitude: 180.0,
            max_longitude: -180.0,
        }
    }

    pub(crate) fn extend(&mut self, point: &TrackPoint) {
        self.min_latitude = self.min_latitude.min(point.latitude);
        self.max_latitude = self.max_latitude.max(point.latitude);
        self.min_longitude = self.min_longitude.min(point.longitude);
        self.max_longitude = self.max_longitude.max(point.longitude);
    }

    pub fn contains(&self, point: &TrackPoint) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }

    /// GeoJSON ordering: `[west, south, east, north]`.
    pub fn to_geojson_bbox(&self) -> Vec<f64> {
        vec![
            self.min_longitude,
            self.min_latitude,
            self.max_longitude,
            self.max_latitude,
        ]
    }
}

/// Aggregates derived from a point sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStatistics {
    pub total_distance_meters: f64,
    pub elevation_gain_meters: f64,
    pub elevation_loss_meters: f64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub duration_seconds: Option<i64>,
}

/// A parsed GPX track. Built once by the parser and never mutated, so the
/// point sequence is always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    name: String,
    points: Vec<TrackPoint>,
    bounds: BoundingBox,
    stats: TrackStatistics,
}

impl Track {
    pub(crate) fn new(
        name: String,
        points: Vec<TrackPoint>,
        bounds: BoundingBox,
        stats: TrackStatistics,
    ) -> Self {
        debug_assert!(!points.is_empty());
        Self {
            name,
            points,
            bounds,
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn stats(&self) -> &TrackStatistics {
        &self.stats
    }

    pub fn first_point(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn last_point(&self) -> &TrackPoint {
        &self.points[self.points.len() - 1]
    }

    /// True when every point carries an elevation value.
    pub fn has_full_elevation(&self) -> bool {
        self.points.iter().all(|p| p.elevation.is_some())
    }
}
