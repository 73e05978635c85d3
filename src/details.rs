use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::gpx_types::Track;

/// Display-ready text for the track info panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDetails {
    pub name: String,
    pub distance: String,
    pub elevation_gain: Option<String>,
    pub elevation_loss: Option<String>,
    pub start_time: Option<String>,
    pub duration: Option<String>,
    pub points: usize,
}

impl TrackDetails {
    pub fn from_track(track: &Track) -> Self {
        let stats = track.stats();

        // both must be non-zero for the elevation lines to show
        let (elevation_gain, elevation_loss) =
            if stats.elevation_gain_meters != 0.0 && stats.elevation_loss_meters != 0.0 {
                (
                    Some(format_meters(stats.elevation_gain_meters)),
                    Some(format_meters(stats.elevation_loss_meters)),
                )
            } else {
                (None, None)
            };

        let (start_time, duration) = match (stats.start_time, stats.duration_seconds) {
            (Some(start), Some(secs)) => (start.format(&Rfc3339).ok(), Some(format_duration(secs))),
            _ => (None, None),
        };

        Self {
            name: track.name().to_string(),
            distance: format_distance_km(stats.total_distance_meters),
            elevation_gain,
            elevation_loss,
            start_time,
            duration,
            points: track.points().len(),
        }
    }
}

/// `12345.6` → `"12.35 km"`
pub fn format_distance_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

/// `"{n} m"`, rounded to whole meters.
pub fn format_meters(meters: f64) -> String {
    format!("{:.0} m", meters)
}

/// `5400` → `"1h 30m 0s"`
pub fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}h {minutes}m {secs}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_track;

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_distance_km(12345.6), "12.35 km");
        assert_eq!(format_distance_km(0.0), "0.00 km");
        assert_eq!(format_meters(4.6), "5 m");
        assert_eq!(format_duration(5400), "1h 30m 0s");
        assert_eq!(format_duration(3725), "1h 2m 5s");
        assert_eq!(format_duration(59), "0h 0m 59s");
    }

    #[test]
    fn test_details_for_full_track() {
        let xml = r#"<gpx><trk><name>Loop</name><trkseg>
  <trkpt lat="51.0" lon="-0.1"><ele>10</ele><time>2024-01-01T00:00:00Z</time></trkpt>
  <trkpt lat="51.001" lon="-0.1"><ele>15</ele><time>2024-01-01T00:05:00Z</time></trkpt>
  <trkpt lat="51.002" lon="-0.1"><ele>12</ele><time>2024-01-01T00:10:00Z</time></trkpt>
</trkseg></trk></gpx>"#;
        let details = TrackDetails::from_track(&parse_track(xml).unwrap());

        assert_eq!(details.name, "Loop");
        assert_eq!(details.distance, "0.22 km");
        assert_eq!(details.elevation_gain.as_deref(), Some("5 m"));
        assert_eq!(details.elevation_loss.as_deref(), Some("3 m"));
        assert_eq!(details.start_time.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(details.duration.as_deref(), Some("0h 10m 0s"));
        assert_eq!(details.points, 3);
    }

    #[test]
    fn test_elevation_hidden_unless_both_sides_non_zero() {
        let xml = r#"<gpx><trk><trkseg>
  <trkpt lat="1" lon="1"><ele>10</ele></trkpt>
  <trkpt lat="1.001" lon="1"><ele>20</ele></trkpt>
</trkseg></trk></gpx>"#;
        let details = TrackDetails::from_track(&parse_track(xml).unwrap());
        assert!(details.elevation_gain.is_none());
        assert!(details.elevation_loss.is_none());
        assert!(details.start_time.is_none());
        assert!(details.duration.is_none());
    }
}
