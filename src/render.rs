use log::warn;
use serde::Serialize;

use crate::gpx_types::*;
use crate::options::{ElevationPalette, RenderOptions};

/// Everything a map widget needs to draw one track.
///
/// Positions are `[lat, lon]` pairs, the order tile-map widgets take them in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub name: String,
    pub path: Vec<[f64; 2]>,
    pub start: Marker,
    pub end: Marker,
    /// `[[minLat, minLon], [maxLat, maxLon]]`
    pub fit_bounds: [[f64; 2]; 2],
    pub style: PathStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub title: String,
    pub position: [f64; 2],
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PathStyle {
    Flat {
        color: String,
        weight: f64,
    },
    /// One color per point, plus one per segment (the color at the midpoint
    /// of its two ends) for widgets that draw segments individually.
    Gradient {
        weight: f64,
        min_elevation: f64,
        max_elevation: f64,
        point_colors: Vec<String>,
        segment_colors: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

/// Parsed low/mid/high stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    low: Rgb,
    mid: Rgb,
    high: Rgb,
}

impl Gradient {
    pub fn from_palette(palette: &ElevationPalette) -> Option<Self> {
        Some(Self {
            low: Rgb::from_hex(&palette.low)?,
            mid: Rgb::from_hex(&palette.mid)?,
            high: Rgb::from_hex(&palette.high)?,
        })
    }

    /// Color at `level` in [0, 1]: low→mid over the first half, mid→high
    /// over the second.
    pub fn color_at(&self, level: f64) -> Rgb {
        let level = level.clamp(0.0, 1.0);
        if level <= 0.5 {
            self.low.lerp(self.mid, level * 2.0)
        } else {
            self.mid.lerp(self.high, (level - 0.5) * 2.0)
        }
    }
}

/// Position of `elevation` between `min` and `max`, in [0, 1]. A flat track
/// sits at the middle of the palette.
pub fn normalize_elevation(elevation: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 {
        0.5
    } else {
        ((elevation - min) / range).clamp(0.0, 1.0)
    }
}

fn lat_lon(point: &TrackPoint) -> [f64; 2] {
    [point.latitude, point.longitude]
}

/// Build the render plan for a track.
pub fn build_render_plan(track: &Track, opts: &RenderOptions) -> RenderPlan {
    let bounds = track.bounds();

    RenderPlan {
        name: track.name().to_string(),
        path: track.points().iter().map(lat_lon).collect(),
        start: Marker {
            title: "Start".to_string(),
            position: lat_lon(track.first_point()),
            color: opts.start_color.clone(),
        },
        end: Marker {
            title: "End".to_string(),
            position: lat_lon(track.last_point()),
            color: opts.end_color.clone(),
        },
        fit_bounds: [
            [bounds.min_latitude, bounds.min_longitude],
            [bounds.max_latitude, bounds.max_longitude],
        ],
        style: path_style(track, opts),
    }
}

fn path_style(track: &Track, opts: &RenderOptions) -> PathStyle {
    let flat = PathStyle::Flat {
        color: opts.path_color.clone(),
        weight: opts.path_weight,
    };

    if !opts.elevation_gradient || !track.has_full_elevation() {
        return flat;
    }
    let elevations: Vec<f64> = track.points().iter().filter_map(|p| p.elevation).collect();
    let Some(gradient) = Gradient::from_palette(&opts.palette) else {
        warn!("invalid elevation palette {:?}, drawing a flat path", opts.palette);
        return flat;
    };

    let min = elevations.iter().copied().fold(f64::INFINITY, f64::min);
    let max = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let levels: Vec<f64> = elevations
        .iter()
        .map(|&e| normalize_elevation(e, min, max))
        .collect();

    PathStyle::Gradient {
        weight: opts.path_weight,
        min_elevation: min,
        max_elevation: max,
        point_colors: levels
            .iter()
            .map(|&l| gradient.color_at(l).to_hex())
            .collect(),
        segment_colors: levels
            .windows(2)
            .map(|pair| gradient.color_at((pair[0] + pair[1]) / 2.0).to_hex())
            .collect(),
    }
}
