use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::gpx_types::*;
use crate::options::RenderOptions;
use crate::render::{Marker, PathStyle, RenderPlan, build_render_plan};

/// Convert a track to a GeoJSON FeatureCollection styled like its render
/// plan: the path (one LineString, or one per segment for an elevation
/// gradient) followed by start and end Point features.
pub fn to_feature_collection(track: &Track, opts: &RenderOptions) -> FeatureCollection {
    let plan = build_render_plan(track, opts);
    let points = track.points();
    let mut features = Vec::new();

    // a single fix has no path, only its markers
    if points.len() >= 2 {
        match &plan.style {
            PathStyle::Flat { color, weight } => {
                let coords = points.iter().map(point_coords).collect();
                let mut props = path_props(track, *weight);
                props.insert("stroke".to_string(), JsonValue::String(color.clone()));
                features.push(feature(Value::LineString(coords), props));
            }
            PathStyle::Gradient {
                weight,
                segment_colors,
                ..
            } => {
                for (pair, color) in points.windows(2).zip(segment_colors) {
                    let coords = pair.iter().map(point_coords).collect();
                    let mut props = path_props(track, *weight);
                    props.insert("stroke".to_string(), JsonValue::String(color.clone()));
                    features.push(feature(Value::LineString(coords), props));
                }
            }
        }
    }

    features.push(marker_feature(&plan.start, "start"));
    features.push(marker_feature(&plan.end, "end"));

    FeatureCollection {
        bbox: Some(track.bounds().to_geojson_bbox()),
        features,
        foreign_members: Some(collection_members(track, &plan)),
    }
}

fn feature(value: Value, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn path_props(track: &Track, weight: f64) -> Map<String, JsonValue> {
    let mut props = Map::new();
    props.insert("role".to_string(), JsonValue::String("path".to_string()));
    props.insert("name".to_string(), JsonValue::String(track.name().to_string()));
    insert_number(&mut props, "strokeWidth", weight);
    props
}

fn marker_feature(marker: &Marker, role: &str) -> Feature {
    let [lat, lon] = marker.position;
    let mut props = Map::new();
    props.insert("role".to_string(), JsonValue::String(role.to_string()));
    props.insert("title".to_string(), JsonValue::String(marker.title.clone()));
    props.insert(
        "markerColor".to_string(),
        JsonValue::String(marker.color.clone()),
    );
    feature(Value::Point(vec![lon, lat]), props)
}

/// Summary statistics attached to the collection itself.
fn collection_members(track: &Track, plan: &RenderPlan) -> Map<String, JsonValue> {
    let stats = track.stats();
    let mut members = Map::new();
    members.insert("name".to_string(), JsonValue::String(plan.name.clone()));
    insert_number(&mut members, "distanceMeters", stats.total_distance_meters);
    insert_number(&mut members, "elevationGainMeters", stats.elevation_gain_meters);
    insert_number(&mut members, "elevationLossMeters", stats.elevation_loss_meters);
    if let Some(duration) = stats.duration_seconds {
        members.insert("durationSeconds".to_string(), JsonValue::Number(duration.into()));
    }
    members.insert(
        "pointCount".to_string(),
        JsonValue::Number(track.points().len().into()),
    );
    members
}

/// Build [lon, lat] or [lon, lat, ele] coordinate array.
fn point_coords(pt: &TrackPoint) -> Vec<f64> {
    match pt.elevation {
        Some(ele) => vec![pt.longitude, pt.latitude, ele],
        None => vec![pt.longitude, pt.latitude],
    }
}

fn insert_number(props: &mut Map<String, JsonValue>, key: &str, value: f64) {
    props.insert(
        key.to_string(),
        JsonValue::Number(serde_json::Number::from_f64(value).unwrap_or(0.into())),
    );
}
