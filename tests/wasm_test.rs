#![cfg(target_arch = "wasm32")]

use gpx_track_viewer::{
    GpxSession, api_request, haversine_distance, parse_track, track_to_geojson_string,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

const GPX: &str = r#"<gpx><trk><name>Loop</name><trkseg>
  <trkpt lat="0" lon="0"><ele>1</ele><time>2024-01-01T00:00:00Z</time></trkpt>
  <trkpt lat="0" lon="1"><ele>3</ele><time>2024-01-01T00:10:00Z</time></trkpt>
</trkseg></trk></gpx>"#;

#[wasm_bindgen_test]
fn parse_track_returns_plain_object() {
    let value = parse_track(GPX).unwrap();
    let name = js_sys::Reflect::get(&value, &JsValue::from_str("name")).unwrap();
    assert_eq!(name.as_string().as_deref(), Some("Loop"));
}

#[wasm_bindgen_test]
fn parse_track_rejects_empty_document() {
    let err = parse_track("<gpx></gpx>").unwrap_err();
    assert_eq!(
        err.as_string().as_deref(),
        Some("No track points found in the GPX file")
    );
}

#[wasm_bindgen_test]
fn geojson_string_uses_defaults_for_undefined_options() {
    let json = track_to_geojson_string(GPX, JsValue::UNDEFINED).unwrap();
    assert!(json.contains("FeatureCollection"));
}

#[wasm_bindgen_test]
fn haversine_is_exported() {
    assert!((haversine_distance(0.0, 0.0, 0.0, 1.0) - 111_195.0).abs() < 1.0);
}

#[wasm_bindgen_test]
fn api_request_gives_method_and_path() {
    let value = api_request("track", Some("t1".to_string())).unwrap();
    let method = js_sys::Reflect::get(&value, &JsValue::from_str("method")).unwrap();
    let path = js_sys::Reflect::get(&value, &JsValue::from_str("path")).unwrap();
    assert_eq!(method.as_string().as_deref(), Some("GET"));
    assert_eq!(path.as_string().as_deref(), Some("/api/track/t1"));

    assert!(api_request("track", None).is_err());
}

#[wasm_bindgen_test]
fn session_remembers_uploads() {
    let mut session = GpxSession::new(Some(r#"["old"]"#.to_string()));
    session.load_upload(GPX, JsValue::NULL).unwrap();
    assert_eq!(session.upload_fields().length(), 3);

    let url = session
        .record_upload(200, r#"{"track_id":"new","share_url":"/share/new"}"#, "https://t.example")
        .unwrap();
    assert_eq!(url, "https://t.example/share/new");
    assert_eq!(session.my_tracks_storage(), r#"["old","new"]"#);
}
