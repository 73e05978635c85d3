pub mod api;
pub mod converter;
pub mod details;
pub mod error;
pub mod gpx_types;
pub mod logger;
pub mod options;
pub mod parser;
pub mod render;
pub mod session;
pub mod stats;

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::details::TrackDetails;
use crate::gpx_types::{Track, TrackStatistics};
use crate::options::RenderOptions;
use crate::render::RenderPlan;
use crate::session::{MyTracks, ViewState};

/// Install the console logger. `level` is a `log` level name
/// ("error" … "trace"); anything else means "warn".
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    console_error_panic_hook::set_once();
    logger::init(logger::level_filter(level.as_deref()));
}

/// Parse GPX text into a track with points, bounds and statistics.
#[wasm_bindgen(js_name = parseTrack)]
pub fn parse_track(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let track = parser::parse_track(gpx_string)?;
    to_js(&track)
}

/// Parse GPX text and return the info panel text.
#[wasm_bindgen(js_name = trackDetails)]
pub fn track_details(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let track = parser::parse_track(gpx_string)?;
    to_js(&TrackDetails::from_track(&track))
}

/// Parse GPX text and return what a map widget needs to draw it.
#[wasm_bindgen(js_name = renderPlan)]
pub fn render_plan(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let track = parser::parse_track(gpx_string)?;
    to_js(&render::build_render_plan(&track, &opts))
}

/// Convert a GPX track to styled GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = trackToGeoJson)]
pub fn track_to_geojson(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let track = parser::parse_track(gpx_string)?;
    to_js(&converter::to_feature_collection(&track, &opts))
}

/// Convert a GPX track to styled GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = trackToGeoJsonString)]
pub fn track_to_geojson_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let track = parser::parse_track(gpx_string)?;
    let fc = converter::to_feature_collection(&track, &opts);
    serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Great-circle distance in meters between two coordinates.
#[wasm_bindgen(js_name = haversineDistance)]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    stats::haversine_distance(lat1, lon1, lat2, lon2)
}

/// Absolute share link for a track id.
#[wasm_bindgen(js_name = shareUrl)]
pub fn share_url(origin: &str, track_id: &str) -> String {
    api::share_url(origin, track_id)
}

/// `{ method, path }` of a backend call. `kind` is `upload`, `tracks`,
/// `myTracks`, `track` or `share`; the last two need `track_id`.
#[wasm_bindgen(js_name = apiRequest)]
pub fn api_request(kind: &str, track_id: Option<String>) -> Result<JsValue, JsValue> {
    let endpoint = api::Endpoint::from_kind(kind, track_id.as_deref())
        .ok_or_else(|| JsValue::from_str(&format!("Unknown API endpoint: {kind}")))?;
    to_js(&endpoint.request())
}

/// What the page shows for a loaded track.
#[derive(Serialize)]
struct TrackView<'a> {
    stats: &'a TrackStatistics,
    details: TrackDetails,
    plan: RenderPlan,
}

impl<'a> TrackView<'a> {
    fn new(track: &'a Track, opts: &RenderOptions) -> Self {
        Self {
            stats: track.stats(),
            details: TrackDetails::from_track(track),
            plan: render::build_render_plan(track, opts),
        }
    }
}

/// Viewer state held across page event handlers.
#[wasm_bindgen]
pub struct GpxSession {
    state: ViewState,
}

#[wasm_bindgen]
impl GpxSession {
    /// `stored_my_tracks` is the value kept under the `myTracks` storage key.
    #[wasm_bindgen(constructor)]
    pub fn new(stored_my_tracks: Option<String>) -> GpxSession {
        console_error_panic_hook::set_once();

        GpxSession {
            state: ViewState::new(MyTracks::from_storage(stored_my_tracks.as_deref())),
        }
    }

    /// Parse a file picked for upload and return its view.
    #[wasm_bindgen(js_name = loadUpload)]
    pub fn load_upload(&mut self, gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
        let opts = parse_options(options)?;
        let track = self.state.load_upload(gpx_string)?;
        to_js(&TrackView::new(track, &opts))
    }

    /// `[name, value]` pairs to append to the upload form.
    #[wasm_bindgen(js_name = uploadFields)]
    pub fn upload_fields(&self) -> Array {
        self.state
            .upload_fields()
            .into_iter()
            .map(|(name, value)| Array::of2(&JsValue::from_str(name), &JsValue::from_str(&value)))
            .collect()
    }

    /// Handle the upload response and return the absolute share link.
    #[wasm_bindgen(js_name = recordUpload)]
    pub fn record_upload(&mut self, status: u16, body: &str, origin: &str) -> Result<String, JsValue> {
        let response = self.state.record_upload(status, body)?;
        Ok(response.full_share_url(origin))
    }

    /// Handle a track record response and return the selected track's view.
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&mut self, status: u16, body: &str, options: JsValue) -> Result<JsValue, JsValue> {
        let opts = parse_options(options)?;
        let track = self.state.select_track(status, body)?;
        to_js(&TrackView::new(track, &opts))
    }

    /// Handle a track list response, keeping the locally known tracks.
    #[wasm_bindgen(js_name = myTrackList)]
    pub fn my_track_list(&self, status: u16, body: &str) -> Result<JsValue, JsValue> {
        let tracks = self.state.my_track_list(status, body)?;
        to_js(&tracks)
    }

    /// JSON body for `POST /api/my-tracks`.
    #[wasm_bindgen(js_name = myTracksRequestBody)]
    pub fn my_tracks_request_body(&self) -> Result<String, JsValue> {
        Ok(api::my_tracks_body(self.state.my_tracks().ids())?)
    }

    /// Value to write back under the `myTracks` storage key.
    #[wasm_bindgen(js_name = myTracksStorage)]
    pub fn my_tracks_storage(&self) -> String {
        self.state.my_tracks().to_storage()
    }
}

fn parse_options(options: JsValue) -> Result<RenderOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(RenderOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Serialize as plain JS objects (not `Map`s), as `JSON.parse` would.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
