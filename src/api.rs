//! Request fields and response records of the track backend.
//!
//! The host performs the HTTP exchange; this module builds what goes out and
//! decodes what comes back, turning non-2xx responses into
//! [`ApiError::Status`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::gpx_types::{Track, TrackStatistics};
use crate::parser::parse_track;

type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// Method and path of one backend call, handed to the host's `fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Upload,
    Tracks,
    MyTracks,
    Track(String),
    Share(String),
}

impl Endpoint {
    /// Look up an endpoint by name: `upload`, `tracks`, `myTracks`, `track`
    /// or `share`. The last two need a track id.
    pub fn from_kind(kind: &str, track_id: Option<&str>) -> Option<Self> {
        match (kind, track_id) {
            ("upload", _) => Some(Self::Upload),
            ("tracks", _) => Some(Self::Tracks),
            ("myTracks", _) => Some(Self::MyTracks),
            ("track", Some(id)) => Some(Self::Track(id.to_string())),
            ("share", Some(id)) => Some(Self::Share(id.to_string())),
            _ => None,
        }
    }

    pub fn request(&self) -> Request {
        Request {
            method: self.method(),
            path: self.path(),
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::Upload | Self::MyTracks => Method::Post,
            Self::Tracks | Self::Track(_) | Self::Share(_) => Method::Get,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Upload => "/api/upload".to_string(),
            Self::Tracks => "/api/tracks".to_string(),
            Self::MyTracks => "/api/my-tracks".to_string(),
            Self::Track(id) => format!("/api/track/{id}"),
            Self::Share(id) => format!("/share/{id}"),
        }
    }
}

/// Precomputed statistics sent alongside an upload as decimal strings.
/// An unknown duration is left out of the form.
pub fn upload_fields(stats: &TrackStatistics) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("distance", stats.total_distance_meters.to_string()),
        ("elevation_gain", stats.elevation_gain_meters.to_string()),
    ];
    if let Some(duration) = stats.duration_seconds {
        fields.push(("duration", duration.to_string()));
    }
    fields
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub track_id: String,
    pub share_url: String,
}

impl UploadResponse {
    /// Absolute share link for display, e.g. `https://host` + `/share/{id}`.
    pub fn full_share_url(&self, origin: &str) -> String {
        join_url(origin, &self.share_url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackList {
    pub tracks: Vec<TrackSummary>,
}

/// Full record from `GET /api/track/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    pub gpx_data: String,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub elevation_gain: Option<f64>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl TrackRecord {
    /// Re-parse the stored GPX text.
    pub fn parse(&self) -> Result<Track> {
        Ok(parse_track(&self.gpx_data)?)
    }
}

/// JSON body for `POST /api/my-tracks`.
pub fn my_tracks_body<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
    Ok(serde_json::to_string(&ids)?)
}

/// Decode a response body, treating non-2xx statuses as errors whose body
/// is plain text.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            body: body.trim().to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

pub fn share_url(origin: &str, track_id: &str) -> String {
    join_url(origin, &Endpoint::Share(track_id.to_string()).path())
}

fn join_url(origin: &str, path: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), path)
}
