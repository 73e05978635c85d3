use log::{debug, warn};

use crate::api::{self, TrackList, TrackRecord, TrackSummary, UploadResponse};
use crate::error::{ApiError, ParseError};
use crate::gpx_types::Track;
use crate::parser::parse_track;

/// Storage key the host keeps the "my tracks" list under.
pub const MY_TRACKS_KEY: &str = "myTracks";

/// Track ids uploaded from this browser, oldest first.
///
/// Append-only and duplicate-free. It only decides which server tracks are
/// listed as "mine"; it proves nothing about ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MyTracks {
    ids: Vec<String>,
}

impl MyTracks {
    /// Load from the stored JSON array. A missing or unreadable value starts
    /// an empty list.
    pub fn from_storage(stored: Option<&str>) -> Self {
        let Some(stored) = stored else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<String>>(stored) {
            Ok(list) => {
                let mut tracks = Self::default();
                for id in list {
                    tracks.remember(id);
                }
                tracks
            }
            Err(e) => {
                warn!("ignoring unreadable {MY_TRACKS_KEY} value: {e}");
                Self::default()
            }
        }
    }

    /// Add an id; returns false when it was already known.
    pub fn remember(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_storage(&self) -> String {
        serde_json::to_string(&self.ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// The tracks of `list` whose ids are known here, in server order.
    pub fn filter<'a>(&self, list: &'a [TrackSummary]) -> Vec<&'a TrackSummary> {
        list.iter().filter(|t| self.contains(&t.track_id)).collect()
    }
}

/// State shared by the viewer's event handlers: the track picked for upload,
/// the track selected from the list, and the local "my tracks" ids.
#[derive(Debug, Default)]
pub struct ViewState {
    uploaded: Option<Track>,
    selected: Option<Track>,
    my_tracks: MyTracks,
}

impl ViewState {
    pub fn new(my_tracks: MyTracks) -> Self {
        Self {
            uploaded: None,
            selected: None,
            my_tracks,
        }
    }

    /// Parse a file chosen for upload. On failure the previous upload track
    /// is kept.
    pub fn load_upload(&mut self, gpx: &str) -> Result<&Track, ParseError> {
        let track = parse_track(gpx)?;
        debug!("loaded '{}' for upload", track.name());
        Ok(self.uploaded.insert(track))
    }

    pub fn uploaded(&self) -> Option<&Track> {
        self.uploaded.as_ref()
    }

    /// Statistics form fields for the pending upload, empty when no file has
    /// been parsed.
    pub fn upload_fields(&self) -> Vec<(&'static str, String)> {
        self.uploaded
            .as_ref()
            .map(|track| api::upload_fields(track.stats()))
            .unwrap_or_default()
    }

    /// Handle the upload response: remember the new id.
    pub fn record_upload(&mut self, status: u16, body: &str) -> Result<UploadResponse, ApiError> {
        let response: UploadResponse = api::decode_response(status, body)?;
        self.my_tracks.remember(response.track_id.clone());
        Ok(response)
    }

    /// Handle a `GET /api/track/{id}` response: parse its GPX and select it.
    pub fn select_track(&mut self, status: u16, body: &str) -> Result<&Track, ApiError> {
        let record: TrackRecord = api::decode_response(status, body)?;
        let track = record.parse()?;
        Ok(self.selected.insert(track))
    }

    pub fn selected(&self) -> Option<&Track> {
        self.selected.as_ref()
    }

    /// Handle a track list response, keeping only the locally known tracks.
    pub fn my_track_list(&self, status: u16, body: &str) -> Result<Vec<TrackSummary>, ApiError> {
        let list: TrackList = api::decode_response(status, body)?;
        Ok(self.my_tracks.filter(&list.tracks).into_iter().cloned().collect())
    }

    pub fn my_tracks(&self) -> &MyTracks {
        &self.my_tracks
    }
}
