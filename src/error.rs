use wasm_bindgen::JsValue;

/// Failure to turn GPX text into a track.
#[derive(Debug)]
pub enum ParseError {
    Xml(quick_xml::Error),
    NoTrackPoints,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml(e) => write!(f, "XML parse error: {e}"),
            Self::NoTrackPoints => write!(f, "No track points found in the GPX file"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            Self::NoTrackPoints => None,
        }
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

impl From<ParseError> for JsValue {
    fn from(e: ParseError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Failure of a backend API exchange, as seen from the response body.
#[derive(Debug)]
pub enum ApiError {
    /// Non-2xx response; the body is kept verbatim as plain text.
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    /// A fetched record whose `gpx_data` does not parse.
    Track(ParseError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, body } if body.is_empty() => {
                write!(f, "Request failed with status {status}")
            }
            Self::Status { status, body } => {
                write!(f, "Request failed with status {status}: {body}")
            }
            Self::Decode(e) => write!(f, "Invalid response body: {e}"),
            Self::Track(e) => write!(f, "Invalid track data: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Status { .. } => None,
            Self::Decode(e) => Some(e),
            Self::Track(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        Self::Track(e)
    }
}

impl From<ApiError> for JsValue {
    fn from(e: ApiError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_track_points_message() {
        assert_eq!(
            ParseError::NoTrackPoints.to_string(),
            "No track points found in the GPX file"
        );
    }

    #[test]
    fn test_status_message_includes_body() {
        let err = ApiError::Status {
            status: 422,
            body: "name is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request failed with status 422: name is required"
        );

        let err = ApiError::Status {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "Request failed with status 500");
    }
}
