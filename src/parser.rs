use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use time::{OffsetDateTime, PrimitiveDateTime};
use time::format_description::well_known::{Iso8601, Rfc3339};

use crate::error::ParseError;
use crate::gpx_types::*;
use crate::stats::TrackAccumulator;

type Result<T> = std::result::Result<T, ParseError>;

/// Why a `<trkpt>` was left out of the track.
#[derive(Debug)]
enum CoordinateError {
    Missing(&'static str),
    Invalid { attribute: &'static str, value: String },
    OutOfRange { attribute: &'static str, value: f64 },
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(attribute) => write!(f, "missing attribute '{attribute}'"),
            Self::Invalid { attribute, value } => {
                write!(f, "invalid value '{value}' for attribute '{attribute}'")
            }
            Self::OutOfRange { attribute, value } => {
                write!(f, "value {value} for attribute '{attribute}' is out of range")
            }
        }
    }
}

/// Parse GPX text into a [`Track`].
///
/// Every `<trkpt>` in the document is collected in document order, however
/// deeply it is nested. Points whose `lat`/`lon` are missing, non-numeric or
/// out of range are skipped. Fails with [`ParseError::NoTrackPoints`] when no
/// usable point remains.
pub fn parse_track(xml: &str) -> Result<Track> {
    let mut reader = Reader::from_str(xml);
    let mut acc = TrackAccumulator::default();
    let mut name: Option<String> = None;
    // local names of the currently open elements
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut skipped = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => match parse_point(&e, &mut reader)? {
                    Some(pt) => acc.push(pt),
                    None => skipped += 1,
                },
                b"name" if name.is_none() && is_under_trk(&open) => {
                    let text = read_text_owned(&mut reader, &e)?;
                    let text = text.trim();
                    if !text.is_empty() {
                        name = Some(text.to_string());
                    }
                }
                local => open.push(local.to_vec()),
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    match parse_lat_lon(&e)? {
                        Ok((lat, lon)) => acc.push(TrackPoint::new(lat, lon)),
                        Err(reason) => {
                            warn!("skipping <trkpt>: {reason}");
                            skipped += 1;
                        }
                    }
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Eof) => match open.last() {
                Some(tag) => return Err(missing_end_tag(tag)),
                None => break,
            },
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
    }

    debug!(
        "parsed {} track points ({} skipped)",
        acc.len(),
        skipped
    );

    acc.finish(name.unwrap_or_else(|| DEFAULT_TRACK_NAME.to_string()))
}

fn is_under_trk(open: &[Vec<u8>]) -> bool {
    open.last().is_some_and(|parent| parent.as_slice() == b"trk")
}

/// Read `lat`/`lon` from a `<trkpt>` start tag.
///
/// The outer `Result` carries XML errors, the inner one rejects the point.
fn parse_lat_lon(
    e: &BytesStart<'_>,
) -> Result<std::result::Result<(f64, f64), CoordinateError>> {
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| ParseError::Xml(e.into()))?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(val.to_string()),
            b"lon" => lon = Some(val.to_string()),
            _ => {}
        }
    }

    let coords = coordinate("lat", lat.as_deref(), 90.0).and_then(|lat| {
        coordinate("lon", lon.as_deref(), 180.0).map(|lon| (lat, lon))
    });
    Ok(coords)
}

fn coordinate(
    attribute: &'static str,
    raw: Option<&str>,
    limit: f64,
) -> std::result::Result<f64, CoordinateError> {
    let raw = raw.ok_or(CoordinateError::Missing(attribute))?;
    let value = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError::Invalid {
            attribute,
            value: raw.to_string(),
        })?;
    if value.abs() > limit {
        return Err(CoordinateError::OutOfRange { attribute, value });
    }
    Ok(value)
}

/// Parse a `<trkpt>` element and its children.
/// Called after receiving Event::Start for the point element.
///
/// The first `<ele>` and `<time>` found anywhere inside the point are used;
/// unparseable text leaves the field empty.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<TrackPoint>> {
    let (lat, lon) = match parse_lat_lon(start)? {
        Ok(coords) => coords,
        Err(reason) => {
            warn!("skipping <trkpt>: {reason}");
            reader
                .read_to_end(start.name())
                .map_err(ParseError::Xml)?;
            return Ok(None);
        }
    };

    let mut point = TrackPoint::new(lat, lon);
    let mut seen_ele = false;
    let mut seen_time = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" if !seen_ele => {
                    seen_ele = true;
                    point.elevation = parse_elevation(&read_text_owned(reader, &e)?);
                }
                b"time" if !seen_time => {
                    seen_time = true;
                    point.timestamp = parse_time(&read_text_owned(reader, &e)?);
                }
                _ => depth += 1,
            },
            Ok(Event::End(_)) if depth == 0 => break,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => return Err(missing_end_tag(start.name().0)),
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
    }

    Ok(Some(point))
}

fn parse_elevation(text: &str) -> Option<f64> {
    let elevation = text.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    if elevation.is_none() {
        debug!("ignoring unparseable elevation '{text}'");
    }
    elevation
}

/// RFC 3339 first, then the broader ISO 8601 grammar. GPX times are UTC,
/// so a time without an offset is read as UTC.
fn parse_time(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let parsed = OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(|t| t.assume_utc()))
        .ok();
    if parsed.is_none() {
        debug!("ignoring unparseable time '{text}'");
    }
    parsed
}

/// Document ended while `name` was still open.
fn missing_end_tag(name: &[u8]) -> ParseError {
    let name = String::from_utf8_lossy(name).into_owned();
    ParseError::Xml(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)))
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(
    reader: &mut Reader<&'a [u8]>,
    start: &BytesStart<'_>,
) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(raw);
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(s);
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(missing_end_tag(&end_name)),
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
    }

    Ok(text)
}
