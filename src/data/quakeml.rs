//! QuakeML catalogue reader
//!
//! Streams a QuakeML 1.2 document and flattens every `event` into an
//! [`EventRecord`] using its preferred origin and preferred magnitude. When
//! no preferred id is given (or it does not resolve) the first listed origin
//! or magnitude is used instead. Events without a magnitude keep `None`.

use crate::data::{DataError, EventRecord, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::io::Read;
use std::path::Path;
use xml::reader::{EventReader, ParserConfig, XmlEvent};

/// Read a QuakeML file from disk
pub fn read_file(path: &Path) -> Result<Vec<EventRecord>> {
    profiling::scope!("quakeml::read_file");

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    read(reader)
}

/// Read all events from a QuakeML document
pub fn read<R: Read>(reader: R) -> Result<Vec<EventRecord>> {
    let config = ParserConfig::new()
        .trim_whitespace(true)
        .ignore_comments(true);
    let parser = EventReader::new_with_config(reader, config);

    let mut path: Vec<String> = Vec::new();
    let mut current: Option<RawEvent> = None;
    let mut records = Vec::new();

    for event in parser {
        match event? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let public_id = attributes
                    .iter()
                    .find(|attr| attr.name.local_name == "publicID")
                    .map(|attr| attr.value.clone());

                let parent_is_event = path.last().is_some_and(|p| p == "event");
                match name.local_name.as_str() {
                    "event" => {
                        current = Some(RawEvent {
                            public_id: public_id.unwrap_or_default(),
                            ..Default::default()
                        });
                    }
                    "origin" if parent_is_event => {
                        if let Some(raw) = current.as_mut() {
                            raw.origins.push(RawOrigin {
                                public_id,
                                ..Default::default()
                            });
                        }
                    }
                    "magnitude" if parent_is_event => {
                        if let Some(raw) = current.as_mut() {
                            raw.magnitudes.push(RawMagnitude {
                                public_id,
                                ..Default::default()
                            });
                        }
                    }
                    _ => {}
                }

                path.push(name.local_name);
            }
            XmlEvent::EndElement { name } => {
                path.pop();
                if name.local_name == "event"
                    && let Some(raw) = current.take()
                {
                    records.push(raw.into_record()?);
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if let Some(raw) = current.as_mut() {
                    raw.push_text(&path, &text);
                }
            }
            _ => {}
        }
    }

    tracing::debug!("Parsed {} events from QuakeML", records.len());
    Ok(records)
}

/// Text collected for one `event` element before resolution
#[derive(Default, Debug)]
struct RawEvent {
    public_id: String,
    preferred_origin_id: Option<String>,
    preferred_magnitude_id: Option<String>,
    origins: Vec<RawOrigin>,
    magnitudes: Vec<RawMagnitude>,
}

#[derive(Default, Debug)]
struct RawOrigin {
    public_id: Option<String>,
    time: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    depth: Option<String>,
}

#[derive(Default, Debug)]
struct RawMagnitude {
    public_id: Option<String>,
    mag: Option<String>,
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}

impl RawEvent {
    /// Store character data according to the element path it appeared under
    fn push_text(&mut self, path: &[String], text: &str) {
        let tail: Vec<&str> = path.iter().rev().take(4).rev().map(String::as_str).collect();

        match tail.as_slice() {
            [.., "event", "preferredOriginID"] => append(&mut self.preferred_origin_id, text),
            [.., "event", "preferredMagnitudeID"] => {
                append(&mut self.preferred_magnitude_id, text)
            }
            ["event", "origin", field, "value"] => {
                let Some(origin) = self.origins.last_mut() else {
                    return;
                };
                match *field {
                    "time" => append(&mut origin.time, text),
                    "latitude" => append(&mut origin.latitude, text),
                    "longitude" => append(&mut origin.longitude, text),
                    "depth" => append(&mut origin.depth, text),
                    _ => {}
                }
            }
            ["event", "magnitude", "mag", "value"] => {
                if let Some(magnitude) = self.magnitudes.last_mut() {
                    append(&mut magnitude.mag, text);
                }
            }
            _ => {}
        }
    }

    /// Resolve preferred origin and magnitude into a flat record
    fn into_record(self) -> Result<EventRecord> {
        let event_id = short_event_id(&self.public_id);

        let origin = self
            .preferred_origin_id
            .as_deref()
            .and_then(|id| {
                self.origins
                    .iter()
                    .find(|o| o.public_id.as_deref() == Some(id.trim()))
            })
            .or_else(|| self.origins.first())
            .ok_or_else(|| DataError::NoOrigin {
                event: event_id.clone(),
            })?;

        let magnitude = self
            .preferred_magnitude_id
            .as_deref()
            .and_then(|id| {
                self.magnitudes
                    .iter()
                    .find(|m| m.public_id.as_deref() == Some(id.trim()))
            })
            .or_else(|| self.magnitudes.first());

        let required = |value: &Option<String>, field: &'static str| {
            value.clone().ok_or_else(|| DataError::MissingField {
                event: event_id.clone(),
                field,
            })
        };

        let time = parse_time(&required(&origin.time, "time")?)?;
        let latitude = parse_number(&required(&origin.latitude, "latitude")?, "latitude")?;
        let longitude = parse_number(&required(&origin.longitude, "longitude")?, "longitude")?;
        let depth_m = parse_number(&required(&origin.depth, "depth")?, "depth")?;

        let magnitude = match magnitude.and_then(|m| m.mag.as_deref()) {
            Some(value) => Some(parse_number(value, "mag")?),
            None => None,
        };

        Ok(EventRecord {
            event_id,
            time,
            latitude,
            longitude,
            depth_km: depth_m / 1000.0,
            magnitude,
        })
    }
}

/// Short event id: the query value after the first `=` of the resource id
/// (up to the next `=`), or the whole id when it has none.
pub fn short_event_id(resource_id: &str) -> String {
    match resource_id.split('=').nth(1) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => resource_id.to_string(),
    }
}

fn parse_number(value: &str, field: &'static str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| DataError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Parse a QuakeML `dateTime`, treating values without an offset as UTC
fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|time| time.and_utc())
        .map_err(|_| DataError::InvalidTime(value.to_string()))
}
