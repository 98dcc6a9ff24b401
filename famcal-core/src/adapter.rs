//! Event adapter: backend-specific payload shapes and listing normalization.
//!
//! The two backend families disagree on timestamp representations: the
//! primary provider wants "YYYY-MM-DD HH:MM:SS" strings, the generic
//! calendar service wants structured timestamps. Optional fields are
//! omitted when absent or empty; omission, not null, signals absence.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::BackendError;
use crate::event::{BackendEvent, EventRequest, EventTime};

/// Wire form used by mutation request bodies and the primary provider.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Parse a "YYYY-MM-DD HH:MM:SS" timestamp. Failure is terminal for the
/// whole request.
pub fn parse_wire_timestamp(value: &str) -> Result<NaiveDateTime, BackendError> {
    NaiveDateTime::parse_from_str(value, WIRE_TIMESTAMP_FORMAT).map_err(|source| {
        BackendError::Timestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Payload for the primary provider's creation service. Timestamps are
/// forwarded verbatim as strings.
pub fn to_primary_payload(request: &EventRequest) -> Value {
    let mut payload = Map::new();
    payload.insert("entity_id".into(), json!(request.calendar_entity));
    payload.insert("summary".into(), json!(request.summary));
    payload.insert("start_date_time".into(), json!(request.start_date_time));
    payload.insert("end_date_time".into(), json!(request.end_date_time));

    if let Some(description) = non_empty(&request.description) {
        payload.insert("description".into(), json!(description));
    }
    if let Some(location) = non_empty(&request.location) {
        payload.insert("location".into(), json!(location));
    }

    Value::Object(payload)
}

/// Payload for the generic calendar creation service. The string
/// timestamps are parsed into structured values first.
pub fn to_fallback_payload(request: &EventRequest) -> Result<Value, BackendError> {
    let start = parse_wire_timestamp(&request.start_date_time)?;
    let end = parse_wire_timestamp(&request.end_date_time)?;

    let mut payload = Map::new();
    payload.insert("entity_id".into(), json!(request.calendar_entity));
    payload.insert("summary".into(), json!(request.summary));
    payload.insert("start_date_time".into(), json!(start));
    payload.insert("end_date_time".into(), json!(end));

    if let Some(description) = non_empty(&request.description) {
        payload.insert("description".into(), json!(description));
    }
    if let Some(location) = non_empty(&request.location) {
        payload.insert("location".into(), json!(location));
    }

    Ok(Value::Object(payload))
}

/// Start/end field of a normalized event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedTime {
    AllDay {
        date: String,
    },
    Timed {
        #[serde(rename = "dateTime")]
        date_time: String,
    },
}

/// The uniform event shape returned by the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedEvent {
    pub summary: String,
    pub start: NormalizedTime,
    pub end: NormalizedTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

fn normalize_time(time: &EventTime) -> NormalizedTime {
    match time {
        EventTime::Date(date) => NormalizedTime::AllDay {
            date: date.format("%Y-%m-%d").to_string(),
        },
        EventTime::DateTime(date_time) => NormalizedTime::Timed {
            date_time: date_time.to_rfc3339(),
        },
    }
}

/// Normalize a backend event into the uniform listing shape. Optional
/// fields are copied through only when present and non-empty.
pub fn normalize_event(event: &BackendEvent) -> NormalizedEvent {
    NormalizedEvent {
        summary: event.summary.clone(),
        start: normalize_time(&event.start),
        end: normalize_time(&event.end),
        description: non_empty(&event.description).map(str::to_string),
        location: non_empty(&event.location).map(str::to_string),
        uid: non_empty(&event.uid).map(str::to_string),
    }
}
