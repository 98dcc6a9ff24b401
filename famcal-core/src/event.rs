//! Provider-neutral event types.
//!
//! `EventRequest` is the generic mutation request built per HTTP call and
//! handed to the fallback invoker. `BackendEvent` is what calendar entities
//! return from a listing, before normalization into the wire shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A generic event mutation request. Transient, never persisted.
///
/// `start_date_time`/`end_date_time` stay in the primary provider's
/// "YYYY-MM-DD HH:MM:SS" wire form until the adapter reshapes them.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub calendar_entity: String,
    pub summary: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// When an event starts or ends. All-day events carry only a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

/// A calendar event as returned by a backend listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendEvent {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub description: Option<String>,
    pub location: Option<String>,
    pub uid: Option<String>,
}

impl BackendEvent {
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        BackendEvent {
            summary: summary.into(),
            start,
            end,
            description: None,
            location: None,
            uid: None,
        }
    }
}
