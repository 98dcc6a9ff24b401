//! Event listing and mutation endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use famcal_core::adapter::{self, NormalizedEvent};
use famcal_core::{EventRequest, InvokeError};

use crate::routes::ApiError;
use crate::state::AppState;

const CREATE_REFUSED: &str = "This calendar is read-only or missing write permissions. \
    Select a calendar that supports event creation (Local/CalDAV) or reconfigure the \
    Google integration with write access.";

const UPDATE_REFUSED: &str =
    "Failed to update event. The calendar may be read-only or missing write permissions.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/family_calendar/events", get(list_events))
        .route("/api/family_calendar/add_event", post(add_event))
        .route("/api/family_calendar/update_event", post(update_event))
        .route("/api/family_calendar/delete_event", post(delete_event))
}

#[derive(Deserialize)]
struct EventsQuery {
    calendar: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

/// Window bounds accept RFC 3339 (trailing 'Z' included) and naive
/// "YYYY-MM-DDTHH:MM:SS", which is taken as UTC.
fn parse_window_bound(value: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|error| ApiError::BadRequest(format!("Invalid timestamp '{value}': {error}")))
}

/// GET /api/family_calendar/events - Normalized events in a time window.
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<NormalizedEvent>>, ApiError> {
    let (Some(calendar), Some(start), Some(end)) = (query.calendar, query.start, query.end) else {
        return Err(ApiError::BadRequest("Missing parameters".into()));
    };

    let start = parse_window_bound(&start)?;
    let end = parse_window_bound(&end)?;

    debug!(calendar = %calendar, "fetching events");

    // Unknown calendars list as empty, not as an error: the front end
    // renders registered calendars before their integrations are ready.
    let Some(entity) = state.entities.get(&calendar).await else {
        warn!(calendar = %calendar, "calendar entity not found");
        return Ok(Json(Vec::new()));
    };

    let events = entity.events(start, end).await.map_err(|err| {
        error!(calendar = %calendar, error = %err, "fetching events failed");
        ApiError::Internal(err.into())
    })?;

    let normalized: Vec<NormalizedEvent> = events.iter().map(adapter::normalize_event).collect();
    debug!(calendar = %calendar, count = normalized.len(), "returning events");
    Ok(Json(normalized))
}

#[derive(Deserialize)]
struct MutationBody {
    calendar_entity: Option<String>,
    summary: Option<String>,
    start_date_time: Option<String>,
    end_date_time: Option<String>,
    description: Option<String>,
    location: Option<String>,
    event_uid: Option<String>,
    event_id: Option<String>,
}

fn require(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

impl MutationBody {
    fn into_request(self) -> Result<EventRequest, ApiError> {
        match (
            require(self.calendar_entity),
            require(self.summary),
            require(self.start_date_time),
            require(self.end_date_time),
        ) {
            (Some(calendar_entity), Some(summary), Some(start), Some(end)) => Ok(EventRequest {
                calendar_entity,
                summary,
                start_date_time: start,
                end_date_time: end,
                description: self.description,
                location: self.location,
            }),
            _ => Err(ApiError::BadRequest("Missing required fields".into())),
        }
    }
}

fn write_failure(calendar: &str, message: &'static str, error: InvokeError) -> ApiError {
    match error {
        InvokeError::Refused { attempts } => ApiError::WriteRefused {
            message,
            calendar: calendar.to_string(),
            google_error: attempts.first().map(|a| a.message.clone()).unwrap_or_default(),
            calendar_error: attempts.get(1).map(|a| a.message.clone()).unwrap_or_default(),
        },
        other => ApiError::Internal(anyhow::Error::new(other)),
    }
}

/// POST /api/family_calendar/add_event - Create an event via the fallback
/// chain.
async fn add_event(
    State(state): State<AppState>,
    Json(body): Json<MutationBody>,
) -> Result<Json<Value>, ApiError> {
    let request = body.into_request()?;
    debug!(calendar = %request.calendar_entity, summary = %request.summary, "add event request");

    match state.invoker.create(&request).await {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(error) => Err(write_failure(&request.calendar_entity, CREATE_REFUSED, error)),
    }
}

/// POST /api/family_calendar/update_event - Delete-then-create with a
/// propagation delay in between.
async fn update_event(
    State(state): State<AppState>,
    Json(body): Json<MutationBody>,
) -> Result<Json<Value>, ApiError> {
    let uid = require(body.event_uid.clone());
    let request = body.into_request()?;
    let Some(uid) = uid else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };

    debug!(calendar = %request.calendar_entity, uid = %uid, "update event request");

    match state.invoker.update(&request, &uid).await {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(error) => Err(write_failure(&request.calendar_entity, UPDATE_REFUSED, error)),
    }
}

/// POST /api/family_calendar/delete_event - Delete via services, then
/// entity hooks.
async fn delete_event(
    State(state): State<AppState>,
    Json(body): Json<MutationBody>,
) -> Result<Json<Value>, ApiError> {
    let calendar = require(body.calendar_entity);
    let uid = require(body.event_uid).or_else(|| require(body.event_id));

    let (Some(calendar), Some(uid)) = (calendar, uid) else {
        return Err(ApiError::BadRequest(
            "Missing calendar_entity or event_uid".into(),
        ));
    };

    info!(calendar = %calendar, uid = %uid, "delete event request");

    match state.invoker.delete(&calendar, &uid).await {
        Ok(()) => Ok(Json(json!({ "success": true }))),
        Err(InvokeError::Refused { attempts }) => Err(ApiError::DeleteRefused {
            calendar,
            details: attempts.iter().map(ToString::to_string).collect(),
        }),
        Err(InvokeError::Unsupported) => Err(ApiError::DeleteUnsupported { calendar }),
        Err(other) => Err(ApiError::Internal(anyhow::Error::new(other))),
    }
}
