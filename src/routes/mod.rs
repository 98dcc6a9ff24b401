//! HTTP surface of the proxy.
//!
//! All endpoints are unauthenticated JSON handlers under
//! /api/family_calendar/. Failure responses always carry enough detail
//! (attempted backends, underlying messages) to diagnose a misconfigured
//! calendar integration.

pub mod config;
pub mod events;
pub mod weather;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the full router with permissive CORS for the browser front end.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(config::router())
        .merge(events::router())
        .merge(weather::router())
        .with_state(state)
        .layer(cors)
}

/// Error taxonomy of the proxy surface.
pub enum ApiError {
    /// Missing or malformed input.
    BadRequest(String),
    /// No configured entity or no data behind it.
    NotFound(String),
    /// Every backend rejected a create/update; both messages attached
    /// since the dominant failure mode is a read-only calendar.
    WriteRefused {
        message: &'static str,
        calendar: String,
        google_error: String,
        calendar_error: String,
    },
    /// Every delete attempt failed.
    DeleteRefused {
        calendar: String,
        details: Vec<String>,
    },
    /// No backend exposes the operation at all.
    DeleteUnsupported { calendar: String },
    /// Anything else.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::WriteRefused {
                message,
                calendar,
                google_error,
                calendar_error,
            } => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": message,
                    "calendar": calendar,
                    "google_error": google_error,
                    "calendar_error": calendar_error,
                })),
            )
                .into_response(),
            ApiError::DeleteRefused { calendar, details } => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Unable to delete event: calendar may be read-only or does not expose a supported delete service.",
                    "calendar": calendar,
                    "details": details,
                })),
            )
                .into_response(),
            ApiError::DeleteUnsupported { calendar } => (
                StatusCode::NOT_IMPLEMENTED,
                Json(json!({
                    "error": "No supported calendar delete service available.",
                    "calendar": calendar,
                })),
            )
                .into_response(),
            ApiError::Internal(error) => {
                tracing::error!(error = ?error, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": error.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        ApiError::Internal(error.into())
    }
}
