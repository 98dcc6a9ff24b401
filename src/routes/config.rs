//! Configuration snapshot endpoint.

use axum::{Json, Router, extract::State, routing::get};
use tracing::debug;

use famcal_core::ConfigRegistry;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/family_calendar/config", get(get_config))
}

/// GET /api/family_calendar/config - Full registry snapshot, read-only.
async fn get_config(State(state): State<AppState>) -> Json<ConfigRegistry> {
    let registry = state.registry.read().await;
    debug!(calendars = registry.calendars().len(), "config snapshot requested");
    Json(registry.clone())
}
