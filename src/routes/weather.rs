//! Weather forecast endpoint.
//!
//! Prefers the forecast service call when the hub exposes it and falls
//! back to the cached forecast attribute on the weather entity's state.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tracing::debug;

use crate::routes::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/family_calendar/weather", get(get_weather))
}

/// GET /api/family_calendar/weather - Daily forecast for the configured
/// weather source.
async fn get_weather(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let weather_entity = {
        let registry = state.registry.read().await;
        registry.weather_entity().map(str::to_string)
    };
    let Some(weather_entity) = weather_entity else {
        return Err(ApiError::NotFound("No weather entity configured".into()));
    };

    if state.capabilities.is_available("weather", "get_forecasts") {
        let payload = json!({ "entity_id": weather_entity, "type": "daily" });
        let response = state
            .services
            .call_with_response("weather", "get_forecasts", payload)
            .await?;

        if let Some(forecast) = response.get(&weather_entity).and_then(|e| e.get("forecast")) {
            return Ok(Json(forecast.clone()));
        }
        debug!(entity = %weather_entity, "forecast service returned no data, reading state attributes");
    }

    if let Some(entity_state) = state.states.get(&weather_entity).await {
        if let Some(forecast) = entity_state.attributes.get("forecast") {
            return Ok(Json(forecast.clone()));
        }
    }

    Err(ApiError::NotFound("No forecast data available".into()))
}
