//! REST client for the home-automation hub.
//!
//! Implements the backend traits against the hub's HTTP API: named
//! service calls, entity state lookups and calendar event listings. The
//! hub's service catalog is fetched once at startup to build the
//! capability table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use famcal_core::CapabilityTable;
use famcal_core::backend::{
    CalendarEntity, EntityRegistry, EntityState, ServiceDispatcher, StateStore,
};
use famcal_core::error::BackendError;
use famcal_core::event::{BackendEvent, EventTime};

#[derive(Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        HubClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, BackendError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|error| BackendError::Service(format!("hub request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Service(format!(
                "hub returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|error| BackendError::InvalidResponse(error.to_string()))
    }

    /// Fetch the hub's service catalog and build the capability table,
    /// once at startup.
    pub async fn fetch_capabilities(&self) -> Result<CapabilityTable, BackendError> {
        let catalog = self.get_json("/api/services").await?;
        let entries = catalog.as_array().ok_or_else(|| {
            BackendError::InvalidResponse("service catalog is not an array".into())
        })?;

        let mut table = CapabilityTable::new();
        for entry in entries {
            let Some(provider) = entry.get("domain").and_then(Value::as_str) else {
                continue;
            };
            let Some(operations) = entry.get("services").and_then(Value::as_object) else {
                continue;
            };
            for operation in operations.keys() {
                table.insert(provider, operation);
            }
        }
        debug!(capabilities = table.len(), "hub service catalog loaded");
        Ok(table)
    }
}

#[async_trait]
impl ServiceDispatcher for HubClient {
    async fn call(
        &self,
        provider: &str,
        operation: &str,
        payload: Value,
    ) -> Result<(), BackendError> {
        debug!(%provider, %operation, "calling hub service");
        let response = self
            .http
            .post(self.url(&format!("/api/services/{provider}/{operation}")))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|error| BackendError::Service(format!("hub request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Service(format!(
                "hub returned {status}: {body}"
            )));
        }
        Ok(())
    }

    async fn call_with_response(
        &self,
        provider: &str,
        operation: &str,
        payload: Value,
    ) -> Result<Value, BackendError> {
        debug!(%provider, %operation, "calling hub service (with response)");
        let response = self
            .http
            .post(self.url(&format!(
                "/api/services/{provider}/{operation}?return_response"
            )))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|error| BackendError::Service(format!("hub request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Service(format!(
                "hub returned {status}: {body}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|error| BackendError::InvalidResponse(error.to_string()))?;

        // The hub wraps response-bearing calls in a service_response field.
        Ok(body.get("service_response").cloned().unwrap_or(body))
    }
}

#[async_trait]
impl StateStore for HubClient {
    async fn get(&self, entity_id: &str) -> Option<EntityState> {
        match self.get_json(&format!("/api/states/{entity_id}")).await {
            Ok(value) => Some(EntityState {
                state: value
                    .get("state")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                attributes: value
                    .get("attributes")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            }),
            Err(error) => {
                // A 404 means the entity does not exist; anything else is
                // worth a warning but still reads as "no state".
                warn!(entity = %entity_id, %error, "state lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl EntityRegistry for HubClient {
    async fn get(&self, entity_id: &str) -> Option<Arc<dyn CalendarEntity>> {
        // The hub is the registry: an entity exists if it has a state.
        StateStore::get(self, entity_id).await?;
        Some(Arc::new(HubCalendarEntity {
            client: self.clone(),
            entity_id: entity_id.to_string(),
        }))
    }
}

/// A calendar entity resolved from the hub. Deletes only go through
/// registered services; the hub API exposes no direct delete hooks.
struct HubCalendarEntity {
    client: HubClient,
    entity_id: String,
}

#[async_trait]
impl CalendarEntity for HubCalendarEntity {
    async fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BackendEvent>, BackendError> {
        let path = format!(
            "/api/calendars/{}?start={}&end={}",
            self.entity_id,
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        let value = self.client.get_json(&path).await?;

        let raw: Vec<RawHubEvent> = serde_json::from_value(value)
            .map_err(|error| BackendError::InvalidResponse(error.to_string()))?;
        raw.into_iter().map(RawHubEvent::into_event).collect()
    }
}

/// Event shape on the hub's calendar API.
#[derive(Deserialize)]
struct RawHubEvent {
    summary: String,
    start: RawHubTime,
    end: RawHubTime,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    uid: Option<String>,
}

#[derive(Deserialize)]
struct RawHubTime {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default, rename = "dateTime")]
    date_time: Option<DateTime<FixedOffset>>,
}

impl RawHubTime {
    fn into_event_time(self) -> Result<EventTime, BackendError> {
        if let Some(date_time) = self.date_time {
            return Ok(EventTime::DateTime(date_time.with_timezone(&Utc)));
        }
        if let Some(date) = self.date {
            return Ok(EventTime::Date(date));
        }
        Err(BackendError::InvalidResponse(
            "event time has neither date nor dateTime".into(),
        ))
    }
}

impl RawHubEvent {
    fn into_event(self) -> Result<BackendEvent, BackendError> {
        Ok(BackendEvent {
            summary: self.summary,
            start: self.start.into_event_time()?,
            end: self.end.into_event_time()?,
            description: self.description,
            location: self.location,
            uid: self.uid,
        })
    }
}
