//! In-memory hub double shared by the API tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, NaiveDateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use famcal_core::backend::{
    CalendarEntity, EntityRegistry, EntityState, ServiceDispatcher, StateStore,
};
use famcal_core::error::BackendError;
use famcal_core::event::{BackendEvent, EventTime};
use famcal_core::{CapabilityTable, ConfigRegistry};
use famcal_server::routes;
use famcal_server::state::AppState;

#[derive(Default)]
struct FakeHubInner {
    /// (provider, operation) -> error message; absent means success.
    service_errors: HashMap<(String, String), String>,
    /// (provider, operation) -> response payload for response-bearing calls.
    service_responses: HashMap<(String, String), Value>,
    calls: Vec<(String, String, Value)>,
    /// Known calendar entities and their events. Successful create_event
    /// calls append here so listings reflect mutations.
    calendars: HashMap<String, Vec<BackendEvent>>,
    states: HashMap<String, EntityState>,
}

/// Scripted hub: services succeed unless told otherwise, every call is
/// recorded, and created events land in the owning calendar.
#[derive(Clone, Default)]
pub struct FakeHub {
    inner: Arc<Mutex<FakeHubInner>>,
}

#[allow(dead_code)]
impl FakeHub {
    pub fn new() -> Self {
        FakeHub::default()
    }

    pub fn fail_service(&self, provider: &str, operation: &str, message: &str) {
        self.inner.lock().unwrap().service_errors.insert(
            (provider.to_string(), operation.to_string()),
            message.to_string(),
        );
    }

    pub fn respond(&self, provider: &str, operation: &str, value: Value) {
        self.inner
            .lock()
            .unwrap()
            .service_responses
            .insert((provider.to_string(), operation.to_string()), value);
    }

    pub fn add_calendar(&self, entity: &str) {
        self.inner
            .lock()
            .unwrap()
            .calendars
            .entry(entity.to_string())
            .or_default();
    }

    pub fn add_event(&self, entity: &str, event: BackendEvent) {
        self.inner
            .lock()
            .unwrap()
            .calendars
            .entry(entity.to_string())
            .or_default()
            .push(event);
    }

    pub fn set_state(&self, entity: &str, state: EntityState) {
        self.inner
            .lock()
            .unwrap()
            .states
            .insert(entity.to_string(), state);
    }

    pub fn calls(&self) -> Vec<(String, String, Value)> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn events_in(&self, entity: &str) -> Vec<BackendEvent> {
        self.inner
            .lock()
            .unwrap()
            .calendars
            .get(entity)
            .cloned()
            .unwrap_or_default()
    }

    fn record_created_event(inner: &mut FakeHubInner, payload: &Value) {
        let Some(entity) = payload.get("entity_id").and_then(Value::as_str) else {
            return;
        };
        let summary = payload
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let start = parse_payload_timestamp(payload.get("start_date_time"));
        let end = parse_payload_timestamp(payload.get("end_date_time"));
        if let (Some(start), Some(end)) = (start, end) {
            inner
                .calendars
                .entry(entity.to_string())
                .or_default()
                .push(BackendEvent::new(
                    summary,
                    EventTime::DateTime(start),
                    EventTime::DateTime(end),
                ));
        }
    }
}

/// Both the primary wire form and the structured fallback form appear in
/// create payloads.
fn parse_payload_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let text = value?.as_str()?;
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl ServiceDispatcher for FakeHub {
    async fn call(
        &self,
        provider: &str,
        operation: &str,
        payload: Value,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .calls
            .push((provider.to_string(), operation.to_string(), payload.clone()));

        if let Some(message) = inner
            .service_errors
            .get(&(provider.to_string(), operation.to_string()))
        {
            return Err(BackendError::Service(message.clone()));
        }
        if operation == "create_event" {
            FakeHub::record_created_event(&mut inner, &payload);
        }
        Ok(())
    }

    async fn call_with_response(
        &self,
        provider: &str,
        operation: &str,
        payload: Value,
    ) -> Result<Value, BackendError> {
        self.call(provider, operation, payload).await?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .service_responses
            .get(&(provider.to_string(), operation.to_string()))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

struct FakeCalendar {
    hub: FakeHub,
    entity_id: String,
}

#[async_trait]
impl CalendarEntity for FakeCalendar {
    async fn events(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<BackendEvent>, BackendError> {
        Ok(self.hub.events_in(&self.entity_id))
    }
}

#[async_trait]
impl EntityRegistry for FakeHub {
    async fn get(&self, entity_id: &str) -> Option<Arc<dyn CalendarEntity>> {
        let known = self
            .inner
            .lock()
            .unwrap()
            .calendars
            .contains_key(entity_id);
        known.then(|| {
            Arc::new(FakeCalendar {
                hub: self.clone(),
                entity_id: entity_id.to_string(),
            }) as Arc<dyn CalendarEntity>
        })
    }
}

#[async_trait]
impl StateStore for FakeHub {
    async fn get(&self, entity_id: &str) -> Option<EntityState> {
        self.inner.lock().unwrap().states.get(entity_id).cloned()
    }
}

/// Capability table with both creation services and all delete services.
#[allow(dead_code)]
pub fn full_capabilities() -> CapabilityTable {
    CapabilityTable::from_entries([
        ("google", "create_event"),
        ("google", "delete_event"),
        ("google", "remove_event"),
        ("calendar", "create_event"),
        ("calendar", "delete_event"),
        ("calendar", "remove_event"),
    ])
}

pub fn test_app(hub: &FakeHub, capabilities: CapabilityTable, registry: ConfigRegistry) -> Router {
    let hub = Arc::new(hub.clone());
    let state = AppState::new(
        Arc::clone(&hub) as _,
        Arc::clone(&hub) as _,
        hub,
        capabilities,
        registry,
    );
    routes::app(state)
}

#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
