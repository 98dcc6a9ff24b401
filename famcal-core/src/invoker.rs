//! Fallback invoker: tries each backend in a fixed priority order.
//!
//! Calendar integrations expose different service signatures for the same
//! logical operation, so every capability is a chain of attempts. The
//! first attempt that completes without error wins; failures are swallowed,
//! logged and appended to the attempt log, which is only surfaced when the
//! whole chain is exhausted.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::task;
use tracing::{debug, info, warn};

use crate::adapter;
use crate::backend::{CalendarEntity, EntityDeleteMethod, EntityRegistry, ServiceDispatcher};
use crate::capability::CapabilityTable;
use crate::error::{Attempt, BackendError, InvokeError};
use crate::event::EventRequest;

/// Provider whose creation service is tried first.
pub const PRIMARY_PROVIDER: &str = "google";
/// Generic calendar domain used as the fallback.
pub const CALENDAR_DOMAIN: &str = "calendar";
pub const CREATE_OPERATION: &str = "create_event";

/// Registered delete services, in priority order.
pub const DELETE_SERVICES: [(&str, &str); 4] = [
    (PRIMARY_PROVIDER, "delete_event"),
    (PRIMARY_PROVIDER, "remove_event"),
    (CALENDAR_DOMAIN, "delete_event"),
    (CALENDAR_DOMAIN, "remove_event"),
];

/// Wait after a successful delete before re-creating during an update, so
/// an in-flight deletion cannot collide with the new event.
pub const PROPAGATION_DELAY: Duration = Duration::from_millis(500);

pub struct FallbackInvoker {
    services: Arc<dyn ServiceDispatcher>,
    capabilities: CapabilityTable,
    entities: Arc<dyn EntityRegistry>,
}

impl FallbackInvoker {
    pub fn new(
        services: Arc<dyn ServiceDispatcher>,
        capabilities: CapabilityTable,
        entities: Arc<dyn EntityRegistry>,
    ) -> Self {
        FallbackInvoker {
            services,
            capabilities,
            entities,
        }
    }

    /// Create an event: primary provider first, generic domain second.
    pub async fn create(&self, request: &EventRequest) -> Result<(), InvokeError> {
        let primary = adapter::to_primary_payload(request);
        debug!(calendar = %request.calendar_entity, "calling google.create_event");

        let primary_error = match self
            .services
            .call(PRIMARY_PROVIDER, CREATE_OPERATION, primary)
            .await
        {
            Ok(()) => {
                info!(summary = %request.summary, "created event via google.create_event");
                return Ok(());
            }
            Err(error) => error,
        };
        warn!(error = %primary_error, "google.create_event failed, trying calendar.create_event");

        let fallback = adapter::to_fallback_payload(request).map_err(InvokeError::BadTimestamp)?;
        match self
            .services
            .call(CALENDAR_DOMAIN, CREATE_OPERATION, fallback)
            .await
        {
            Ok(()) => {
                info!(summary = %request.summary, "created event via calendar.create_event");
                Ok(())
            }
            Err(fallback_error) => {
                warn!(error = %fallback_error, "calendar.create_event also failed");
                Err(InvokeError::Refused {
                    attempts: vec![
                        Attempt::service(PRIMARY_PROVIDER, CREATE_OPERATION, &primary_error),
                        Attempt::service(CALENDAR_DOMAIN, CREATE_OPERATION, &fallback_error),
                    ],
                })
            }
        }
    }

    /// Delete an event: registered services first, entity delete hooks
    /// second. Unavailable services are skipped, not counted as attempts.
    pub async fn delete(&self, calendar_entity: &str, uid: &str) -> Result<(), InvokeError> {
        // Both uid aliases are sent since integrations disagree on the
        // field name.
        let payload = json!({
            "entity_id": calendar_entity,
            "event_id": uid,
            "uid": uid,
        });

        let mut attempts = Vec::new();

        for (provider, operation) in DELETE_SERVICES {
            if !self.capabilities.is_available(provider, operation) {
                continue;
            }
            match self
                .services
                .call(provider, operation, payload.clone())
                .await
            {
                Ok(()) => {
                    info!(uid, calendar = %calendar_entity, "deleted event via {provider}.{operation}");
                    return Ok(());
                }
                Err(error) => {
                    let attempt = Attempt::service(provider, operation, &error);
                    debug!("{attempt}");
                    attempts.push(attempt);
                }
            }
        }

        if let Some(entity) = self.entities.get(calendar_entity).await {
            debug!(calendar = %calendar_entity, "attempting direct entity delete");
            let supported = entity.delete_methods();
            for method in EntityDeleteMethod::PROBE_ORDER {
                if !supported.contains(&method) {
                    continue;
                }
                match self.delete_via_entity(&entity, method, uid).await {
                    Ok(()) => {
                        info!(uid, calendar = %calendar_entity, "deleted event via entity.{}", method.name());
                        return Ok(());
                    }
                    Err(error) => {
                        let attempt = Attempt::entity(method, &error);
                        debug!("{attempt}");
                        attempts.push(attempt);
                    }
                }
            }
        }

        if attempts.is_empty() {
            Err(InvokeError::Unsupported)
        } else {
            Err(InvokeError::Refused { attempts })
        }
    }

    async fn delete_via_entity(
        &self,
        entity: &Arc<dyn CalendarEntity>,
        method: EntityDeleteMethod,
        uid: &str,
    ) -> Result<(), BackendError> {
        if method.is_async() {
            entity.delete_async(method, uid).await
        } else {
            let entity = Arc::clone(entity);
            let uid = uid.to_string();
            task::spawn_blocking(move || entity.delete_blocking(method, &uid))
                .await
                .map_err(|error| {
                    BackendError::Service(format!("blocking delete task failed: {error}"))
                })?
        }
    }

    /// Update an event by deleting it and creating its replacement.
    ///
    /// A failed delete is logged and ignored since the event may already
    /// be gone. A successful delete is given [`PROPAGATION_DELAY`] to
    /// settle before the new event is created. If the delete succeeds and
    /// the create then fails, the old event is lost; this layer does not
    /// compensate.
    pub async fn update(&self, request: &EventRequest, uid: &str) -> Result<(), InvokeError> {
        match self.delete(&request.calendar_entity, uid).await {
            Ok(()) => {
                tokio::time::sleep(PROPAGATION_DELAY).await;
            }
            Err(error) => {
                warn!(uid, %error, "could not delete old event, creating replacement anyway");
            }
        }

        self.create(request).await
    }
}
