//! Traits for the hub facilities the proxy drives.
//!
//! The hub's service dispatcher, entity registry and state store are
//! external collaborators. The proxy only depends on these traits; the
//! server crate provides the REST-backed implementations and tests use
//! in-memory doubles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::BackendError;
use crate::event::BackendEvent;

/// Named service invocation on the hub, blocking until the call completes.
#[async_trait]
pub trait ServiceDispatcher: Send + Sync {
    async fn call(
        &self,
        provider: &str,
        operation: &str,
        payload: Value,
    ) -> Result<(), BackendError>;

    /// Like [`call`](Self::call) but for services that return a response
    /// payload (e.g. weather forecasts).
    async fn call_with_response(
        &self,
        provider: &str,
        operation: &str,
        payload: Value,
    ) -> Result<Value, BackendError>;
}

/// The delete hooks a calendar entity may expose, in probe order.
///
/// Integrations disagree on the hook name and on whether it is async, so
/// the invoker probes all four. Blocking hooks are run off the async
/// executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityDeleteMethod {
    AsyncDelete,
    AsyncRemove,
    BlockingDelete,
    BlockingRemove,
}

impl EntityDeleteMethod {
    /// Fixed probe order: async variants first, delete before remove.
    pub const PROBE_ORDER: [EntityDeleteMethod; 4] = [
        EntityDeleteMethod::AsyncDelete,
        EntityDeleteMethod::AsyncRemove,
        EntityDeleteMethod::BlockingDelete,
        EntityDeleteMethod::BlockingRemove,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityDeleteMethod::AsyncDelete => "async_delete_event",
            EntityDeleteMethod::AsyncRemove => "async_remove_event",
            EntityDeleteMethod::BlockingDelete => "delete_event",
            EntityDeleteMethod::BlockingRemove => "remove_event",
        }
    }

    pub fn is_async(self) -> bool {
        matches!(
            self,
            EntityDeleteMethod::AsyncDelete | EntityDeleteMethod::AsyncRemove
        )
    }
}

/// A live calendar entity resolved from the hub.
#[async_trait]
pub trait CalendarEntity: Send + Sync {
    async fn events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BackendEvent>, BackendError>;

    /// Delete hooks this entity implements. Empty means deletes can only
    /// go through registered services.
    fn delete_methods(&self) -> Vec<EntityDeleteMethod> {
        Vec::new()
    }

    async fn delete_async(
        &self,
        method: EntityDeleteMethod,
        uid: &str,
    ) -> Result<(), BackendError> {
        let _ = uid;
        Err(BackendError::MethodMissing(method.name()))
    }

    /// Synchronous delete hook. The caller must not run this on the async
    /// executor.
    fn delete_blocking(&self, method: EntityDeleteMethod, uid: &str) -> Result<(), BackendError> {
        let _ = uid;
        Err(BackendError::MethodMissing(method.name()))
    }
}

/// Resolves calendar identifiers to live entity objects.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Unknown identifiers yield `None`, never an error.
    async fn get(&self, entity_id: &str) -> Option<Arc<dyn CalendarEntity>>;
}

/// Snapshot of an entity's current state, attributes included.
#[derive(Debug, Clone, Default)]
pub struct EntityState {
    pub state: String,
    pub attributes: serde_json::Map<String, Value>,
}

/// Read access to the hub's state machine store.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, entity_id: &str) -> Option<EntityState>;
}
