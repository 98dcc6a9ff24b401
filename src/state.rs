use std::sync::Arc;

use tokio::sync::RwLock;

use famcal_core::backend::{EntityRegistry, ServiceDispatcher, StateStore};
use famcal_core::{CapabilityTable, ConfigRegistry, FallbackInvoker};

/// Shared application state, cheap to clone per request.
///
/// The registry is only written by the setup path; request handlers take
/// the read lock.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<ConfigRegistry>>,
    pub invoker: Arc<FallbackInvoker>,
    pub entities: Arc<dyn EntityRegistry>,
    pub services: Arc<dyn ServiceDispatcher>,
    pub states: Arc<dyn StateStore>,
    pub capabilities: Arc<CapabilityTable>,
}

impl AppState {
    pub fn new(
        services: Arc<dyn ServiceDispatcher>,
        entities: Arc<dyn EntityRegistry>,
        states: Arc<dyn StateStore>,
        capabilities: CapabilityTable,
        registry: ConfigRegistry,
    ) -> Self {
        let invoker = Arc::new(FallbackInvoker::new(
            Arc::clone(&services),
            capabilities.clone(),
            Arc::clone(&entities),
        ));

        AppState {
            registry: Arc::new(RwLock::new(registry)),
            invoker,
            entities,
            services,
            states,
            capabilities: Arc::new(capabilities),
        }
    }
}
