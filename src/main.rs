use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use famcal_core::ConfigRegistry;
use famcal_server::config::ServerConfig;
use famcal_server::hub::HubClient;
use famcal_server::routes;
use famcal_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("famcal_server=info,famcal_core=info")),
        )
        .init();

    let config_path = ServerConfig::config_path()?;
    if !config_path.exists() {
        ServerConfig::create_default_config(&config_path)?;
        bail!(
            "No config file found. A template was written to {}; fill in the hub settings and restart.",
            config_path.display()
        );
    }
    let config = ServerConfig::load(&config_path)?;

    let hub = Arc::new(HubClient::new(&config.hub.url, &config.hub.token));
    let capabilities = hub
        .fetch_capabilities()
        .await
        .context("Could not fetch the hub service catalog")?;

    let mut registry = ConfigRegistry::new();
    for entry in config.calendars {
        registry.register(entry.into_registration()?);
    }
    info!(
        calendars = registry.calendars().len(),
        weather = registry.weather_entity().is_some(),
        "calendar registrations loaded"
    );

    let state = AppState::new(
        Arc::clone(&hub) as _,
        Arc::clone(&hub) as _,
        hub,
        capabilities,
        registry,
    );
    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    info!("famcal-server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
