//! `spa-gateway` binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use gateway_runtime::{Gateway, GatewayConfig};
use spa_04_operator_lifecycle::{HttpPasswordService, InMemoryLegacyStore, OperatorLifecycle};
use spa_telemetry::{init_telemetry, TelemetryConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = GatewayConfig::from_env().context("Failed to load configuration")?;

    info!("===========================================");
    info!("  SPA Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        listen = %format!("{}:{}", config.server.host, config.server.port),
        router = %format!("{}:{}", config.router.host, config.router.port),
        queue_enabled = config.queue.enabled,
        workers = config.queue.workers,
        "Configuration loaded"
    );

    // No SQL driver is linked; sessions live in process memory.
    warn!("Using in-memory legacy store");
    let store = Arc::new(InMemoryLegacyStore::default());
    let passwords = Arc::new(
        HttpPasswordService::new(
            config.password_service.base_url.clone(),
            config.password_timeout(),
        )
        .context("Failed to build password service client")?,
    );
    let lifecycle = Arc::new(OperatorLifecycle::new(
        store,
        passwords,
        config.retry_policy(),
    ));

    let shutdown = CancellationToken::new();
    let gateway = Gateway::bind(&config, lifecycle, shutdown.clone()).await?;
    info!(addr = %gateway.local_addr()?, "Listening");

    let running = tokio::spawn(gateway.run());

    info!("Gateway is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown.cancel();

    running.await.context("Gateway task panicked")??;
    Ok(())
}
