use std::sync::Arc;

use anyhow::Result;
use log::info;

pub mod adapter;
pub mod analysis;
pub mod config;
pub mod error;
pub mod gateway;
pub mod license;
pub mod server;

use config::AppConfig;
use gateway::AnalysisGateway;
use server::AppState;

/// Load configuration, wire the gateway, and serve until shutdown.
pub async fn run() -> Result<()> {
    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let gateway = AnalysisGateway::from_config(config);
    let app = server::router(AppState {
        gateway: Arc::new(gateway),
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Formsight listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
