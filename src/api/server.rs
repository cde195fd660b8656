use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{config::ApiServerConfig, errors::Error, storage::Repositories};

use super::routes::{build_router, BASE_PATH};

pub async fn start_api_server(
    config: ApiServerConfig,
    repositories: Repositories,
) -> crate::Result<()> {
    let addr: SocketAddr = config
        .socket_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid API address: {}", e)))?;

    let router: Router = build_router(&repositories, config.enable_cors);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::io(e, format!("Failed to bind API server to {}", addr)))?;

    info!(
        address = %addr,
        base_path = BASE_PATH,
        cors = config.enable_cors,
        "Starting HTTP API server"
    );
    run_http_server(listener, router).await?;

    info!("API server shutdown completed");
    Ok(())
}

async fn run_http_server(listener: TcpListener, router: Router) -> crate::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "API server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::io(e, "API server error"))
}
