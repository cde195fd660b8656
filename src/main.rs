use anyhow::Context;
use gitrdf_listener::{
    api::start_api_server,
    observability::{init_observability, log_config_info},
    storage::Repositories,
    Config, APP_NAME, VERSION,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; must happen before any config is read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let config = Config::from_env().context("Invalid listener configuration")?;
    init_observability(&config.observability).await.context("Failed to initialize observability")?;

    info!(app_name = APP_NAME, version = VERSION, "Starting GitHub to RDF listener service");
    log_config_info(&config);

    let repositories =
        Repositories::connect(&config.database).await.context("Failed to connect to database")?;

    if let Err(e) = start_api_server(config.api.clone(), repositories).await {
        error!(error = %e, "API server terminated with error");
        return Err(e).context("API server failed");
    }

    info!("Listener service stopped");
    Ok(())
}
