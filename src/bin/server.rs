//! Pricewatch Alert Server
//!
//! Loads configuration, starts the evaluation scheduler and serves the REST
//! and WebSocket surface until ctrl-c.

use std::sync::Arc;

use pricewatch::config::Config;
use pricewatch::core::{AlertRuntime, AlertScheduler, AppState, EngineContext};
use pricewatch::logging::init_logging;
use pricewatch::metrics::Metrics;
use pricewatch::services::market_data::MarketDataGateway;
use pricewatch::services::notifications::{Dispatcher, HttpNotifier};
use pricewatch::services::users::InMemoryUserDirectory;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    init_logging(&config)?;

    info!(
        environment = %config.environment,
        port = config.port,
        poll_interval_seconds = config.poll_interval_seconds,
        "Starting Pricewatch alert server"
    );

    let metrics = Arc::new(Metrics::new()?);

    let users = match &config.users_file {
        Some(path) => match InMemoryUserDirectory::load(path) {
            Ok(directory) => {
                info!(path = %path.display(), "User directory loaded");
                directory
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load user directory, starting empty");
                InMemoryUserDirectory::default()
            }
        },
        None => InMemoryUserDirectory::default(),
    };
    let users = Arc::new(users);

    let market_data = Arc::new(MarketDataGateway::from_config(&config.market_data)?);
    let notifier = Arc::new(HttpNotifier::new(config.notifier.clone())?);
    let dispatcher = Arc::new(Dispatcher::new(notifier, config.notifier.max_concurrency));

    let ctx = EngineContext::new(market_data, dispatcher, users.clone(), config.history_capacity)
        .with_metrics(metrics.clone())
        .with_broadcast_history(config.broadcast_history);
    let runtime = Arc::new(AlertRuntime::new(ctx));

    let scheduler = AlertScheduler::new(runtime.clone(), config.poll_interval())
        .map_err(|e| e.to_string())?;
    scheduler.start().await.map_err(|e| e.to_string())?;

    let state = AppState::new(runtime, users, metrics).with_ws_api_key(config.ws_api_key.clone());
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = pricewatch::core::start_server(state, port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    scheduler.stop().await;
    server_handle.abort();

    info!("Pricewatch alert server stopped");
    Ok(())
}
