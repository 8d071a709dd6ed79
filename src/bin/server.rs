use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use fleetwatch::config::ServerConfig;
use fleetwatch::core::hub::create_hub;
use fleetwatch::core::stats::StatsPublisher;
use fleetwatch::handlers::websocket::ws_route;
use fleetwatch::storage::memory::MemoryStatsStore;

#[tokio::main]
async fn main() {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Initialize logging
    env_logger::init();

    // Load config from the environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, stats_interval={:?}",
        config.host, config.port, config.stats_interval
    );

    // Create the hub and the stats store
    let hub = create_hub();
    let store = Arc::new(MemoryStatsStore::new());

    // Start the periodic stats broadcast
    let publisher = StatsPublisher::new(hub.clone(), store, config.stats_interval);
    let publisher_handle = publisher.spawn();

    // Create routes
    let health_route = warp::path("health").map(|| "OK");
    let routes = ws_route(hub.clone()).or(health_route);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting FleetWatch server on {}", addr);

    // Run until ctrl-c, then drain
    let (bound_addr, server) =
        warp::serve(routes).bind_with_graceful_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        });

    info!("Listening on {}", bound_addr);
    server.await;

    // Best-effort drain: stop the publisher, then deregister everything
    publisher_handle.shutdown().await;
    hub.drain().await;
    info!("Server stopped");
}
