use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use departure_monitor::cache::{CacheConfig, CachedMvvClient};
use departure_monitor::departures::{DeparturePoller, PollConfig};
use departure_monitor::failure::TracingFailureSink;
use departure_monitor::mvv::{MvvClient, MvvConfig};
use departure_monitor::selection::{JsonFileStore, SavedSelections};
use departure_monitor::web::{AppState, create_router};

/// Where to listen unless `BIND_ADDR` says otherwise.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Where saved selections live unless `SELECTIONS_PATH` says otherwise.
const DEFAULT_SELECTIONS_PATH: &str = "saved_selections.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("departure_monitor=info")),
        )
        .init();

    // Create MVV client
    let mut mvv_config = MvvConfig::default();
    if let Ok(url) = std::env::var("MVV_BASE_URL") {
        mvv_config = mvv_config.with_base_url(url);
    }
    let mvv_client = MvvClient::new(mvv_config)?;

    // Create cached client
    let cache_config = CacheConfig::default();
    let source = Arc::new(CachedMvvClient::new(mvv_client, &cache_config));

    // Load saved selections
    let selections_path = std::env::var("SELECTIONS_PATH")
        .unwrap_or_else(|_| DEFAULT_SELECTIONS_PATH.to_string());
    let store = JsonFileStore::new(&selections_path);
    info!(path = %store.path().display(), "using selection store");
    let selections = Arc::new(SavedSelections::load(Arc::new(store)));

    // Poll departures for saved selections in the background
    let poller = DeparturePoller::spawn(
        Arc::clone(&source),
        selections.subscribe(),
        PollConfig::default(),
        Arc::new(TracingFailureSink),
    );

    // Build app state
    let state = AppState::new(source, selections, poller);

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    info!(%addr, "departure monitor listening");
    info!("  GET    /health                - Health check");
    info!("  GET    /api/stops/search?q=   - Search stops");
    info!("  GET    /api/stops/:id/lines   - Lines at a stop");
    info!("  GET    /api/selections        - Saved selections");
    info!("  POST   /api/selections        - Save a selection");
    info!("  DELETE /api/selections/:id    - Remove a selection");
    info!("  GET    /api/departures        - Departure boards");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
