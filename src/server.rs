use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    metrics,
    pricing::PricingService,
    signals::setup_signal_handlers,
    storage::open_storage,
};

/// Start the pricing server
///
/// This function:
/// 1. Initializes metrics
/// 2. Opens the recipe and quote store
/// 3. Sets up signal handlers for graceful shutdown and config reload
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let storage = open_storage(&config.storage).await?;

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path)?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let service = PricingService::new(config_swap, storage, reqwest::Client::new());
    let app = create_router(AppState { service }, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting Precificador on {}", addr);
    info!(
        "Configuration: business '{}', catalog {:?} ({}), storage {:?}, {} payment methods",
        config.business.name,
        config.catalog.source,
        config
            .catalog
            .url
            .clone()
            .unwrap_or_else(|| config.catalog.path.display().to_string()),
        config.storage.backend,
        config.payment.methods.len()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Arc<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/catalog", get(handlers::catalog::list_catalog))
        .route("/api/price", post(handlers::price::price_form))
        .route("/api/recipes", get(handlers::recipes::list_recipes))
        .route(
            "/api/recipes/:name",
            get(handlers::recipes::get_recipe)
                .put(handlers::recipes::save_recipe)
                .delete(handlers::recipes::delete_recipe),
        )
        .route(
            "/api/recipes/:name/price",
            post(handlers::recipes::price_recipe),
        )
        .route(
            "/api/quotes",
            get(handlers::quotes::list_quotes).post(handlers::quotes::save_quote),
        )
        .route("/api/quotes/preview", post(handlers::quotes::preview_quote))
        .route("/api/quotes/add-item", post(handlers::quotes::add_item))
        .route("/api/quotes/remove-item", post(handlers::quotes::remove_item))
        .route("/api/quotes/text", post(handlers::quotes::export_text))
        .route("/api/quotes/pdf", post(handlers::quotes::export_pdf))
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        // Forms and quotes are small; 1MB is plenty
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
