use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use conversion_sync_api::api::handlers::{self, AppState};
use conversion_sync_api::api::{webhook_handler, ApiDoc};
use conversion_sync_api::config::Config;
use conversion_sync_api::core::dispatcher::dispatcher_from_config;
use conversion_sync_api::core::orchestrator::ConversionSyncService;
use conversion_sync_api::core::stage_transition::StageTransitioner;
use conversion_sync_api::db::Database;
use conversion_sync_api::db_storage::{PgColumnStore, PgLeadStore};
use conversion_sync_api::stores::CachedColumnStore;

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool, the platform
/// adapters and the sync service, then serves the HTTP API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conversion_sync_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let lead_store = Arc::new(PgLeadStore::new(db.pool.clone()));
    let column_store = Arc::new(CachedColumnStore::new(
        Arc::new(PgColumnStore::new(db.pool.clone())),
        config.column_cache_ttl,
    ));
    tracing::info!(
        "Pipeline column cache initialized ({:?} TTL)",
        config.column_cache_ttl
    );

    let dispatcher = dispatcher_from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build platform clients: {}", e))?;
    let transitioner = StageTransitioner::new(lead_store.clone())
        .with_configured_columns(config.stage_columns.clone());
    let sync_service =
        ConversionSyncService::new(lead_store, column_store, dispatcher, transitioner);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        sync_service,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = Router::new()
        .route(
            "/api/v1/leads/:lead_id/status",
            post(handlers::update_lead_status),
        )
        .route(
            "/api/v1/webhooks/lead-status",
            post(webhook_handler::lead_status_webhook),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB is plenty for status batches
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check and docs bypass rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
