use axum::{routing::get, Router};
use configuration::Settings;
use core_types::LogicalQuery;
use database::{Executor, PgExecutor};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// Nothing in here is mutated after startup; each request only borrows it.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn Executor>,
}

/// Builds the application router on top of `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let mut app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(&LogicalQuery::Countries.route(), get(handlers::get_countries));
    // One GET route per data query.
    for query in LogicalQuery::ALL {
        if query != LogicalQuery::Countries {
            app = app.route(&query.route(), handlers::data_route(query));
        }
    }

    app.with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    // Note: Tracing is already initialized by the caller.
    let pool = database::connect(&settings.database).await?;
    let executor: Arc<dyn Executor> = Arc::new(PgExecutor::new(pool));
    let app = router(Arc::new(AppState { executor }));

    let listener =
        tokio::net::TcpListener::bind((settings.server.host.as_str(), settings.server.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!("Web server started and listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
