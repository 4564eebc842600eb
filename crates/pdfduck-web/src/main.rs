use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod error;
mod handlers;
mod state;
mod upload;


use pdfduck_pdf_mupdf::MupdfBackend;
use state::AppState;

/// Upload size cap (50MB).
const BODY_LIMIT: usize = 50 * 1024 * 1024;

fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(handlers::index::index))
        .route("/health", axum::routing::get(handlers::health::health))
        .route("/extract", axum::routing::post(handlers::extract::extract))
        .route(
            "/extract/batch",
            axum::routing::post(handlers::extract::extract_batch),
        )
        .layer(axum::extract::DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(AppState::new(MupdfBackend::new()));
    let app = router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
