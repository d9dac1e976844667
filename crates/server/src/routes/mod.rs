pub mod companies;
pub mod connection;
pub mod crawl;
pub mod health;
pub mod industries;
pub mod notion;
pub mod settings;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Assemble the full application router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .merge(companies::router())
        .merge(connection::router())
        .merge(crawl::router())
        .merge(health::router())
        .merge(industries::router())
        .merge(notion::router())
        .merge(settings::router())
}
