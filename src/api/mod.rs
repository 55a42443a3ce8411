//! REST API module using Axum
//!
//! Host surface for a shared [`RightPanel`](crate::panel::RightPanel):
//! - `/api/v1` routes (bearer-token protected when a token is configured)
//! - `/api/documents/*` lookup and `/documents/*` static files
//! - `/health` and `/viewer/health` at root level

pub mod handlers;
pub mod middleware;
pub mod response;
mod routes;

pub use handlers::PanelState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::storage::documents::DOCUMENTS_URL_PREFIX;

/// Build a CORS layer from `server.cors_origins`.
///
/// `*` allows any origin; otherwise a comma-separated list of origins.
fn build_cors_layer(origins: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.trim() == "*" {
        return base.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    tracing::info!(origins = %origins, "CORS: allowing configured origins");
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: PanelState, cors_origins: &str) -> Router {
    let documents = ServeDir::new(state.documents.root());
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::document_routes(state.clone()))
        .merge(routes::legacy_routes(state))
        .nest_service(DOCUMENTS_URL_PREFIX, documents)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
