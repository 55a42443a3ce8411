//! API route definitions
//!
//! - /api/v1/panel/* - the panel entry points and its current view
//! - /api/v1/scans - scan ingestion (pushes into the panel)
//! - /api/v1/part-locations - most recent locations
//! - /api/v1/station-config - persisted station configuration
//! - /api/v1/production-plan, /api/v1/standard-times - plan datasets
//! - /api/documents/* - document lookup for the viewer
//! - /health, /viewer/health - liveness

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, PanelState};
use super::middleware::require_bearer_token;

/// Create all `/api/v1` routes, guarded by the bearer-token check.
pub fn api_routes(state: PanelState) -> Router {
    Router::new()
        // Panel entry points
        .route("/panel", get(handlers::get_panel))
        .route("/panel/refresh", post(handlers::refresh_panel))
        .route("/panel/socket-update", post(handlers::socket_update))
        .route("/panel/viewer", post(handlers::set_viewer_state))
        .route("/panel/viewer/close", post(handlers::close_viewer))
        .route("/panel/station", post(handlers::notify_station_change))
        // Scanner-facing endpoints
        .route("/scans", post(handlers::create_scan))
        .route("/part-locations", get(handlers::list_part_locations))
        .route(
            "/station-config",
            get(handlers::get_station_config).post(handlers::update_station_config),
        )
        // Plan datasets
        .route("/production-plan", get(handlers::production_plan))
        .route("/standard-times", get(handlers::standard_times))
        .route("/plan/refresh", post(handlers::refresh_plan))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_token))
        .with_state(state)
}

/// Document lookup for the viewer, behind the same bearer check.
pub fn document_routes(state: PanelState) -> Router {
    Router::new()
        .route("/api/documents/*part", get(handlers::get_document))
        .route_layer(from_fn_with_state(state.clone(), require_bearer_token))
        .with_state(state)
}

/// Unauthenticated health endpoints at root level
pub fn legacy_routes(state: PanelState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/viewer/health", get(handlers::viewer_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_routes_panel() {
        let app = api_routes(PanelState::for_tests(""));

        let response = app
            .oneshot(Request::builder().uri("/panel").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["data"]["count"], 0);
        assert_eq!(v["data"]["overlay_class"], "is-hidden");
        assert_eq!(v["meta"]["revision"], 0);
    }

    #[tokio::test]
    async fn test_api_routes_socket_update_then_listing() {
        let state = PanelState::for_tests("");

        let response = api_routes(state.clone())
            .oneshot(post_json(
                "/panel/socket-update",
                serde_json::json!({
                    "orderCode": "A",
                    "locationCode": "R1",
                    "deviceId": "dev",
                    "scannedAt": "2025-01-01T08:00:00Z",
                    "updatedAt": "2025-01-01T08:00:05Z"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["data"]["outcome"], "applied");
        assert_eq!(v["data"]["view"]["count"], 1);

        let response = api_routes(state)
            .oneshot(Request::get("/part-locations?limit=5").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["entries"][0]["order_code"], "A");
        assert_eq!(v["entries"][0]["updated_at"], "2025-01-01T08:00:05Z");
    }

    #[tokio::test]
    async fn test_api_routes_invalid_limit() {
        let response = api_routes(PanelState::for_tests(""))
            .oneshot(Request::get("/part-locations?limit=abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "invalid_limit");
    }

    #[tokio::test]
    async fn test_api_routes_require_token() {
        let response = api_routes(PanelState::for_tests("secret"))
            .oneshot(Request::get("/panel").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "missing_token");
    }

    #[tokio::test]
    async fn test_legacy_health_is_open() {
        let response = legacy_routes(PanelState::for_tests("secret"))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["status"], "ok");
        assert_eq!(v["count"], 0);
    }

    #[tokio::test]
    async fn test_document_routes_require_token() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("P-1.pdf"), b"%PDF").unwrap();
        let state = PanelState::for_tests("secret").with_docs_root(dir.path());

        let response = document_routes(state.clone())
            .oneshot(Request::get("/api/documents/p-1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = document_routes(state)
            .oneshot(
                Request::get("/api/documents/p-1")
                    .header(header::AUTHORIZATION, "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["filename"], "P-1.pdf");
    }
}
