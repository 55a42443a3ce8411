//! API middleware layers.
//!
//! Currently provides bearer-token enforcement for the `/api/v1` surface.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::response::ApiError;
use super::handlers::PanelState;

const BEARER_PREFIX: &str = "Bearer ";

/// Reject requests without the configured bearer token.
///
/// An empty `server.api_token` disables the check. A missing or non-Bearer
/// `Authorization` header is `missing_token`; a wrong token is `invalid_token`.
pub async fn require_bearer_token(
    State(state): State<PanelState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = state.api_token.as_str();
    if expected.is_empty() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim);

    let rejection = match presented {
        None => Some("missing_token"),
        Some(token) if token != expected => Some("invalid_token"),
        Some(_) => None,
    };

    match rejection {
        Some(code) => {
            debug!(path = %request.uri().path(), code, "Request rejected by bearer check");
            ApiError::Unauthorized(code).into_response()
        }
        None => next.run(request).await,
    }
}
