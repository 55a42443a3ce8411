//! Response bodies for the panel API.
//!
//! Panel entry points answer with a [`PanelEnvelope`] stamped with the panel
//! revision it reflects. Every failure is an [`ApiError`], rendered as
//! `{ "error": { "code": "...", "message": "..." } }` where `code` is a
//! stable snake_case identifier such as `missing_token` or `invalid_limit`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use super::handlers::ScanError;
use crate::panel::PanelError;
use crate::storage::StationConfigError;
use crate::types::to_utc_iso;

// ============================================================================
// Panel Envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PanelMeta {
    /// Panel revision after the request was handled.
    pub revision: u64,
    pub served_at: String,
}

/// `{ "data": T, "meta": { "revision", "served_at" } }`
#[derive(Debug, Serialize)]
pub struct PanelEnvelope<T> {
    pub data: T,
    pub meta: PanelMeta,
}

impl<T: Serialize> PanelEnvelope<T> {
    pub fn new(data: T, revision: u64) -> Self {
        Self {
            data,
            meta: PanelMeta {
                revision,
                served_at: to_utc_iso(&Utc::now()),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for PanelEnvelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bearer token required")]
    Unauthorized(&'static str),
    #[error("limit must be an integer")]
    InvalidLimit,
    #[error("scan payload rejected")]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("station config rejected")]
    Station(#[from] StationConfigError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidLimit | Self::Scan(_) => StatusCode::BAD_REQUEST,
            Self::Panel(PanelError::Rejected { .. }) => StatusCode::BAD_REQUEST,
            Self::Panel(PanelError::Stale(_)) => StatusCode::CONFLICT,
            Self::Station(e) if e.is_payload_error() => StatusCode::BAD_REQUEST,
            Self::Station(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> String {
        match self {
            Self::Unauthorized(code) => (*code).to_string(),
            Self::InvalidLimit => "invalid_limit".to_string(),
            Self::Scan(e) => e.to_string(),
            Self::Panel(e) => e.kind().to_string(),
            Self::Station(e) if e.is_payload_error() => e.to_string(),
            Self::Station(_) => "internal_error".to_string(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Panel(e) => e.to_string(),
            Self::Station(e) if !e.is_payload_error() => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_carries_revision() {
        let resp = PanelEnvelope::new(json!({"outcome": "applied"}), 7).into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let v = body_json(resp).await;
        assert_eq!(v["data"]["outcome"], "applied");
        assert_eq!(v["meta"]["revision"], 7);
        assert!(v["meta"]["served_at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_error_codes_and_statuses() {
        let cases = [
            (ApiError::InvalidLimit, StatusCode::BAD_REQUEST, "invalid_limit"),
            (ApiError::Unauthorized("invalid_token"), StatusCode::UNAUTHORIZED, "invalid_token"),
            (
                ApiError::Scan(ScanError::NotAString("device_id")),
                StatusCode::BAD_REQUEST,
                "device_id_not_string",
            ),
            (
                ApiError::Station(StationConfigError::InvalidAvailable),
                StatusCode::BAD_REQUEST,
                "invalid_station_available",
            ),
        ];
        for (error, status, code) in cases {
            let resp = error.into_response();
            assert_eq!(resp.status(), status);
            assert_eq!(body_json(resp).await["error"]["code"], code);
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let error = ApiError::Station(StationConfigError::Io("/srv/station.json".into(), io));
        let resp = error.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let v = body_json(resp).await;
        assert_eq!(v["error"]["code"], "internal_error");
        assert!(v["error"]["message"].as_str().unwrap().contains("/srv/station.json"));
    }
}
