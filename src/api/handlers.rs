//! API route handlers
//!
//! - Panel entry points (`/api/v1/panel/*`), enveloped with the current view
//! - Scan ingestion and part location listing
//! - Station configuration persistence
//! - Plan datasets and document lookup
//! - Health

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::response::{ApiError, PanelEnvelope};
use crate::config::defaults::{
    DEFAULT_DOCS_ROOT, DEFAULT_PART_LOCATION_LIMIT, DEFAULT_PLAN_DATA_DIR, MAX_PART_LOCATION_LIMIT,
    UNKNOWN_DEVICE_ID,
};
use crate::panel::normalizer::parse_timestamp_value;
use crate::panel::{PanelError, RightPanel, StationChange, ViewerStateRequest};
use crate::storage::plan_cache::PlanRefresh;
use crate::storage::{
    validate_station_payload, DocumentLibrary, PlanCache, PlanDataset, StationConfig, StationConfigStore,
    PRODUCTION_PLAN, STANDARD_TIMES,
};
use crate::types::{to_utc_iso, LocationRecord, RawLocationRecord};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct PanelState {
    /// The panel every entry point mutates; writers are serialized by the lock
    pub panel: Arc<RwLock<RightPanel>>,
    /// Saved station configuration
    pub station_store: StationConfigStore,
    /// Production plan and standard time exports
    pub plan: Arc<PlanCache>,
    pub documents: DocumentLibrary,
    /// Bearer token for `/api/v1/*`; empty disables enforcement
    pub api_token: String,
}

impl PanelState {
    pub fn new(panel: RightPanel, station_store: StationConfigStore, api_token: impl Into<String>) -> Self {
        Self {
            panel: Arc::new(RwLock::new(panel)),
            station_store,
            plan: Arc::new(PlanCache::new(DEFAULT_PLAN_DATA_DIR)),
            documents: DocumentLibrary::new(DEFAULT_DOCS_ROOT),
            api_token: api_token.into(),
        }
    }

    #[must_use]
    pub fn with_plan_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.plan = Arc::new(PlanCache::new(data_dir));
        self
    }

    #[must_use]
    pub fn with_docs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.documents = DocumentLibrary::new(root);
        self
    }

    #[cfg(test)]
    pub(crate) fn for_tests(api_token: &str) -> Self {
        Self::new(
            RightPanel::default(),
            StationConfigStore::new(std::env::temp_dir().join("panel-api-test-station.json")),
            api_token,
        )
    }
}

// ============================================================================
// Panel Entry Points
// ============================================================================

/// Body of every panel entry point response.
#[derive(Debug, Serialize)]
pub struct PanelOutcome {
    /// `applied`, `rejected` or `stale`
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    pub view: crate::panel::PanelView,
}

fn panel_outcome<T: Serialize>(result: Result<T, PanelError>, panel: &RightPanel) -> PanelEnvelope<PanelOutcome> {
    let (outcome, detail) = match result {
        Ok(detail) => ("applied", serde_json::to_value(detail).ok()),
        Err(e) => (e.kind(), Some(json!({ "message": e.to_string() }))),
    };
    PanelEnvelope::new(
        PanelOutcome {
            outcome,
            detail,
            view: panel.view(),
        },
        panel.revision(),
    )
}

/// Snapshot body: a bare array or `{ "entries": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RefreshBody {
    Records(Vec<RawLocationRecord>),
    Wrapped { entries: Vec<RawLocationRecord> },
}

impl RefreshBody {
    pub fn records(&self) -> &[RawLocationRecord] {
        match self {
            Self::Records(records) | Self::Wrapped { entries: records } => records,
        }
    }
}

/// GET /api/v1/panel
pub async fn get_panel(State(state): State<PanelState>) -> impl IntoResponse {
    let panel = state.panel.read().await;
    PanelEnvelope::new(panel.view(), panel.revision())
}

/// POST /api/v1/panel/refresh
pub async fn refresh_panel(
    State(state): State<PanelState>,
    Json(body): Json<RefreshBody>,
) -> impl IntoResponse {
    let mut panel = state.panel.write().await;
    let result = panel.refresh_with(body.records());
    panel_outcome(result, &panel)
}

/// POST /api/v1/panel/socket-update
pub async fn socket_update(
    State(state): State<PanelState>,
    Json(record): Json<RawLocationRecord>,
) -> impl IntoResponse {
    let mut panel = state.panel.write().await;
    let result = panel.trigger_socket_update(&record);
    panel_outcome(result, &panel)
}

/// POST /api/v1/panel/viewer
pub async fn set_viewer_state(
    State(state): State<PanelState>,
    Json(request): Json<ViewerStateRequest>,
) -> impl IntoResponse {
    let mut panel = state.panel.write().await;
    let snapshot = panel.set_viewer_state(&request);
    panel_outcome(Ok::<_, PanelError>(snapshot), &panel)
}

/// POST /api/v1/panel/viewer/close
pub async fn close_viewer(State(state): State<PanelState>) -> impl IntoResponse {
    let mut panel = state.panel.write().await;
    let snapshot = panel.close_viewer();
    panel_outcome(Ok::<_, PanelError>(snapshot), &panel)
}

/// POST /api/v1/panel/station
pub async fn notify_station_change(
    State(state): State<PanelState>,
    Json(change): Json<StationChange>,
) -> impl IntoResponse {
    let mut panel = state.panel.write().await;
    let overlay_visible = panel.notify_station_change(&change);
    panel_outcome(
        Ok::<_, PanelError>(json!({ "overlay_visible": overlay_visible })),
        &panel,
    )
}

// ============================================================================
// Scan Ingestion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("missing_part_or_location")]
    MissingPartOrLocation,
    #[error("invalid_scanned_at")]
    InvalidScannedAt,
    #[error("{0}_not_string")]
    NotAString(&'static str),
}

/// Record accepted from a scan, as stored and as returned to the scanner.
#[derive(Debug, Clone, Serialize)]
pub struct ScanAccepted {
    pub accepted: bool,
    pub order_code: String,
    pub location_code: String,
    pub device_id: String,
    pub scan_id: String,
    pub scanned_at: String,
    pub updated_at: String,
}

impl From<&LocationRecord> for ScanAccepted {
    fn from(record: &LocationRecord) -> Self {
        Self {
            accepted: true,
            order_code: record.order_code.clone(),
            location_code: record.location_code.clone(),
            device_id: record.device_id.clone(),
            scan_id: record.last_scan_id.clone().unwrap_or_default(),
            scanned_at: to_utc_iso(&record.scanned_at),
            updated_at: to_utc_iso(&record.updated_at),
        }
    }
}

fn generate_scan_id(now: &DateTime<Utc>) -> String {
    now.format("scan-%Y%m%d%H%M%S%6f").to_string()
}

fn optional_str(payload: &Value, key: &'static str) -> Result<Option<String>, ScanError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string()).filter(|s| !s.is_empty())),
        Some(_) => Err(ScanError::NotAString(key)),
    }
}

/// Turn a scanner payload into the raw record the panel normalizes.
///
/// `updated_at` is always `now`. A missing or blank `device_id` becomes
/// [`UNKNOWN_DEVICE_ID`] so the stored record passes the normalizer like any
/// other.
pub fn scan_to_record(payload: &Value, now: DateTime<Utc>) -> Result<RawLocationRecord, ScanError> {
    let part_code = optional_str(payload, "part_code")?;
    let location_code = optional_str(payload, "location_code")?;
    let scan_id = optional_str(payload, "scan_id")?.unwrap_or_else(|| generate_scan_id(&now));
    let device_id = optional_str(payload, "device_id")?.unwrap_or_else(|| UNKNOWN_DEVICE_ID.to_string());

    let (Some(order_code), Some(location_code)) = (part_code, location_code) else {
        return Err(ScanError::MissingPartOrLocation);
    };

    let scanned_at = match payload.get("scanned_at") {
        None | Some(Value::Null) => now,
        Some(Value::String(s)) if s.is_empty() => now,
        Some(v) => parse_timestamp_value(v).ok_or(ScanError::InvalidScannedAt)?,
    };

    Ok(RawLocationRecord {
        order_code: Some(order_code.into()),
        location_code: Some(location_code.into()),
        device_id: Some(device_id.into()),
        scanned_at: Some(to_utc_iso(&scanned_at).into()),
        updated_at: Some(to_utc_iso(&now).into()),
        last_scan_id: Some(scan_id.into()),
    })
}

/// POST /api/v1/scans
///
/// A scan is authoritative: it replaces the stored location whatever the
/// stale policy.
pub async fn create_scan(
    State(state): State<PanelState>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<ScanAccepted>), ApiError> {
    let raw = scan_to_record(&payload, Utc::now()).map_err(|e| {
        warn!(error = %e, "Scan rejected");
        e
    })?;

    let stored = state.panel.write().await.apply_scan(&raw)?;
    let accepted = ScanAccepted::from(&stored);

    info!(
        order_code = %accepted.order_code,
        location_code = %accepted.location_code,
        device_id = %accepted.device_id,
        scan_id = %accepted.scan_id,
        "Scan accepted"
    );
    Ok((StatusCode::CREATED, Json(accepted)))
}

// ============================================================================
// Part Locations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PartLocationsQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartLocationEntry {
    pub order_code: String,
    pub location_code: String,
    pub device_id: String,
    pub last_scan_id: Option<String>,
    pub scanned_at: String,
    pub updated_at: String,
}

impl From<&LocationRecord> for PartLocationEntry {
    fn from(record: &LocationRecord) -> Self {
        Self {
            order_code: record.order_code.clone(),
            location_code: record.location_code.clone(),
            device_id: record.device_id.clone(),
            last_scan_id: record.last_scan_id.clone(),
            scanned_at: to_utc_iso(&record.scanned_at),
            updated_at: to_utc_iso(&record.updated_at),
        }
    }
}

/// Parse and clamp `?limit=`. `None` means the parameter was not an integer.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let Some(raw) = raw else {
        return Some(DEFAULT_PART_LOCATION_LIMIT);
    };
    let value: i64 = raw.trim().parse().ok()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = value.clamp(1, MAX_PART_LOCATION_LIMIT as i64) as usize;
    Some(clamped)
}

/// GET /api/v1/part-locations
pub async fn list_part_locations(
    State(state): State<PanelState>,
    Query(query): Query<PartLocationsQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = parse_limit(query.limit.as_deref()).ok_or(ApiError::InvalidLimit)?;

    let panel = state.panel.read().await;
    let entries: Vec<PartLocationEntry> = panel
        .store()
        .current_view()
        .into_iter()
        .take(limit)
        .map(PartLocationEntry::from)
        .collect();
    Ok(Json(json!({ "entries": entries })))
}

// ============================================================================
// Station Configuration
// ============================================================================

/// GET /api/v1/station-config
pub async fn get_station_config(State(state): State<PanelState>) -> Json<StationConfig> {
    Json(state.station_store.load())
}

/// POST /api/v1/station-config: persist, then apply to the overlay gate.
pub async fn update_station_config(
    State(state): State<PanelState>,
    Json(payload): Json<Value>,
) -> Result<Json<StationConfig>, ApiError> {
    let change = validate_station_payload(&payload).map_err(|e| {
        warn!(error = %e, "Station config rejected");
        e
    })?;

    let saved = state.station_store.save(&change).map_err(|e| {
        warn!(error = %e, "Failed to save station config");
        e
    })?;

    state
        .panel
        .write()
        .await
        .notify_station_change(&saved.to_change());
    Ok(Json(saved))
}

// ============================================================================
// Plan Datasets
// ============================================================================

fn plan_response(state: &PanelState, dataset: &PlanDataset) -> Response {
    let snapshot = state.plan.get(dataset);
    let status = if snapshot.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(snapshot)).into_response()
}

/// GET /api/v1/production-plan
pub async fn production_plan(State(state): State<PanelState>) -> Response {
    plan_response(&state, &PRODUCTION_PLAN)
}

/// GET /api/v1/standard-times
pub async fn standard_times(State(state): State<PanelState>) -> Response {
    plan_response(&state, &STANDARD_TIMES)
}

/// POST /api/v1/plan/refresh: re-read every dataset regardless of mtime.
pub async fn refresh_plan(State(state): State<PanelState>) -> Json<Vec<PlanRefresh>> {
    let summary = state.plan.refresh_all();
    info!(datasets = summary.len(), "Plan datasets refreshed");
    Json(summary)
}

// ============================================================================
// Documents
// ============================================================================

/// GET /api/documents/*part
pub async fn get_document(State(state): State<PanelState>, Path(part_number): Path<String>) -> Response {
    match state.documents.lookup(&part_number, Utc::now()) {
        Some(found) => {
            info!(part = %part_number, filename = %found.filename, "Document lookup success");
            Json(found).into_response()
        }
        None => {
            info!(part = %part_number, "Document not found");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "found": false, "message": "document not found" })),
            )
                .into_response()
        }
    }
}

/// GET /viewer/health
pub async fn viewer_health(State(state): State<PanelState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "docs_root": state.documents.root().display().to_string(),
    }))
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health_check(State(state): State<PanelState>) -> Json<Value> {
    let panel = state.panel.read().await;
    Json(json!({
        "status": "ok",
        "revision": panel.revision(),
        "count": panel.store().len(),
    }))
}
