//! Pure projections of panel state into what the host page displays.
//!
//! Nothing here mutates state, so every projection can be checked without a
//! live page.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::banner::NotificationBanner;
use super::labels::Labels;
use super::station::StationGate;
use super::store::LocationStore;
use super::viewer::ViewerController;
use crate::types::{LocationRecord, ViewerPhase};

const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSS class applied to the overlay element when it is hidden.
pub const OVERLAY_HIDDEN_CLASS: &str = "is-hidden";
/// CSS class applied to the overlay element when it is visible.
pub const OVERLAY_VISIBLE_CLASS: &str = "is-visible";

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub order_code: String,
    pub location_code: String,
    pub device_id: String,
    pub scanned_at: String,
    pub updated_at: String,
}

/// Everything the host renders for one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub rows: Vec<TableRow>,
    pub count: usize,
    pub count_label: String,
    pub message: Option<String>,
    pub part_chip: Option<String>,
    pub part_chip_label: String,
    pub viewer_phase: ViewerPhase,
    pub state_chip: String,
    pub overlay_visible: bool,
    pub overlay_class: &'static str,
    pub revision: u64,
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_DISPLAY_FORMAT).to_string()
}

pub fn table_row(record: &LocationRecord) -> TableRow {
    TableRow {
        order_code: record.order_code.clone(),
        location_code: record.location_code.clone(),
        device_id: record.device_id.clone(),
        scanned_at: format_timestamp(&record.scanned_at),
        updated_at: format_timestamp(&record.updated_at),
    }
}

/// One row per record, in the store's view order.
pub fn table_rows(store: &LocationStore) -> Vec<TableRow> {
    store.current_view().into_iter().map(table_row).collect()
}

pub const fn overlay_class(visible: bool) -> &'static str {
    if visible {
        OVERLAY_VISIBLE_CLASS
    } else {
        OVERLAY_HIDDEN_CLASS
    }
}

/// Borrowed view of every panel component, passed to [`render`].
pub struct PanelParts<'a> {
    pub store: &'a LocationStore,
    pub banner: &'a NotificationBanner,
    pub viewer: &'a ViewerController,
    pub gate: &'a StationGate,
    pub labels: &'a Labels,
    pub revision: u64,
}

pub fn render(parts: &PanelParts<'_>) -> PanelView {
    let rows = table_rows(parts.store);
    let count = parts.store.len();
    let part_chip = parts.viewer.focused_part().map(str::to_string);
    let phase = parts.viewer.phase();
    let overlay_visible = parts.gate.overlay_visible();

    PanelView {
        count_label: parts.labels.count(count),
        rows,
        count,
        message: parts.banner.current().map(|a| a.message.clone()),
        part_chip_label: part_chip
            .clone()
            .unwrap_or_else(|| parts.labels.no_part().to_string()),
        part_chip,
        viewer_phase: phase,
        state_chip: parts.labels.viewer_phase(phase).to_string(),
        overlay_visible,
        overlay_class: overlay_class(overlay_visible),
        revision: parts.revision,
    }
}
