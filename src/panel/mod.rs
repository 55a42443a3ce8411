//! Right Panel Core
//!
//! Reconciles a pulled snapshot, pushed incremental updates and the viewer /
//! station state into one consistent view.
//!
//! ## Components
//!
//! - **Record Normalizer** (`normalizer`): the only validation gate for input
//! - **Location Store** (`store`): one current location per order
//! - **Notification Banner** (`banner`): latest pushed update
//! - **Viewer State Controller** (`viewer`): focused part and viewer phase
//! - **Station Availability Gate** (`station`): overlay visibility
//! - **Renderer** (`render`): pure projection into a [`PanelView`]
//!
//! [`RightPanel`] owns one instance of each. Construct one per mounted panel;
//! nothing is shared between instances.

pub mod banner;
pub mod labels;
pub mod normalizer;
pub mod render;
pub mod station;
pub mod store;
pub mod viewer;

pub use banner::{Announcement, NotificationBanner};
pub use labels::{Labels, Locale};
pub use normalizer::{normalize, RejectedInput};
pub use render::{PanelView, TableRow};
pub use station::{StationAvailability, StationChange, StationGate};
pub use store::{LocationStore, StalePolicy, StaleUpdate, UpsertOutcome};
pub use viewer::{ViewerController, ViewerSnapshot, ViewerStateRequest};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::types::{LocationRecord, RawLocationRecord};

/// Why an entry point left the panel unchanged. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("record {index} rejected: {reason}")]
    Rejected { index: usize, reason: RejectedInput },
    #[error(transparent)]
    Stale(#[from] StaleUpdate),
}

impl PanelError {
    /// Short machine-readable tag.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Stale(_) => "stale",
        }
    }
}

/// Result of an applied snapshot refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    /// Records supplied by the snapshot.
    pub received: usize,
    /// Distinct orders held afterwards.
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RightPanel {
    store: LocationStore,
    banner: NotificationBanner,
    viewer: ViewerController,
    gate: StationGate,
    labels: Labels,
    revision: u64,
}

impl RightPanel {
    pub fn new(policy: StalePolicy, locale: Locale) -> Self {
        Self {
            store: LocationStore::new(policy),
            labels: Labels::for_locale(locale),
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Snapshot refresh. Every record is normalized first; a single rejected
    /// record skips the whole refresh. Never announces.
    pub fn refresh_with(
        &mut self,
        records: &[RawLocationRecord],
    ) -> Result<RefreshSummary, PanelError> {
        let normalized = normalizer::normalize_all(records).map_err(|(index, reason)| {
            warn!(index, error = %reason, "Snapshot refresh rejected, keeping previous contents");
            PanelError::Rejected { index, reason }
        })?;

        self.store.replace_all(normalized);
        self.bump();

        let summary = RefreshSummary {
            received: records.len(),
            count: self.store.len(),
        };
        info!(received = summary.received, count = summary.count, "Snapshot refresh applied");
        Ok(summary)
    }

    /// Incremental push: normalize, upsert, announce.
    pub fn trigger_socket_update(
        &mut self,
        record: &RawLocationRecord,
    ) -> Result<UpsertOutcome, PanelError> {
        let normalized = normalize(record).map_err(|reason| {
            warn!(error = %reason, "Pushed update rejected");
            PanelError::Rejected { index: 0, reason }
        })?;
        self.apply_push(normalized)
    }

    /// Scan ingestion. The record goes through the same normalizer as any
    /// push, but a scan is authoritative: it is applied regardless of the
    /// stale policy, then announced. Returns the record as stored.
    pub fn apply_scan(&mut self, record: &RawLocationRecord) -> Result<LocationRecord, PanelError> {
        let normalized = normalize(record).map_err(|reason| {
            warn!(error = %reason, "Scan record rejected");
            PanelError::Rejected { index: 0, reason }
        })?;
        let outcome = self.store.force_upsert(normalized.clone());
        self.announce_applied(&normalized, &outcome, "Scan applied");
        Ok(normalized)
    }

    fn apply_push(&mut self, record: LocationRecord) -> Result<UpsertOutcome, PanelError> {
        let announced = record.clone();
        let outcome = self.store.upsert(record).map_err(|stale| {
            warn!(
                order_code = %stale.order_code,
                incoming = %stale.incoming,
                stored = %stale.stored,
                "Stale update skipped"
            );
            PanelError::from(stale)
        })?;
        self.announce_applied(&announced, &outcome, "Pushed update applied");
        Ok(outcome)
    }

    fn announce_applied(&mut self, record: &LocationRecord, outcome: &UpsertOutcome, what: &'static str) {
        self.banner.announce(record, &self.labels);
        self.bump();
        debug!(
            order_code = %record.order_code,
            location_code = %record.location_code,
            ?outcome,
            "{what}"
        );
    }

    pub fn set_viewer_state(&mut self, request: &ViewerStateRequest) -> ViewerSnapshot {
        let snapshot = self
            .viewer
            .set(request.part.as_deref(), request.state)
            .clone();
        self.bump();
        debug!(part = ?snapshot.focused_part, phase = %snapshot.phase, "Viewer state set");
        snapshot
    }

    pub fn close_viewer(&mut self) -> ViewerSnapshot {
        let snapshot = self.viewer.close().clone();
        self.bump();
        debug!("Viewer closed");
        snapshot
    }

    /// Returns whether the overlay is now visible.
    pub fn notify_station_change(&mut self, change: &StationChange) -> bool {
        let visible = self.gate.notify(change);
        self.bump();
        debug!(
            process = %change.process.trim(),
            available = self.gate.availability().available_processes.len(),
            overlay_visible = visible,
            "Station change applied"
        );
        visible
    }

    // ------------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------------

    pub fn view(&self) -> PanelView {
        render::render(&render::PanelParts {
            store: &self.store,
            banner: &self.banner,
            viewer: &self.viewer,
            gate: &self.gate,
            labels: &self.labels,
            revision: self.revision,
        })
    }

    pub const fn store(&self) -> &LocationStore {
        &self.store
    }

    pub const fn banner(&self) -> &NotificationBanner {
        &self.banner
    }

    pub const fn viewer(&self) -> &ViewerController {
        &self.viewer
    }

    pub const fn station(&self) -> &StationGate {
        &self.gate
    }

    pub const fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Incremented on every applied mutation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
