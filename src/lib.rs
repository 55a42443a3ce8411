//! Part Location Panel: right panel preview core
//!
//! Keeps a live list of part locations consistent across a pulled snapshot
//! and pushed incremental updates, announces pushed changes, tracks the
//! document viewer state and gates the viewer by station availability.
//!
//! ## Architecture
//!
//! - **Panel** (`panel`): normalizer, location store, banner, viewer and
//!   station gate, owned per instance by [`RightPanel`]
//! - **API** (`api`): axum host surface driving a shared panel
//! - **Storage** (`storage`): station configuration, plan datasets, part documents
//! - **Config** (`config`): TOML configuration with env overrides

pub mod api;
pub mod config;
pub mod panel;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::PanelConfig;

// Re-export commonly used types
pub use types::{LocationRecord, RawLocationRecord, ViewerPhase};

// Re-export the panel core
pub use panel::{
    Locale, PanelError, PanelView, RefreshSummary, RightPanel, StalePolicy, StationChange,
    UpsertOutcome, ViewerSnapshot, ViewerStateRequest,
};
