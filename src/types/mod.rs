//! Shared data types for the right panel core.
//!
//! - `location`: raw and validated part-location records
//! - `viewer`: viewer phase of the companion document viewer

pub mod location;
pub mod viewer;

pub use location::{to_utc_iso, LocationRecord, RawLocationRecord};
pub use viewer::ViewerPhase;
