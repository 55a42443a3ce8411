//! Persistent storage
//!
//! - `station_config`: saved process / available stations (JSON file)
//! - `plan_cache`: production plan and standard time CSV exports
//! - `documents`: `<part>.pdf` lookup under the documents root

pub mod documents;
pub mod plan_cache;
pub mod station_config;

pub use documents::{DocumentLibrary, DocumentMatch};
pub use plan_cache::{PlanCache, PlanDataset, PlanSnapshot, PRODUCTION_PLAN, STANDARD_TIMES};
pub use station_config::{validate_station_payload, StationConfig, StationConfigError, StationConfigStore};
