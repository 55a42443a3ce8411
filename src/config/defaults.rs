//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8501";

/// Default value for `Access-Control-Allow-Origin`.
pub const DEFAULT_CORS_ORIGINS: &str = "*";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "PANEL_CONFIG";

/// Config file looked up in the working directory when `PANEL_CONFIG` is unset.
pub const LOCAL_CONFIG_FILE: &str = "panel_config.toml";

/// Environment override for `server.addr`.
pub const SERVER_ADDR_ENV: &str = "PANEL_SERVER_ADDR";

/// Environment override for `server.api_token`.
pub const API_TOKEN_ENV: &str = "PANEL_API_TOKEN";

// ============================================================================
// Part Location Listing
// ============================================================================

/// Entries returned by `GET /api/v1/part-locations` without a `limit`.
pub const DEFAULT_PART_LOCATION_LIMIT: usize = 200;

/// Upper bound for the `limit` query parameter.
pub const MAX_PART_LOCATION_LIMIT: usize = 1000;

/// Device recorded for a scan that does not name one.
pub const UNKNOWN_DEVICE_ID: &str = "unknown-device";

// ============================================================================
// Station
// ============================================================================

/// Default location of the persisted station configuration.
pub const DEFAULT_STATION_CONFIG_PATH: &str = "./data/station.json";

// ============================================================================
// Plan Datasets and Documents
// ============================================================================

/// Directory holding `production_plan.csv` and `standard_times.csv`.
pub const DEFAULT_PLAN_DATA_DIR: &str = "./data/plan";

/// Directory searched for `<part>.pdf` documents.
pub const DEFAULT_DOCS_ROOT: &str = "./data/documents";
