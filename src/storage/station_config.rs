//! Station configuration persistence
//!
//! Stores the operator's current process and the processes where the
//! document viewer is usable, as a small JSON file:
//!
//! ```json
//! { "process": "加工", "available": ["加工", "検査"], "updated_at": "2025-01-01T08:00:00Z" }
//! ```
//!
//! A missing or unreadable file yields the empty configuration.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::panel::StationChange;

#[derive(Debug, thiserror::Error)]
pub enum StationConfigError {
    #[error("invalid_station_process")]
    InvalidProcess,
    #[error("invalid_station_available")]
    InvalidAvailable,
    #[error("station config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("station config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StationConfigError {
    /// Whether the error comes from the submitted payload rather than storage.
    pub const fn is_payload_error(&self) -> bool {
        matches!(self, Self::InvalidProcess | Self::InvalidAvailable)
    }
}

/// Saved station configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default)]
    pub process: String,
    #[serde(default)]
    pub available: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StationConfig {
    /// Whether a process has been configured at all.
    pub fn has_process(&self) -> bool {
        !self.process.is_empty()
    }

    pub fn to_change(&self) -> StationChange {
        StationChange {
            process: self.process.clone(),
            available: self.available.clone(),
        }
    }
}

// ============================================================================
// Payload Validation
// ============================================================================

/// Validate an untyped `{process, available}` payload.
///
/// `process` must be a string (or absent/null), `available` a list of strings
/// (or absent/null). Values are trimmed and blank list entries dropped.
pub fn validate_station_payload(payload: &Value) -> Result<StationChange, StationConfigError> {
    let process = match payload.get("process") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(StationConfigError::InvalidProcess),
    };

    let available = match payload.get("available") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or(StationConfigError::InvalidAvailable)
            })
            .filter(|item| !matches!(item, Ok(s) if s.is_empty()))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(StationConfigError::InvalidAvailable),
    };

    Ok(StationChange { process, available })
}

// ============================================================================
// File Store
// ============================================================================

/// Reads and writes the station configuration file.
#[derive(Debug, Clone)]
pub struct StationConfigStore {
    path: PathBuf,
}

impl StationConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved configuration, falling back to the empty one.
    pub fn load(&self) -> StationConfig {
        if !self.path.exists() {
            return StationConfig::default();
        }
        match self.try_load() {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable station config, using empty config");
                StationConfig::default()
            }
        }
    }

    fn try_load(&self) -> Result<StationConfig, StationConfigError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| StationConfigError::Io(self.path.clone(), e))?;
        let raw: Value = serde_json::from_str(&text)?;
        let change = validate_station_payload(&raw)?;
        let updated_at = raw
            .get("updated_at")
            .and_then(Value::as_str)
            .and_then(crate::panel::normalizer::parse_timestamp_str);
        Ok(StationConfig {
            process: change.process,
            available: change.available,
            updated_at,
        })
    }

    /// Persist `change`, stamping `updated_at` with the current time.
    pub fn save(&self, change: &StationChange) -> Result<StationConfig, StationConfigError> {
        let config = StationConfig {
            process: change.process.trim().to_string(),
            available: change
                .available
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            updated_at: Some(Utc::now()),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StationConfigError::Io(parent.to_path_buf(), e))?;
        }
        let body = serde_json::to_string_pretty(&config)?;
        std::fs::write(&self.path, body)
            .map_err(|e| StationConfigError::Io(self.path.clone(), e))?;

        info!(
            path = %self.path.display(),
            process = %config.process,
            available = config.available.len(),
            "Station config saved"
        );
        Ok(config)
    }
}
