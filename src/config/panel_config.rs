//! Panel Configuration - operator-tunable TOML values
//!
//! Each struct implements `Default`, so a missing file or section behaves
//! exactly like the built-in settings.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::panel::{Locale, StalePolicy};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `PanelConfig::load()` which searches:
/// 1. `$PANEL_CONFIG` env var
/// 2. `./panel_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Label rendering
    #[serde(default)]
    pub display: DisplayConfig,

    /// Location Store behaviour
    #[serde(default)]
    pub store: StoreConfig,

    /// Station configuration persistence
    #[serde(default)]
    pub station: StationConfigSection,

    /// Production plan / standard time CSV exports
    #[serde(default)]
    pub plan: PlanConfigSection,

    /// Part documents served to the viewer
    #[serde(default)]
    pub documents: DocumentsConfigSection,
}

impl PanelConfig {
    /// Load configuration using the standard search order, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_from_search_path();
        config.apply_env_overrides();
        config
    }

    fn load_from_search_path() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_PATH_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded panel config from PANEL_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PANEL_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PANEL_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./panel_config.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded panel config from ./panel_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./panel_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No panel_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not fatal.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// `PANEL_SERVER_ADDR` and `PANEL_API_TOKEN` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var(defaults::SERVER_ADDR_ENV) {
            self.server.addr = addr;
        }
        if let Ok(token) = std::env::var(defaults::API_TOKEN_ENV) {
            self.server.api_token = token.trim().to_string();
        }
    }

    /// Reject values the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a valid socket address (expected HOST:PORT)",
                self.server.addr
            ));
        }

        if self.server.cors_origins.trim().is_empty() {
            errors.push("server.cors_origins must not be empty (use \"*\" to allow any origin)".to_string());
        }

        if self.station.config_path.as_os_str().is_empty() {
            errors.push("station.config_path must not be empty".to_string());
        }

        if self.plan.data_dir.as_os_str().is_empty() {
            errors.push("plan.data_dir must not be empty".to_string());
        }

        if self.documents.docs_root.as_os_str().is_empty() {
            errors.push("documents.docs_root must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (HOST:PORT)
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Bearer token required on `/api/v1/*`. Empty disables the check.
    #[serde(default)]
    pub api_token: String,

    /// Comma-separated allowed origins, or `*`
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

fn default_cors_origins() -> String {
    defaults::DEFAULT_CORS_ORIGINS.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            api_token: String::new(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `reject` (default) or `last_write_wins`
    #[serde(default)]
    pub stale_policy: StalePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfigSection {
    /// JSON file holding the saved process/available stations
    #[serde(default = "default_station_config_path")]
    pub config_path: PathBuf,
}

fn default_station_config_path() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_STATION_CONFIG_PATH)
}

impl Default for StationConfigSection {
    fn default() -> Self {
        Self {
            config_path: default_station_config_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfigSection {
    /// Directory holding `production_plan.csv` and `standard_times.csv`
    #[serde(default = "default_plan_data_dir")]
    pub data_dir: PathBuf,
}

fn default_plan_data_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_PLAN_DATA_DIR)
}

impl Default for PlanConfigSection {
    fn default() -> Self {
        Self {
            data_dir: default_plan_data_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsConfigSection {
    /// Directory searched for `<part>.pdf`, served under `/documents/`
    #[serde(default = "default_docs_root")]
    pub docs_root: PathBuf,
}

fn default_docs_root() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_DOCS_ROOT)
}

impl Default for DocumentsConfigSection {
    fn default() -> Self {
        Self {
            docs_root: default_docs_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = PanelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.addr, "0.0.0.0:8501");
        assert_eq!(config.display.locale, Locale::Ja);
        assert_eq!(config.store.stale_policy, StalePolicy::Reject);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = PanelConfig::from_toml_str("").unwrap();
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_sections_parse() {
        let config = PanelConfig::from_toml_str(
            r#"
[server]
addr = "127.0.0.1:9000"
api_token = "secret"

[display]
locale = "en"

[store]
stale_policy = "last_write_wins"

[station]
config_path = "/tmp/station.json"
"#,
        )
        .unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.server.api_token, "secret");
        assert_eq!(config.display.locale, Locale::En);
        assert_eq!(config.store.stale_policy, StalePolicy::LastWriteWins);
        assert_eq!(config.station.config_path, PathBuf::from("/tmp/station.json"));
    }

    #[test]
    fn test_invalid_addr_fails_validation() {
        let err = PanelConfig::from_toml_str("[server]\naddr = \"nowhere\"\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert!(errors[0].contains("server.addr")),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let err = PanelConfig::from_toml_str("[store]\nstale_policy = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(..)));
    }

    #[test]
    fn test_toml_roundtrip_via_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel_config.toml");
        let mut config = PanelConfig::default();
        config.display.locale = Locale::En;
        config.save_to_file(&path).unwrap();
        let loaded = PanelConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
