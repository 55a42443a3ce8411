//! Config Validation Tests
//!
//! Typo detection for `panel_config.toml` keys and value validation,
//! exercised independently from the HTTP surface.

use part_location_panel::config::validation::{
    known_config_keys, suggest_correction, validate_unknown_keys,
};
use part_location_panel::config::{ConfigError, PanelConfig};
use part_location_panel::{Locale, StalePolicy};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_stale_policy_warns_with_suggestion() {
    let toml_str = r#"
[store]
stale_polcy = "reject"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("stale_polcy"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("store.stale_policy"));
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[sever]
addr = "0.0.0.0:8501"
"#;
    let warnings = validate_unknown_keys(toml_str);
    // Both the section and its child key are unknown
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| w.suggestion.as_deref() == Some("server")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[server]
addr = "127.0.0.1:8501"
api_token = "secret-token"
cors_origins = "http://localhost:5173"

[display]
locale = "en"

[store]
stale_policy = "last_write_wins"

[station]
config_path = "./data/station.json"

[plan]
data_dir = "/srv/panel/plan"

[documents]
docs_root = "/srv/panel/documents"
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
}

#[test]
fn every_serialized_default_key_is_known() {
    let toml_str = PanelConfig::default().to_toml().unwrap();
    let warnings = validate_unknown_keys(&toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
}

#[test]
fn unrelated_key_has_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("telemetry.prometheus_exporter_port", &known).is_none());
}

// ============================================================================
// Value Validation
// ============================================================================

#[test]
fn unknown_keys_do_not_fail_loading() {
    let config = PanelConfig::from_toml_str("[display]\nlocale = \"en\"\ncolour = \"blue\"\n").unwrap();
    assert_eq!(config.display.locale, Locale::En);
}

#[test]
fn unparsable_addr_is_rejected() {
    let err = PanelConfig::from_toml_str("[server]\naddr = \"8501\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn empty_station_path_is_rejected() {
    let err = PanelConfig::from_toml_str("[station]\nconfig_path = \"\"\n").unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.contains("station.config_path")));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn typo_in_docs_root_suggests_documents_key() {
    let warnings = validate_unknown_keys("[documents]\ndocs_rot = \"/srv/docs\"\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("documents.docs_root"));
}

#[test]
fn plan_and_document_dirs_load_from_file() {
    let config = PanelConfig::from_toml_str(
        "[plan]\ndata_dir = \"/srv/plan\"\n[documents]\ndocs_root = \"/srv/docs\"\n",
    )
    .unwrap();
    assert_eq!(config.plan.data_dir, std::path::PathBuf::from("/srv/plan"));
    assert_eq!(config.documents.docs_root, std::path::PathBuf::from("/srv/docs"));

    let err = PanelConfig::from_toml_str("[plan]\ndata_dir = \"\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn unknown_locale_is_a_parse_error() {
    let err = PanelConfig::from_toml_str("[display]\nlocale = \"fr\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PanelConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn load_from_file_reports_path_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel_config.toml");
    std::fs::write(&path, "[store]\nstale_policy = 3\n").unwrap();
    let err = PanelConfig::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("panel_config.toml"));
}

#[test]
fn env_overrides_apply_over_file_values() {
    let mut config = PanelConfig::from_toml_str("[server]\napi_token = \"from-file\"\n").unwrap();
    assert_eq!(config.store.stale_policy, StalePolicy::Reject);

    std::env::set_var("PANEL_API_TOKEN", "  from-env  ");
    std::env::set_var("PANEL_SERVER_ADDR", "127.0.0.1:9999");
    config.apply_env_overrides();
    std::env::remove_var("PANEL_API_TOKEN");
    std::env::remove_var("PANEL_SERVER_ADDR");

    assert_eq!(config.server.api_token, "from-env");
    assert_eq!(config.server.addr, "127.0.0.1:9999");
    assert!(config.validate().is_ok());
}
