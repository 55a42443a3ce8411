//! Panel Configuration Module
//!
//! Operator-tunable settings loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `PANEL_CONFIG` environment variable (path to TOML file)
//! 2. `panel_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `PANEL_SERVER_ADDR` and `PANEL_API_TOKEN` override the loaded values.
//!
//! The loaded [`PanelConfig`] is passed explicitly to whatever needs it;
//! there is no process-wide config instance.

mod panel_config;
pub mod defaults;
pub mod validation;

pub use panel_config::*;
