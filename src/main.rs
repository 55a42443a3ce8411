//! Part Location Panel server
//!
//! Hosts one [`RightPanel`] behind the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Run with ./panel_config.toml or built-in defaults
//! cargo run --release
//!
//! # Explicit config and bind address, JSON logs
//! ./part-location-panel --config /etc/panel/panel_config.toml --addr 127.0.0.1:8501 --log-json
//! ```
//!
//! # Environment Variables
//!
//! - `PANEL_CONFIG`: Path to the TOML config (default: ./panel_config.toml)
//! - `PANEL_SERVER_ADDR`: Override `server.addr`
//! - `PANEL_API_TOKEN`: Override `server.api_token`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use part_location_panel::api::{create_app, PanelState};
use part_location_panel::storage::{DocumentLibrary, StationConfigStore};
use part_location_panel::{PanelConfig, RightPanel};

#[derive(Parser, Debug)]
#[command(name = "part-location-panel")]
#[command(about = "Part location right panel server")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (skips the PANEL_CONFIG / ./panel_config.toml search)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:8501")
    #[arg(short, long, value_name = "HOST:PORT")]
    addr: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

fn load_config(args: &CliArgs) -> Result<PanelConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = PanelConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => PanelConfig::load(),
    };
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Build the panel and seed its station gate from the saved configuration.
fn build_panel(config: &PanelConfig, station_store: &StationConfigStore) -> RightPanel {
    let mut panel = RightPanel::new(config.store.stale_policy, config.display.locale);

    let saved = station_store.load();
    if saved.has_process() {
        let overlay_visible = panel.notify_station_change(&saved.to_change());
        info!(
            process = %saved.process,
            available = saved.available.len(),
            overlay_visible,
            "Station gate seeded from saved config"
        );
    }
    panel
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;
    info!(
        addr = %config.server.addr,
        locale = ?config.display.locale,
        stale_policy = ?config.store.stale_policy,
        token_required = !config.server.api_token.is_empty(),
        "Part location panel starting"
    );

    let station_store = StationConfigStore::new(&config.station.config_path);
    let panel = build_panel(&config, &station_store);
    let documents = DocumentLibrary::new(&config.documents.docs_root);
    if let Err(e) = documents.ensure_root() {
        warn!(root = %documents.root().display(), error = %e, "Could not create documents root");
    }
    info!(
        plan_dir = %config.plan.data_dir.display(),
        docs_root = %documents.root().display(),
        "Plan datasets and documents configured"
    );

    let state = PanelState::new(panel, station_store, config.server.api_token.clone())
        .with_plan_dir(&config.plan.data_dir)
        .with_docs_root(documents.root());
    let app = create_app(state, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.addr))?;
    info!("HTTP server listening on {}", config.server.addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    match result {
        Ok(()) => {
            info!("Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Server error");
            Err(anyhow::anyhow!("HTTP server error: {e}"))
        }
    }
}
