//! # mevdash
//!
//! MEV dashboard event gateway binary — wires settings, the event hub, and
//! the HTTP/WebSocket server together.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mevdash_hub::{EventHub, HubConfig};
use mevdash_server::{MevdashServer, ServerConfig};
use mevdash_settings::{loader, MevdashSettings};

/// MEV dashboard event gateway.
#[derive(Parser, Debug)]
#[command(name = "mevdash", about = "Real-time event gateway for the MEV dashboard")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file (default: `~/.mevdash/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// `RUST_LOG` wins; the settings file level is the fallback.
fn init_tracing(settings: &MevdashSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.as_filter_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn hub_config(settings: &MevdashSettings) -> HubConfig {
    HubConfig {
        send_timeout: Duration::from_millis(settings.hub.send_timeout_ms),
        event_types: settings.hub.event_types.clone(),
    }
}

fn server_config(settings: &MevdashSettings, args: &Cli) -> ServerConfig {
    ServerConfig {
        host: args
            .host
            .clone()
            .unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.port),
        max_connections: settings.server.max_connections,
        heartbeat_interval_secs: settings.server.heartbeat_interval_secs,
        heartbeat_timeout_secs: settings.server.heartbeat_timeout_secs,
        session_queue_capacity: settings.hub.session_queue_capacity,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load settings early (needed for the log level before logging init)
    let settings_path = args.settings.clone().unwrap_or_else(loader::settings_path);
    let settings = loader::load_settings_from_path(&settings_path).unwrap_or_default();

    init_tracing(&settings);
    let prometheus = mevdash_server::metrics::install_recorder();

    let hub = Arc::new(EventHub::new(hub_config(&settings)));
    let server =
        MevdashServer::new(server_config(&settings, &args), Arc::clone(&hub)).with_metrics(prometheus);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("mevdash listening on http://{addr}");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    let closed = hub.drain();
    tracing::info!(closed, "subscriber sessions drained");
    server.shutdown().graceful_shutdown(vec![handle], None).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_defaults_to_settings_driven_values() {
        let cli = Cli::parse_from(["mevdash"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.settings, None);
    }

    #[test]
    fn cli_custom_host_and_port() {
        let cli = Cli::parse_from(["mevdash", "--host", "0.0.0.0", "--port", "9100"]);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9100));
    }

    #[test]
    fn cli_settings_path() {
        let cli = Cli::parse_from(["mevdash", "--settings", "/tmp/custom.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/custom.json")));
    }

    #[test]
    fn cli_overrides_beat_settings() {
        let cli = Cli::parse_from(["mevdash", "--port", "9100"]);
        let settings = MevdashSettings::default();
        let config = server_config(&settings, &cli);
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, settings.server.host);
    }

    #[test]
    fn settings_map_onto_hub_config() {
        let settings = MevdashSettings::default();
        let config = hub_config(&settings);
        assert_eq!(config.send_timeout, Duration::from_millis(5000));
        assert!(config.event_types.contains(&"transaction".to_string()));
    }

    #[test]
    fn settings_map_onto_server_config() {
        let cli = Cli::parse_from(["mevdash"]);
        let settings = MevdashSettings::default();
        let config = server_config(&settings, &cli);
        assert_eq!(config.port, 8000);
        assert_eq!(config.heartbeat_interval_secs, 30);
        assert_eq!(config.heartbeat_timeout_secs, 90);
        assert_eq!(config.session_queue_capacity, 256);
    }

    #[test]
    fn settings_file_feeds_the_configs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"port": 9200}, "hub": {"sendTimeoutMs": 250}}"#,
        )
        .unwrap();

        let settings = loader::load_settings_from_path(&path).unwrap();
        let cli = Cli::parse_from(["mevdash"]);
        assert_eq!(server_config(&settings, &cli).port, 9200);
        assert_eq!(
            hub_config(&settings).send_timeout,
            Duration::from_millis(250)
        );
    }

    #[tokio::test]
    async fn server_boots_and_responds() {
        let settings = MevdashSettings::default();
        let cli = Cli::parse_from(["mevdash", "--port", "0", "--host", "127.0.0.1"]);

        let hub = Arc::new(EventHub::new(hub_config(&settings)));
        let server = MevdashServer::new(server_config(&settings, &cli), Arc::clone(&hub));

        let (addr, handle) = server.listen().await.unwrap();

        let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        server.shutdown().shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn server_graceful_shutdown() {
        let settings = MevdashSettings::default();
        let cli = Cli::parse_from(["mevdash", "--port", "0"]);

        let hub = Arc::new(EventHub::new(hub_config(&settings)));
        let server = MevdashServer::new(server_config(&settings, &cli), hub);
        let (_, handle) = server.listen().await.unwrap();

        let coordinator = server.shutdown();
        tokio::time::timeout(
            Duration::from_secs(5),
            coordinator.graceful_shutdown(vec![handle], None),
        )
        .await
        .expect("shutdown timed out");
    }
}
