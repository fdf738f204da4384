//! Prometheus metrics recorder and `/metrics` endpoint handler.

use axum::extract::State;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::server::AppState;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// GET `/metrics`
///
/// Renders Prometheus text format, or an empty body when no recorder
/// handle was attached to the server.
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state
        .prometheus
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

// Metric name constants to avoid typos across crates.

/// Events accepted by ingestion (counter).
pub const HUB_EVENTS_INGESTED_TOTAL: &str = "hub_events_ingested_total";
/// Events rejected as malformed (counter).
pub const HUB_EVENTS_REJECTED_TOTAL: &str = "hub_events_rejected_total";
/// Frames handed to subscriber sinks (counter).
pub const HUB_BROADCAST_DELIVERIES_TOTAL: &str = "hub_broadcast_deliveries_total";
/// Frames that failed to reach a subscriber (counter).
pub const HUB_BROADCAST_FAILURES_TOTAL: &str = "hub_broadcast_failures_total";
/// Live subscriber sessions (gauge).
pub const HUB_SESSIONS_ACTIVE: &str = "hub_sessions_active";
/// Time spent fanning out one event (histogram).
pub const HUB_PUBLISH_DURATION_SECONDS: &str = "hub_publish_duration_seconds";
/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// WebSocket connection lifetime (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Ingestion requests received, any outcome (counter, labels: endpoint).
pub const INGEST_REQUESTS_TOTAL: &str = "ingest_requests_total";
