//! `/health` endpoint.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::server::AppState;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the server is answering.
    pub status: String,
    /// Seconds since the server was created.
    pub uptime_secs: u64,
    /// Live subscriber sessions across all topics.
    pub active_sessions: usize,
    /// Topics that currently have at least one subscriber.
    pub topics: Vec<String>,
}

/// Build a health response from live counters.
pub fn health_check(
    start_time: Instant,
    active_sessions: usize,
    topics: Vec<String>,
) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        uptime_secs: start_time.elapsed().as_secs(),
        active_sessions,
        topics,
    }
}

/// GET `/health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_check(
        state.start_time,
        state.hub.active_sessions(),
        state.hub.topic_names(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_server_reports_ok() {
        let resp = health_check(Instant::now(), 0, Vec::new());
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.uptime_secs, 0);
        assert_eq!(resp.active_sessions, 0);
        assert!(resp.topics.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let resp = health_check(
            Instant::now(),
            3,
            vec!["dashboard".to_string(), "transactions".to_string()],
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["activeSessions"], 3);
        assert_eq!(json["topics"][1], "transactions");
        assert!(json.get("active_sessions").is_none());
    }

    #[test]
    fn uptime_counts_from_start_time() {
        let started = Instant::now() - std::time::Duration::from_secs(42);
        let resp = health_check(started, 0, Vec::new());
        assert!(resp.uptime_secs >= 42);
    }
}
