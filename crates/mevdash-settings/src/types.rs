//! Settings schema: server, hub, and logging sections.

use serde::{Deserialize, Serialize};

use mevdash_events::DEFAULT_EVENT_TYPES;

/// Root settings document persisted at `~/.mevdash/settings.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MevdashSettings {
    /// Settings schema version.
    pub version: String,
    /// HTTP and WebSocket server settings.
    pub server: ServerSettings,
    /// Event hub settings.
    pub hub: HubSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for MevdashSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            server: ServerSettings::default(),
            hub: HubSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Server network and connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port. `0` picks a random free port.
    pub port: u16,
    /// Maximum number of concurrent WebSocket connections.
    pub max_connections: usize,
    /// WebSocket ping interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Seconds without a pong before a connection is considered dead.
    pub heartbeat_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_connections: 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
        }
    }
}

/// Event hub settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubSettings {
    /// Upper bound on one subscriber send, in milliseconds.
    pub send_timeout_ms: u64,
    /// Outbound frames buffered per session before sends start timing out.
    pub session_queue_capacity: usize,
    /// Event types the ingestion API accepts.
    pub event_types: Vec<String>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            send_timeout_ms: 5_000,
            session_queue_capacity: 256,
            event_types: DEFAULT_EVENT_TYPES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level emitted.
    pub level: LogLevel,
}

/// Log verbosity level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level (most verbose).
    Trace,
    /// Debug-level.
    Debug,
    /// Info-level (default).
    #[default]
    Info,
    /// Warning-level.
    Warn,
    /// Error-level (least verbose).
    Error,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let server = ServerSettings::default();
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8000);
        assert_eq!(server.max_connections, 1024);
        assert_eq!(server.heartbeat_interval_secs, 30);
        assert_eq!(server.heartbeat_timeout_secs, 90);
    }

    #[test]
    fn hub_defaults() {
        let hub = HubSettings::default();
        assert_eq!(hub.send_timeout_ms, 5_000);
        assert_eq!(hub.session_queue_capacity, 256);
        assert_eq!(hub.event_types.len(), DEFAULT_EVENT_TYPES.len());
        assert!(hub.event_types.iter().any(|t| t == "transaction"));
    }

    #[test]
    fn logging_defaults_to_info() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, LogLevel::Info);
        assert_eq!(logging.level.as_filter_str(), "info");
    }

    #[test]
    fn settings_serialize_camel_case() {
        let settings = MevdashSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json["server"]["maxConnections"].is_number());
        assert!(json["hub"]["sendTimeoutMs"].is_number());
        assert!(json["hub"]["eventTypes"].is_array());
        assert_eq!(json["logging"]["level"], "info");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: MevdashSettings =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.hub.send_timeout_ms, 5_000);
    }

    #[test]
    fn log_level_parses_lowercase() {
        let level: LogLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(serde_json::from_str::<LogLevel>(r#""verbose""#).is_err());
    }
}
