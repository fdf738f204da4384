//! Server configuration.

use serde::{Deserialize, Serialize};

/// Network and per-connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port. Port 0 asks the OS for a free one.
    pub port: u16,
    /// Maximum number of concurrent subscriber sessions.
    pub max_connections: usize,
    /// Interval between heartbeat pings.
    pub heartbeat_interval_secs: u64,
    /// Drop a client that has answered nothing for this long.
    pub heartbeat_timeout_secs: u64,
    /// Outbound frame queue capacity per session.
    pub session_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_connections: 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            session_queue_capacity: 256,
        }
    }
}
