//! HTTP and WebSocket surface for the mevdash event hub.
//!
//! Routes:
//! - `POST /api/events` plus the fixed `/api/data-ingestion/*` routes, which
//!   feed events into the hub
//! - `GET /ws/{topic}` for subscriber sessions
//! - `GET /health` and `GET /metrics` for operations
//!
//! The server owns no event state of its own; everything flows through the
//! [`mevdash_hub::EventHub`] it is constructed around.

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod ingestion;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::{AppState, MevdashServer};
pub use shutdown::ShutdownCoordinator;
