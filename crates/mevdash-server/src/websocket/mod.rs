//! WebSocket subscription endpoint.
//!
//! `GET /ws/{topic}` upgrades the connection and attaches it to the hub
//! under the requested topic. The optional `session` query parameter pins
//! the session id; one is generated when it is absent.

mod session;
mod sink;

pub use session::run_ws_session;
pub use sink::WsSink;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use tracing::warn;

use mevdash_hub::SessionId;

use crate::server::AppState;

/// Query parameters accepted by the subscription endpoint.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Client-chosen session id. Generated when absent.
    pub session: Option<String>,
}

/// GET `/ws/{topic}`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(topic): Path<String>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<Response, StatusCode> {
    if state.hub.active_sessions() >= state.config.max_connections {
        warn!(topic, "connection limit reached, refusing upgrade");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let session_id = query.session.map_or_else(SessionId::generate, SessionId::from);

    Ok(ws.on_upgrade(move |socket| run_ws_session(socket, topic, session_id, state)))
}
