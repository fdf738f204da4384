//! Per-connection session runner.
//!
//! Each accepted socket gets one `run_ws_session` call that:
//! 1. registers the session with the hub, rejecting duplicate ids,
//! 2. sends the `connection.established` greeting,
//! 3. pumps hub frames and heartbeat pings from a writer task,
//! 4. reads client frames for liveness until the socket or hub closes,
//! 5. unregisters the session and records connection metrics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, histogram};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use mevdash_hub::SessionId;

use crate::server::AppState;
use crate::websocket::WsSink;

/// Pong bookkeeping shared between the read and write halves.
struct Liveness {
    responsive: AtomicBool,
    last_seen: parking_lot::Mutex<Instant>,
}

impl Liveness {
    fn new() -> Self {
        Self {
            responsive: AtomicBool::new(true),
            last_seen: parking_lot::Mutex::new(Instant::now()),
        }
    }

    fn mark_alive(&self) {
        self.responsive.store(true, Ordering::Release);
        *self.last_seen.lock() = Instant::now();
    }

    /// Consume the responsiveness flag; any inbound frame re-arms it.
    fn check_alive(&self) -> bool {
        self.responsive.swap(false, Ordering::AcqRel)
    }

    fn silent_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }
}

/// Drive one subscriber connection to completion.
#[instrument(skip_all, fields(session_id = %session_id, topic = %topic))]
pub async fn run_ws_session(ws: WebSocket, topic: String, session_id: SessionId, state: AppState) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (sink, mut frames) = WsSink::new(state.config.session_queue_capacity);
    let session = match state
        .hub
        .open(topic.clone(), session_id.clone(), Arc::new(sink))
    {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "refusing subscription");
            let _ = ws_tx
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: e.to_string().into(),
                })))
                .await;
            return;
        }
    };

    counter!("ws_connections_total").increment(1);
    info!("client connected");
    let connected_at = Instant::now();

    let greeting = json!({
        "type": "connection.established",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "data": {
            "sessionId": session_id.as_str(),
            "topic": topic,
        },
    });
    match serde_json::to_string(&greeting) {
        Ok(text) => {
            let _ = ws_tx.send(Message::Text(text.into())).await;
        }
        Err(e) => warn!(error = %e, "failed to serialize greeting"),
    }

    let liveness = Arc::new(Liveness::new());

    let ping_every = Duration::from_secs(state.config.heartbeat_interval_secs);
    let silence_limit = Duration::from_secs(state.config.heartbeat_timeout_secs);
    let writer_liveness = Arc::clone(&liveness);
    let writer_cancel = session.cancel_token();
    let writer_shutdown = state.shutdown.token();

    let writer = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_every);
        // The first tick fires immediately; skip it.
        let _ = ping.tick().await;

        loop {
            tokio::select! {
                frame = frames.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(frame.as_str().into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if !writer_liveness.check_alive()
                        && writer_liveness.silent_for() > silence_limit
                    {
                        warn!("client silent past {silence_limit:?}, dropping connection");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                () = writer_cancel.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                () = writer_shutdown.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let reader_cancel = session.cancel_token();
    let reader_shutdown = state.shutdown.token();
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Close(_) => {
                        debug!("client sent close frame");
                        break;
                    }
                    Message::Ping(_) | Message::Pong(_) => liveness.mark_alive(),
                    Message::Text(_) | Message::Binary(_) => {
                        // Subscriptions are one-way; inbound data only proves
                        // the client is still there.
                        liveness.mark_alive();
                    }
                }
            }
            () = reader_cancel.cancelled() => break,
            () = reader_shutdown.cancelled() => break,
        }
    }

    state.hub.close(&session_id);
    counter!("ws_disconnections_total").increment(1);
    histogram!("ws_connection_duration_seconds").record(connected_at.elapsed().as_secs_f64());
    info!(
        delivered = session.delivered(),
        failed = session.failed(),
        "client disconnected"
    );
    writer.abort();
}
