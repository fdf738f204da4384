//! Axum server wiring: shared state, routes, and the listen loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use mevdash_hub::EventHub;

use crate::config::ServerConfig;
use crate::health::health_handler;
use crate::ingestion;
use crate::metrics::metrics_handler;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::ws_handler;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Event hub owning the topic registry and dispatcher.
    pub hub: Arc<EventHub>,
    /// Shutdown coordinator; session tasks watch its token.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server settings (heartbeats, capacity limits).
    pub config: Arc<ServerConfig>,
    /// Prometheus render handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
    /// Server creation time, for uptime reporting.
    pub start_time: Instant,
}

/// HTTP and WebSocket server around one [`EventHub`].
pub struct MevdashServer {
    config: ServerConfig,
    state: AppState,
}

impl MevdashServer {
    /// Create a server around an existing hub.
    pub fn new(config: ServerConfig, hub: Arc<EventHub>) -> Self {
        let state = AppState {
            hub,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            config: Arc::new(config.clone()),
            prometheus: None,
            start_time: Instant::now(),
        };
        Self { config, state }
    }

    /// Attach a Prometheus handle so `/metrics` renders real output.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.state.prometheus = Some(handle);
        self
    }

    /// The hub this server feeds.
    pub fn hub(&self) -> Arc<EventHub> {
        Arc::clone(&self.state.hub)
    }

    /// Shutdown coordinator shared with the serve loop and sessions.
    pub fn shutdown(&self) -> Arc<ShutdownCoordinator> {
        Arc::clone(&self.state.shutdown)
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws/{topic}", get(ws_handler))
            .route("/api/events", post(ingestion::ingest_event))
            .route(
                "/api/data-ingestion/transaction",
                post(ingestion::ingest_transaction),
            )
            .route(
                "/api/data-ingestion/opportunity",
                post(ingestion::ingest_opportunity),
            )
            .route(
                "/api/data-ingestion/metrics",
                post(ingestion::ingest_metrics),
            )
            .route(
                "/api/data-ingestion/training",
                post(ingestion::ingest_training),
            )
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// Returns the bound address and the serve task handle. The task ends
    /// after the shutdown token fires and open connections have drained.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "server listening");

        let router = self.router();
        let token = self.state.shutdown.token();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server stopped with error");
            }
        });

        Ok((local_addr, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use mevdash_events::RawEvent;
    use mevdash_hub::HubConfig;

    fn make_server() -> MevdashServer {
        let hub = Arc::new(EventHub::new(HubConfig::default()));
        MevdashServer::new(ServerConfig::default(), hub)
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_route_reports_hub_state() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["activeSessions"], 0);
        assert_eq!(body["topics"], json!([]));
    }

    #[tokio::test]
    async fn metrics_route_is_empty_without_recorder() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let server = make_server();
        let resp = server
            .router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_binds_an_ephemeral_port_and_drains_on_shutdown() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();
        assert_ne!(addr.port(), 0);

        server.shutdown().shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn health_over_a_real_socket() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();

        let body: Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");

        server.shutdown().shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn websocket_end_to_end_delivery() {
        let server = make_server();
        let hub = server.hub();
        let (addr, handle) = server.listen().await.unwrap();

        let url = format!("ws://{addr}/ws/transactions?session=sess_e2e");
        let (mut ws, _resp) = tokio_tungstenite::connect_async(&url).await.unwrap();

        // Greeting arrives before any event.
        let greeting = ws.next().await.unwrap().unwrap();
        let greeting: Value = serde_json::from_str(greeting.to_text().unwrap()).unwrap();
        assert_eq!(greeting["type"], "connection.established");
        assert_eq!(greeting["data"]["sessionId"], "sess_e2e");
        assert_eq!(greeting["data"]["topic"], "transactions");

        let outcome = hub
            .ingest(RawEvent::new("transactions", "transaction", json!({"sig": "abc"})))
            .await
            .unwrap();
        assert_eq!(outcome.delivered, 1);

        let frame = ws.next().await.unwrap().unwrap();
        let value: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
        assert_eq!(value, json!({"type": "transaction", "data": {"sig": "abc"}}));

        // After the client leaves, the session is reaped and later events
        // simply have no subscriber.
        ws.close(None).await.unwrap();
        for _ in 0..100 {
            if hub.active_sessions() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(hub.active_sessions(), 0);

        let outcome = hub
            .ingest(RawEvent::new("transactions", "transaction", json!({"sig": "def"})))
            .await
            .unwrap();
        assert_eq!(outcome.delivered, 0);

        server.shutdown().shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_session_id_gets_a_close_frame() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();

        let url = format!("ws://{addr}/ws/transactions?session=sess_dup");
        let (mut first, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        let _greeting = first.next().await.unwrap().unwrap();

        let (mut second, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        let msg = second.next().await.unwrap().unwrap();
        assert!(msg.is_close(), "expected close frame, got {msg:?}");

        // The original session is untouched.
        assert_eq!(server.hub().active_sessions(), 1);

        first.close(None).await.unwrap();
        server.shutdown().shutdown();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_disconnects_open_sessions() {
        let server = make_server();
        let (addr, handle) = server.listen().await.unwrap();

        let url = format!("ws://{addr}/ws/dashboard");
        let (mut ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        let _greeting = ws.next().await.unwrap().unwrap();

        server.shutdown().shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        // The server side closed; the client sees the stream end.
        loop {
            match ws.next().await {
                None => break,
                Some(Ok(msg)) if msg.is_close() => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            }
        }
        let _ = ws.close(None).await;
    }
}
