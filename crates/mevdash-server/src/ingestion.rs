//! HTTP ingestion endpoints feeding the hub.
//!
//! The engine posts here over localhost. `/api/events` takes a fully
//! specified event; the `/api/data-ingestion/*` routes pin the topic and
//! event type so producers only ship a payload.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde_json::{json, Value};
use tracing::debug;

use mevdash_events::{topics, RawEvent};
use mevdash_hub::IngestError;

use crate::server::AppState;

/// POST `/api/events`
pub async fn ingest_event(State(state): State<AppState>, Json(raw): Json<RawEvent>) -> Response {
    dispatch(&state, raw, "events", "Event ingested").await
}

/// POST `/api/data-ingestion/transaction`
pub async fn ingest_transaction(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let raw = RawEvent::new(topics::TRANSACTIONS, "transaction", payload);
    dispatch(&state, raw, "transaction", "Transaction ingested").await
}

/// POST `/api/data-ingestion/opportunity`
pub async fn ingest_opportunity(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let raw = RawEvent::new(topics::DASHBOARD, "opportunity", payload);
    dispatch(&state, raw, "opportunity", "Opportunity ingested").await
}

/// POST `/api/data-ingestion/metrics`
pub async fn ingest_metrics(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let raw = RawEvent::new(topics::DASHBOARD, "metrics", payload);
    dispatch(&state, raw, "metrics", "Metrics ingested").await
}

/// POST `/api/data-ingestion/training`
pub async fn ingest_training(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Response {
    let raw = RawEvent::new(topics::ML_TRAINING, "training_progress", payload);
    dispatch(&state, raw, "training", "Training progress ingested").await
}

async fn dispatch(
    state: &AppState,
    raw: RawEvent,
    endpoint: &'static str,
    status: &str,
) -> Response {
    counter!("ingest_requests_total", "endpoint" => endpoint).increment(1);

    match state.hub.ingest(raw).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(json!({"status": status, "delivered": outcome.delivered})),
        )
            .into_response(),
        Err(IngestError::MalformedEvent(reason)) => {
            debug!(reason, "rejected ingestion request");
            (StatusCode::BAD_REQUEST, Json(json!({"error": reason}))).into_response()
        }
    }
}
