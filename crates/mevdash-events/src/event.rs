//! Event types flowing from the ingestion boundary out to subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event as submitted to the ingestion boundary, before validation.
///
/// `event_type` is `None` both when the field is absent and when it is
/// explicitly `null`; validation treats the two identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Destination topic.
    #[serde(default)]
    pub topic: String,
    /// Declared event type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Opaque body forwarded to subscribers unchanged.
    #[serde(default)]
    pub payload: Value,
}

impl RawEvent {
    /// Raw event with all fields populated.
    pub fn new(topic: impl Into<String>, event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            event_type: Some(event_type.into()),
            payload,
        }
    }
}

/// Event that passed validation and is bound for a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Destination topic.
    pub topic: String,
    /// Recognized event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Opaque body forwarded to subscribers unchanged.
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    /// Event bound for `topic`.
    pub fn new(topic: impl Into<String>, event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Outbound frame delivered to subscribers as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// Event type, named `type` on the wire.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event body.
    pub data: Value,
}

impl WireEnvelope {
    /// Envelope carrying `data` under `event_type`.
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Envelope for `event`. The topic is routing metadata and is not
    /// part of the frame.
    pub fn from_event(event: &Event) -> Self {
        Self {
            event_type: event.event_type.clone(),
            data: event.payload.clone(),
        }
    }
}

impl From<Event> for WireEnvelope {
    fn from(event: Event) -> Self {
        Self {
            event_type: event.event_type,
            data: event.payload,
        }
    }
}
