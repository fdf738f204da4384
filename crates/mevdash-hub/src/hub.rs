//! Ingestion entrypoint tying validation, the registry, and dispatch together.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, info};

use mevdash_events::{Event, EventTypeRegistry, RawEvent, DEFAULT_EVENT_TYPES};

use crate::dispatcher::{BroadcastDispatcher, PublishOutcome};
use crate::errors::{IngestError, RegisterError};
use crate::registry::{SubscriberRegistry, TopicRegistry};
use crate::session::{ConnectionSession, EventSink, SessionId};

/// Tunables for the hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Upper bound on one subscriber send.
    pub send_timeout: Duration,
    /// Event types accepted at ingestion.
    pub event_types: Vec<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(5),
            event_types: DEFAULT_EVENT_TYPES.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Facade over the topic registry and the broadcast dispatcher.
///
/// The registry is owned here and shared with the dispatcher by `Arc`;
/// callers interact only through `open`, `close`, and `ingest`.
pub struct EventHub {
    registry: Arc<dyn SubscriberRegistry>,
    dispatcher: BroadcastDispatcher,
    event_types: EventTypeRegistry,
}

impl EventHub {
    /// Hub backed by a fresh in-memory registry.
    pub fn new(config: HubConfig) -> Self {
        Self::with_registry(Arc::new(TopicRegistry::new()), config)
    }

    /// Hub backed by an externally owned registry.
    pub fn with_registry(registry: Arc<dyn SubscriberRegistry>, config: HubConfig) -> Self {
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry), config.send_timeout);
        Self {
            registry,
            dispatcher,
            event_types: EventTypeRegistry::with_types(config.event_types),
        }
    }

    /// Open a session delivering to `sink` for events on `topic`.
    ///
    /// The returned handle is registered and live; `id` is rejected when it
    /// is already in use under any topic.
    pub fn open(
        &self,
        topic: impl Into<String>,
        id: SessionId,
        sink: Arc<dyn EventSink>,
    ) -> Result<Arc<ConnectionSession>, RegisterError> {
        let session = Arc::new(ConnectionSession::new(id, topic, sink));
        self.registry.register(Arc::clone(&session))?;
        info!(session_id = %session.id(), topic = session.topic(), "session opened");
        Ok(session)
    }

    /// Close and unregister `id`. Closing an absent or already-closed
    /// session is a no-op.
    pub fn close(&self, id: &SessionId) {
        self.registry.unregister(id);
    }

    /// Validate one raw event and fan it out to its topic.
    ///
    /// Rejected events cause no registry or dispatcher activity.
    pub async fn ingest(&self, raw: RawEvent) -> Result<PublishOutcome, IngestError> {
        let event = match self.validate(raw) {
            Ok(event) => event,
            Err(e) => {
                counter!("hub_events_rejected_total").increment(1);
                debug!(error = %e, "rejected malformed event");
                return Err(e);
            }
        };

        counter!("hub_events_ingested_total").increment(1);
        Ok(self.dispatcher.publish(&event).await)
    }

    /// Accept a new event type at runtime. Returns `false` if it was
    /// already recognized.
    pub fn register_event_type(&self, event_type: impl Into<String>) -> bool {
        self.event_types.register(event_type)
    }

    /// The set of event types ingestion accepts.
    pub fn event_types(&self) -> &EventTypeRegistry {
        &self.event_types
    }

    /// Number of live sessions across all topics.
    pub fn active_sessions(&self) -> usize {
        self.registry.session_count()
    }

    /// Topics that currently have at least one subscriber.
    pub fn topic_names(&self) -> Vec<String> {
        self.registry.topic_names()
    }

    /// Close every session. Returns how many were closed.
    pub fn drain(&self) -> usize {
        self.registry.drain()
    }

    fn validate(&self, raw: RawEvent) -> Result<Event, IngestError> {
        if raw.topic.is_empty() {
            return Err(IngestError::MalformedEvent("topic must not be empty".into()));
        }
        let Some(event_type) = raw.event_type else {
            return Err(IngestError::MalformedEvent("missing event type".into()));
        };
        if !self.event_types.contains(&event_type) {
            return Err(IngestError::MalformedEvent(format!(
                "unrecognized event type: {event_type}"
            )));
        }
        Ok(Event {
            topic: raw.topic,
            event_type,
            payload: raw.payload,
        })
    }
}
