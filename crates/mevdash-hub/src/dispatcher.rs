//! Best-effort fan-out of validated events to topic subscribers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, histogram};
use tracing::{debug, warn};

use mevdash_events::{Event, WireEnvelope};

use crate::errors::SendError;
use crate::registry::SubscriberRegistry;
use crate::session::SessionId;

/// Delivery tally for one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Subscribers whose sink accepted the frame.
    pub delivered: usize,
    /// Subscribers that failed, timed out, or closed mid-send.
    pub failed: usize,
}

/// Fans one event out to every subscriber of its topic.
///
/// The subscriber set is snapshotted before any send, so each live
/// subscriber receives at most one copy and registry mutations during the
/// fan-out affect later publishes only. Sends run concurrently and never
/// hold the registry lock.
pub struct BroadcastDispatcher {
    registry: Arc<dyn SubscriberRegistry>,
    send_timeout: Duration,
}

impl BroadcastDispatcher {
    /// Dispatcher delivering through `registry`, bounding each subscriber
    /// send by `send_timeout`.
    pub fn new(registry: Arc<dyn SubscriberRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// Per-subscriber send timeout.
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Deliver `event` to every current subscriber of its topic.
    ///
    /// Failures are isolated per subscriber; a failing or timed-out session
    /// is unregistered after the fan-out completes. Publishing to a topic
    /// with no subscribers is a no-op.
    pub async fn publish(&self, event: &Event) -> PublishOutcome {
        let start = Instant::now();
        let subscribers = self.registry.subscribers(&event.topic);
        if subscribers.is_empty() {
            debug!(topic = %event.topic, "no subscribers, dropping event");
            return PublishOutcome::default();
        }

        let envelope = WireEnvelope::from_event(event);
        let frame = match serde_json::to_string(&envelope) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                warn!(topic = %event.topic, error = %e, "failed to serialize event");
                return PublishOutcome::default();
            }
        };

        debug!(
            topic = %event.topic,
            event_type = %event.event_type,
            subscribers = subscribers.len(),
            "broadcasting event"
        );

        let timeout = self.send_timeout;
        let sends = subscribers.iter().map(|session| {
            let frame = Arc::clone(&frame);
            async move { (session, session.send(frame, timeout).await) }
        });

        let mut outcome = PublishOutcome::default();
        let mut evict: Vec<SessionId> = Vec::new();

        for (session, result) in join_all(sends).await {
            match result {
                Ok(()) => outcome.delivered += 1,
                Err(SendError::SessionClosed) => {
                    // Lost the race with an unregister; the session is
                    // already being cleaned up.
                    outcome.failed += 1;
                }
                Err(e) => {
                    warn!(
                        session_id = %session.id(),
                        topic = %event.topic,
                        error = %e,
                        "send failed, evicting subscriber"
                    );
                    outcome.failed += 1;
                    evict.push(session.id().clone());
                }
            }
        }

        for id in &evict {
            self.registry.unregister(id);
        }

        counter!("hub_broadcast_deliveries_total").increment(outcome.delivered as u64);
        counter!("hub_broadcast_failures_total").increment(outcome.failed as u64);
        histogram!("hub_publish_duration_seconds").record(start.elapsed().as_secs_f64());

        outcome
    }
}
