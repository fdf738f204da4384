//! Topic registry: which session is subscribed to which topic.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::gauge;
use parking_lot::RwLock;
use tracing::debug;

use crate::errors::RegisterError;
use crate::session::{ConnectionSession, SessionId};

/// Registry contract consumed by the hub and the dispatcher.
///
/// Implementations serialize all mutations so registration order is total
/// and duplicate ids are caught across every topic.
pub trait SubscriberRegistry: Send + Sync {
    /// Register `session` under its topic and open it.
    ///
    /// Fails with `DuplicateSession` when the id is live under any topic
    /// and with `SessionClosed` when the session was torn down before
    /// registration. Either way the registry is left unchanged.
    fn register(&self, session: Arc<ConnectionSession>) -> Result<(), RegisterError>;

    /// Remove `id` wherever it is registered and close its session.
    /// Unknown ids are a no-op; repeating the call is safe.
    fn unregister(&self, id: &SessionId);

    /// Point-in-time snapshot of the sessions under `topic`, in
    /// registration order. Later mutations do not affect the snapshot.
    fn subscribers(&self, topic: &str) -> Vec<Arc<ConnectionSession>>;

    /// Number of live sessions across all topics.
    fn session_count(&self) -> usize;

    /// Topics that currently have at least one subscriber.
    fn topic_names(&self) -> Vec<String>;

    /// Close every session and empty the registry. Returns how many
    /// sessions were closed.
    fn drain(&self) -> usize;
}

#[derive(Default)]
struct Inner {
    /// Sessions per topic, in registration order.
    topics: HashMap<String, Vec<Arc<ConnectionSession>>>,
    /// Reverse index for duplicate detection across topics.
    index: HashMap<SessionId, String>,
}

/// In-memory registry guarding all state behind one lock.
pub struct TopicRegistry {
    inner: RwLock<Inner>,
}

impl TopicRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.inner.read().index.contains_key(id)
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberRegistry for TopicRegistry {
    fn register(&self, session: Arc<ConnectionSession>) -> Result<(), RegisterError> {
        let mut inner = self.inner.write();

        // Duplicate check comes first so a rejected register leaves the
        // session's own state untouched as well.
        if inner.index.contains_key(session.id()) {
            return Err(RegisterError::DuplicateSession(session.id().clone()));
        }
        if !session.mark_open() {
            return Err(RegisterError::SessionClosed(session.id().clone()));
        }

        let topic = session.topic().to_string();
        let _ = inner.index.insert(session.id().clone(), topic.clone());
        debug!(session_id = %session.id(), topic, "session registered");
        inner.topics.entry(topic).or_default().push(session);

        gauge!("hub_sessions_active").increment(1.0);
        Ok(())
    }

    fn unregister(&self, id: &SessionId) {
        let removed = {
            let mut inner = self.inner.write();
            let Some(topic) = inner.index.remove(id) else {
                return;
            };

            let mut removed = None;
            if let Some(sessions) = inner.topics.get_mut(&topic) {
                if let Some(pos) = sessions.iter().position(|s| s.id() == id) {
                    removed = Some(sessions.remove(pos));
                }
                if sessions.is_empty() {
                    let _ = inner.topics.remove(&topic);
                }
            }
            removed
        };

        // Close outside the lock; cancellation must not block other
        // registry callers.
        if let Some(session) = removed {
            session.begin_close();
            session.finish_close();
            gauge!("hub_sessions_active").decrement(1.0);
            debug!(session_id = %id, topic = session.topic(), "session unregistered");
        }
    }

    fn subscribers(&self, topic: &str) -> Vec<Arc<ConnectionSession>> {
        self.inner
            .read()
            .topics
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    fn session_count(&self) -> usize {
        self.inner.read().index.len()
    }

    fn topic_names(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut names: Vec<String> = inner.topics.keys().cloned().collect();
        names.sort();
        names
    }

    fn drain(&self) -> usize {
        let sessions: Vec<Arc<ConnectionSession>> = {
            let mut inner = self.inner.write();
            inner.index.clear();
            inner.topics.drain().flat_map(|(_, list)| list).collect()
        };

        for session in &sessions {
            session.begin_close();
            session.finish_close();
        }
        gauge!("hub_sessions_active").set(0.0);
        debug!(count = sessions.len(), "registry drained");
        sessions.len()
    }
}
