//! Per-subscriber session: identity, lifecycle state, and the delivery path.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::SendError;

/// Unique identifier for a subscriber session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an externally supplied id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id of the form `sess_<uuid>`.
    pub fn generate() -> Self {
        Self(format!("sess_{}", uuid::Uuid::now_v7()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle states of a session. Transitions never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Transport accepted, not yet registered under a topic.
    Connecting = 0,
    /// Registered and eligible for delivery.
    Open = 1,
    /// Unregistration in progress; in-flight sends are being cancelled.
    Closing = 2,
    /// Fully torn down. Terminal.
    Closed = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Transport-facing half of a session.
///
/// The dispatcher serializes each event once and hands every subscriber the
/// same shared frame. Implementations enqueue or write the frame; a sink that
/// stalls is bounded by the dispatcher's per-send timeout.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one serialized frame to the subscriber.
    async fn deliver(&self, frame: Arc<String>) -> Result<(), SendError>;
}

/// State and delivery endpoint for one subscriber.
///
/// Lifecycle moves only through [`TopicRegistry`](crate::registry::TopicRegistry)
/// registration and unregistration; the session itself only reads its state.
pub struct ConnectionSession {
    id: SessionId,
    topic: String,
    state: AtomicU8,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
    delivered: AtomicU64,
    failed: AtomicU64,
    connected_at: Instant,
}

impl ConnectionSession {
    /// Create a session in the `Connecting` state.
    pub fn new(id: SessionId, topic: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            id,
            topic: topic.into(),
            state: AtomicU8::new(SessionState::Connecting as u8),
            sink,
            cancel: CancellationToken::new(),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            connected_at: Instant::now(),
        }
    }

    /// Session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Topic this session subscribes to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the session is eligible for delivery.
    pub fn is_open(&self) -> bool {
        self.state() == SessionState::Open
    }

    /// Token that fires when the session is being torn down. Transport
    /// loops select on this to exit when the hub closes the session.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Frames the sink accepted.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Sends that failed, timed out, or arrived after close.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Session age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Transition `Connecting` to `Open`. Fails if the session already
    /// moved past `Connecting`.
    pub(crate) fn mark_open(&self) -> bool {
        self.state
            .compare_exchange(
                SessionState::Connecting as u8,
                SessionState::Open as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Advance to `Closing` and cancel any in-flight send. Only this
    /// session's deliveries are affected.
    pub(crate) fn begin_close(&self) {
        let _ = self.state.fetch_max(SessionState::Closing as u8, Ordering::AcqRel);
        self.cancel.cancel();
    }

    /// Advance to the terminal `Closed` state.
    pub(crate) fn finish_close(&self) {
        let _ = self.state.fetch_max(SessionState::Closed as u8, Ordering::AcqRel);
    }

    /// Deliver one frame, bounded by `timeout`.
    ///
    /// Fails fast with `SessionClosed` unless the session is `Open`. An
    /// unregister landing mid-send cancels the delivery and surfaces as
    /// `SessionClosed` as well.
    pub async fn send(&self, frame: Arc<String>, timeout: Duration) -> Result<(), SendError> {
        if !self.is_open() {
            let _ = self.failed.fetch_add(1, Ordering::Relaxed);
            return Err(SendError::SessionClosed);
        }

        let result = tokio::select! {
            () = self.cancel.cancelled() => Err(SendError::SessionClosed),
            delivery = tokio::time::timeout(timeout, self.sink.deliver(frame)) => {
                match delivery {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SendError::Timeout),
                }
            }
        };

        match result {
            Ok(()) => {
                let _ = self.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                let _ = self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }
}

impl fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
