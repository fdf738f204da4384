//! Error types for registration, delivery, and ingestion.

use thiserror::Error;

use crate::session::SessionId;

/// Errors from registering a session under a topic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The id is already live under some topic. The registry is unchanged.
    #[error("session {0} is already registered")]
    DuplicateSession(SessionId),

    /// The session was torn down before registration completed.
    #[error("session {0} is closed")]
    SessionClosed(SessionId),
}

/// Errors from delivering one frame to one subscriber.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The session is not open. Sends fail fast without touching the sink.
    #[error("session is closed")]
    SessionClosed,

    /// The transport rejected the frame.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// The send did not complete within the configured timeout.
    #[error("send timed out")]
    Timeout,
}

/// Errors from the ingestion entrypoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The event is missing a topic or carries an unrecognized type.
    /// Rejected events never reach the dispatcher.
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}
