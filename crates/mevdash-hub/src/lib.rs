//! # mevdash-hub
//!
//! Real-time event distribution core:
//!
//! - [`TopicRegistry`]: session bookkeeping, at most one topic per session
//! - [`ConnectionSession`]: per-subscriber delivery handle and lifecycle state
//! - [`BroadcastDispatcher`]: best-effort fan-out with per-send timeouts
//! - [`EventHub`]: ingestion entrypoint tying validation to dispatch
//!
//! The registry is owned explicitly and passed around by `Arc`; there is no
//! process-global broker.

#![deny(unsafe_code)]

pub mod dispatcher;
pub mod errors;
pub mod hub;
pub mod registry;
pub mod session;

pub use dispatcher::{BroadcastDispatcher, PublishOutcome};
pub use errors::{IngestError, RegisterError, SendError};
pub use hub::{EventHub, HubConfig};
pub use registry::{SubscriberRegistry, TopicRegistry};
pub use session::{ConnectionSession, EventSink, SessionId, SessionState};
