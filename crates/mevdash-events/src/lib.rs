//! # mevdash-events
//!
//! Event model shared by the ingestion API and the WebSocket fan-out:
//!
//! - [`RawEvent`]: body accepted at the ingestion boundary, before validation
//! - [`Event`]: validated event bound for a topic
//! - [`WireEnvelope`]: the `{"type": ..., "data": ...}` frame subscribers receive
//! - [`EventTypeRegistry`]: the set of event types ingestion accepts

#![deny(unsafe_code)]

pub mod event;
pub mod topics;
pub mod types;

pub use event::{Event, RawEvent, WireEnvelope};
pub use types::{EventTypeRegistry, DEFAULT_EVENT_TYPES};
