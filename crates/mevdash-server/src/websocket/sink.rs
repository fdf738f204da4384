//! Bridge between the hub's delivery trait and the socket writer task.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use mevdash_hub::{EventSink, SendError};

/// Sink half of a subscriber session.
///
/// `deliver` hands frames to the writer task over a bounded queue.
/// Waiting for queue space is what the dispatcher's send timeout bounds,
/// so a slow client stalls only its own deliveries.
#[derive(Debug, Clone)]
pub struct WsSink {
    tx: mpsc::Sender<Arc<String>>,
}

impl WsSink {
    /// Create a sink and the receiver its writer task drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for WsSink {
    async fn deliver(&self, frame: Arc<String>) -> Result<(), SendError> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| SendError::DeliveryFailed("connection writer gone".to_string()))
    }
}
