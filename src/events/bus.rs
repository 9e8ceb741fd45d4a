//! Event channel

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Notification that an object was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key
    pub key: String,
}

impl StorageEvent {
    /// Create a new event
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Factory for connected publisher/receiver pairs
pub struct EventBus;

impl EventBus {
    /// Create an unbounded channel
    ///
    /// Unbounded so that publishing never blocks or fails while the
    /// consumer is alive.
    pub fn unbounded() -> (EventPublisher, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let publisher = EventPublisher {
            tx,
            published: Arc::new(AtomicU64::new(0)),
        };
        (publisher, EventReceiver { rx })
    }
}

/// Sending half; cheap to clone
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<StorageEvent>,
    published: Arc<AtomicU64>,
}

impl EventPublisher {
    /// Enqueue an event without waiting for it to be handled
    pub fn publish(&self, event: StorageEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::EventChannelClosed)?;
        self.published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Whether the consumer has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Total events enqueued through any clone of this publisher
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

/// Receiving half
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<StorageEvent>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once every publisher is dropped
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        self.rx.recv().await
    }

    /// Take an event if one is queued
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        self.rx.try_recv().ok()
    }
}
