//! Dead-letter path for messages that can never succeed.
//!
//! Malformed payloads (schema violations) must not be retried indefinitely:
//! the consumer routes them here for inspection instead of poisoning the queue.

use std::sync::Mutex;

use crate::envelope::MessageEnvelope;

/// A parked message together with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetteredMessage {
    pub envelope: MessageEnvelope,
    pub reason: String,
}

/// Sink for undeliverable messages.
pub trait DeadLetterSink: Send + Sync {
    fn park(&self, envelope: MessageEnvelope, reason: String);
}

/// In-memory dead-letter sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDeadLetterSink {
    parked: Mutex<Vec<DeadLetteredMessage>>,
}

impl InMemoryDeadLetterSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything parked so far.
    pub fn drain_snapshot(&self) -> Vec<DeadLetteredMessage> {
        self.parked
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.parked.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DeadLetterSink for InMemoryDeadLetterSink {
    fn park(&self, envelope: MessageEnvelope, reason: String) {
        if let Ok(mut guard) = self.parked.lock() {
            guard.push(DeadLetteredMessage { envelope, reason });
        }
    }
}
