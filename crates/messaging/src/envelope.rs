use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use crate::event::Event;

/// Failure to wrap a typed event into an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("payload serialization failed: {0}")]
    Serialize(String),
}

/// Envelope for an integration event in transit.
///
/// The payload is schema-agnostic JSON so the bus makes no assumptions about
/// consumer types; `event_type`/`event_version` let consumers route and decode.
///
/// `message_id` is **transport-level** identity: a redelivery carries a fresh
/// one. Consumers must never key idempotency on it; the business correlation
/// key inside the payload is the only safe dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    message_id: Uuid,
    event_type: String,
    event_version: u32,
    occurred_at: DateTime<Utc>,
    payload: JsonValue,
}

impl MessageEnvelope {
    /// Wrap a typed event, capturing its metadata for later decoding.
    pub fn from_typed<E>(event: &E) -> Result<Self, EnvelopeError>
    where
        E: Event + Serialize,
    {
        let payload =
            serde_json::to_value(event).map_err(|e| EnvelopeError::Serialize(e.to_string()))?;

        Ok(Self {
            message_id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }

    /// Clone this message as a broker redelivery: same fact, new `message_id`.
    pub fn redelivery(&self) -> Self {
        Self {
            message_id: Uuid::now_v7(),
            ..self.clone()
        }
    }

    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }
}
