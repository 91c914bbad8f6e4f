//! Integration events and the transport-agnostic plumbing that carries them
//! between the proposal service and the contracting service.

pub mod bus;
pub mod dead_letter;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod integration;

pub use bus::{EventBus, Subscription};
pub use dead_letter::{DeadLetterSink, DeadLetteredMessage, InMemoryDeadLetterSink};
pub use envelope::{EnvelopeError, MessageEnvelope};
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
pub use integration::ProposalApproved;
