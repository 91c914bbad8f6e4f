//! Approval-event consumer for the contracting service.
//!
//! Delivery is at-least-once: the broker redelivers anything not acknowledged.
//! Idempotency is keyed on the **business** correlation id (`proposal_id`),
//! never on the transport message id, which differs across redeliveries.

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use underwrite_contracting::Contract;
use underwrite_messaging::{MessageEnvelope, ProposalApproved};

use crate::store::{ContractStore, InsertOutcome, StoreError};

/// What the worker should do with a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Processed (or confirmed as a pre-existing duplicate): acknowledge.
    Ack,
    /// Transient failure: do not acknowledge, let the broker redeliver.
    Retry,
    /// Permanently unprocessable (schema violation): park, never retry.
    DeadLetter(String),
}

/// Creates exactly one contract per distinct approved proposal.
#[derive(Debug)]
pub struct ApprovedProposalConsumer<S> {
    contracts: S,
}

impl<S> ApprovedProposalConsumer<S>
where
    S: ContractStore,
{
    pub fn new(contracts: S) -> Self {
        Self { contracts }
    }

    pub fn handle(&self, envelope: &MessageEnvelope) -> Disposition {
        if envelope.event_type() != ProposalApproved::EVENT_TYPE {
            // Not ours; acknowledge so the queue drains.
            return Disposition::Ack;
        }

        let event = match decode(envelope.payload()) {
            Ok(event) => event,
            Err(reason) => {
                error!(message_id = %envelope.message_id(), %reason,
                    "dead-lettering malformed approval event");
                return Disposition::DeadLetter(reason);
            }
        };

        // The event is a fact; no business re-validation beyond shape.
        let contract = Contract::issue(event.proposal_id, Utc::now());
        match self.contracts.create_if_absent(contract) {
            Ok(InsertOutcome::Created) => {
                info!(proposal_id = %event.proposal_id, "contract created");
                Disposition::Ack
            }
            Ok(InsertOutcome::Duplicate) => {
                // Redelivery of an already-applied event: a no-op, not an error.
                info!(proposal_id = %event.proposal_id, "duplicate approval event absorbed");
                Disposition::Ack
            }
            Err(StoreError::Unavailable(msg)) => {
                warn!(proposal_id = %event.proposal_id, error = %msg,
                    "contract store unavailable, message will be redelivered");
                Disposition::Retry
            }
            Err(err) => {
                warn!(proposal_id = %event.proposal_id, error = %err,
                    "contract creation failed, message will be redelivered");
                Disposition::Retry
            }
        }
    }
}

fn decode(payload: &JsonValue) -> Result<ProposalApproved, String> {
    serde_json::from_value(payload.clone())
        .map_err(|e| format!("malformed {} payload: {e}", ProposalApproved::EVENT_TYPE))
}
