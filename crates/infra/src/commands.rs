//! Command execution pipeline (application-level orchestration).
//!
//! Each command is a single-writer, single-aggregate unit of work:
//!
//! ```text
//! Command
//!   ↓
//! 1. Load aggregate by id (miss → NotFound)
//!   ↓
//! 2. Apply the state-machine operation (domain error propagated unchanged)
//!   ↓
//! 3. Persist with an optimistic version check (stale write → Conflict)
//!   ↓
//! 4. Approve only: publish one ProposalApproved after the commit
//! ```
//!
//! The publish step never runs if persistence fails: no event may exist for an
//! uncommitted state. A publish failure **after** a successful commit is the
//! accepted at-least-once inconsistency window; the consumer side is
//! idempotent, so an eventual retry is safe.
//!
//! This module contains no business rules; it composes the store and bus traits.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use underwrite_core::{AggregateRoot, DomainError, ExpectedVersion, ProposalId};
use underwrite_messaging::{EventBus, MessageEnvelope, ProposalApproved};
use underwrite_proposals::Proposal;

use crate::cancellation::CancellationToken;
use crate::store::{ProposalStore, StoreError};

/// Command execution error, mapped to boundary-stable codes via [`CommandError::code`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// Deterministic business failure (validation, state guard, not-found, conflict).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Store or bus unavailable/timed out; the caller may retry with backoff.
    #[error("transient failure: {0}")]
    Transient(String),

    /// State committed but the approval event was not published.
    #[error("event publication failed after commit: {0}")]
    Publish(String),

    /// Aborted by the caller-supplied cancellation token.
    #[error("cancelled by caller")]
    Cancelled,
}

impl CommandError {
    /// Stable machine-readable code for boundary mapping.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Domain(e) => e.code().as_str(),
            CommandError::Transient(_) => "Infra.Transient",
            CommandError::Publish(_) => "Infra.Publish",
            CommandError::Cancelled => "Infra.Cancelled",
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => CommandError::Domain(DomainError::conflict(msg)),
            StoreError::NotFound => CommandError::Domain(DomainError::not_found()),
            StoreError::Unavailable(msg) => CommandError::Transient(msg),
        }
    }
}

/// Command: create a proposal under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProposal {
    pub client_name: String,
    pub value_cents: i64,
}

/// Command: approve a proposal under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveProposal {
    pub proposal_id: ProposalId,
}

/// Command: reject a proposal under review, with a mandatory reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectProposal {
    pub proposal_id: ProposalId,
    pub reason: String,
}

/// Command: edit client name and value (approved proposals revert to review).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditProposal {
    pub proposal_id: ProposalId,
    pub client_name: String,
    pub value_cents: i64,
}

/// Inbound command surface of the proposal service.
///
/// Generic over the store and bus so tests run on the in-memory fakes and a
/// production binary can swap in durable backends without touching this code.
#[derive(Debug)]
pub struct ProposalCommands<S, B> {
    store: S,
    bus: B,
}

impl<S, B> ProposalCommands<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    pub fn into_parts(self) -> (S, B) {
        (self.store, self.bus)
    }
}

impl<S, B> ProposalCommands<S, B>
where
    S: ProposalStore,
    B: EventBus<MessageEnvelope>,
{
    pub fn create(
        &self,
        cmd: CreateProposal,
        cancel: &CancellationToken,
    ) -> Result<ProposalId, CommandError> {
        ensure_not_cancelled(cancel)?;

        let proposal = Proposal::create(cmd.client_name, cmd.value_cents, Utc::now())?;
        let id = proposal.id_typed();

        self.store.insert(proposal)?;
        info!(proposal_id = %id, "proposal created");
        Ok(id)
    }

    pub fn approve(
        &self,
        cmd: ApproveProposal,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        ensure_not_cancelled(cancel)?;

        let mut proposal = self.load(cmd.proposal_id)?;
        let loaded_version = proposal.version();

        proposal.approve()?;

        ensure_not_cancelled(cancel)?;
        self.store
            .update(proposal.clone(), ExpectedVersion::Exact(loaded_version))?;

        // Commit succeeded; from here on the state change is durable even if
        // publication fails or the caller cancels.
        ensure_not_cancelled(cancel)?;
        let event = ProposalApproved::new(
            proposal.id_typed(),
            proposal.client_name(),
            proposal.value_cents(),
        );
        let envelope = MessageEnvelope::from_typed(&event)
            .map_err(|e| CommandError::Publish(e.to_string()))?;

        self.bus.publish(envelope).map_err(|e| {
            warn!(proposal_id = %cmd.proposal_id, error = ?e,
                "approval committed but event publication failed");
            CommandError::Publish(format!("{e:?}"))
        })?;

        info!(proposal_id = %cmd.proposal_id, "proposal approved, event published");
        Ok(())
    }

    pub fn reject(
        &self,
        cmd: RejectProposal,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        ensure_not_cancelled(cancel)?;

        let mut proposal = self.load(cmd.proposal_id)?;
        let loaded_version = proposal.version();

        proposal.reject(cmd.reason)?;

        ensure_not_cancelled(cancel)?;
        self.store
            .update(proposal, ExpectedVersion::Exact(loaded_version))?;

        info!(proposal_id = %cmd.proposal_id, "proposal rejected");
        Ok(())
    }

    pub fn edit(
        &self,
        cmd: EditProposal,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        ensure_not_cancelled(cancel)?;

        let mut proposal = self.load(cmd.proposal_id)?;
        let loaded_version = proposal.version();

        proposal.edit(cmd.client_name, cmd.value_cents)?;

        ensure_not_cancelled(cancel)?;
        self.store
            .update(proposal, ExpectedVersion::Exact(loaded_version))?;

        info!(proposal_id = %cmd.proposal_id, "proposal edited");
        Ok(())
    }

    fn load(&self, id: ProposalId) -> Result<Proposal, CommandError> {
        self.store
            .get(id)?
            .ok_or(CommandError::Domain(DomainError::NotFound))
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), CommandError> {
    if cancel.is_cancelled() {
        return Err(CommandError::Cancelled);
    }
    Ok(())
}
