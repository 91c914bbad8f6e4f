use std::sync::Arc;

use thiserror::Error;

use underwrite_contracting::Contract;
use underwrite_core::{ExpectedVersion, ProposalId};
use underwrite_proposals::Proposal;

/// Store operation error.
///
/// These are **infrastructure** failures; deterministic business failures live
/// in `underwrite_core::DomainError`. The command layer maps `Concurrency` to
/// a domain conflict and `Unavailable` to a retryable transient error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("record not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of an idempotent create keyed on a correlation id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// A record for the same correlation key already exists. Not an error:
    /// redelivered events land here and are absorbed as a no-op.
    Duplicate,
}

/// State store for the proposal service.
///
/// One row per aggregate; `update` is a conditional single-row write guarded
/// by `ExpectedVersion`, closing the lost-update window between concurrent
/// Approve/Reject/Edit calls against the same id.
pub trait ProposalStore: Send + Sync {
    fn insert(&self, proposal: Proposal) -> Result<(), StoreError>;

    /// Replace the stored row if its version still matches `expected`.
    fn update(&self, proposal: Proposal, expected: ExpectedVersion) -> Result<(), StoreError>;

    fn get(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError>;

    fn list(&self) -> Result<Vec<Proposal>, StoreError>;
}

/// State store for the contracting service.
///
/// Implementations must enforce uniqueness on `proposal_id` **inside** the
/// write (one critical section / unique constraint), not as a separate
/// check-then-insert, so concurrent redeliveries cannot double-create.
pub trait ContractStore: Send + Sync {
    fn create_if_absent(&self, contract: Contract) -> Result<InsertOutcome, StoreError>;

    fn get_by_proposal(&self, proposal_id: ProposalId) -> Result<Option<Contract>, StoreError>;

    fn list(&self) -> Result<Vec<Contract>, StoreError>;
}

impl<S> ProposalStore for Arc<S>
where
    S: ProposalStore + ?Sized,
{
    fn insert(&self, proposal: Proposal) -> Result<(), StoreError> {
        (**self).insert(proposal)
    }

    fn update(&self, proposal: Proposal, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).update(proposal, expected)
    }

    fn get(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Proposal>, StoreError> {
        (**self).list()
    }
}

impl<S> ContractStore for Arc<S>
where
    S: ContractStore + ?Sized,
{
    fn create_if_absent(&self, contract: Contract) -> Result<InsertOutcome, StoreError> {
        (**self).create_if_absent(contract)
    }

    fn get_by_proposal(&self, proposal_id: ProposalId) -> Result<Option<Contract>, StoreError> {
        (**self).get_by_proposal(proposal_id)
    }

    fn list(&self) -> Result<Vec<Contract>, StoreError> {
        (**self).list()
    }
}
