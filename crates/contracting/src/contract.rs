use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use underwrite_core::{AggregateRoot, ContractId, ProposalId};

/// Contract record, created once per distinct approved proposal.
///
/// `proposal_id` is a correlation key into the proposal service's store, not
/// an ownership pointer: the two aggregates live in separate stores and are
/// never loaded together. Uniqueness on `proposal_id` is enforced by the
/// contract store, which is what makes redelivered approval events a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    id: ContractId,
    proposal_id: ProposalId,
    created_at: DateTime<Utc>,
}

impl Contract {
    /// Issue a new contract correlated to an approved proposal.
    pub fn issue(proposal_id: ProposalId, now: DateTime<Utc>) -> Self {
        Self {
            id: ContractId::new(),
            proposal_id,
            created_at: now,
        }
    }

    pub fn id_typed(&self) -> ContractId {
        self.id
    }

    pub fn proposal_id(&self) -> ProposalId {
        self.proposal_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl AggregateRoot for Contract {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    // Contracts are write-once; there is no transition to version.
    fn version(&self) -> u64 {
        1
    }
}
