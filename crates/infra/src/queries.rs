//! Read layer: flat, denormalized projections straight off persisted state.
//!
//! No caching, no joins across the two services. Status is rendered as a
//! human-readable label, never the raw enum ordinal.

use chrono::{DateTime, Utc};
use serde::Serialize;

use underwrite_contracting::Contract;
use underwrite_core::{ContractId, ProposalId};
use underwrite_proposals::Proposal;

use crate::store::{ContractStore, ProposalStore, StoreError};

/// Denormalized proposal record for listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalDto {
    pub id: ProposalId,
    pub client_name: String,
    pub value_cents: i64,
    pub status: &'static str,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Proposal> for ProposalDto {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.id_typed(),
            client_name: proposal.client_name().to_string(),
            value_cents: proposal.value_cents(),
            status: proposal.status().label(),
            rejection_reason: proposal.rejection_reason().map(str::to_string),
            created_at: proposal.created_at(),
        }
    }
}

/// Denormalized contract record for listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDto {
    pub id: ContractId,
    pub proposal_id: ProposalId,
    pub created_at: DateTime<Utc>,
}

impl From<&Contract> for ContractDto {
    fn from(contract: &Contract) -> Self {
        Self {
            id: contract.id_typed(),
            proposal_id: contract.proposal_id(),
            created_at: contract.created_at(),
        }
    }
}

/// Proposal read queries.
#[derive(Debug)]
pub struct ProposalQueries<S> {
    store: S,
}

impl<S> ProposalQueries<S>
where
    S: ProposalStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All proposals, newest first.
    pub fn list(&self) -> Result<Vec<ProposalDto>, StoreError> {
        let mut dtos: Vec<ProposalDto> =
            self.store.list()?.iter().map(ProposalDto::from).collect();
        dtos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(dtos)
    }

    /// Single proposal; `None` maps to a missing-resource response upstream.
    pub fn get(&self, id: ProposalId) -> Result<Option<ProposalDto>, StoreError> {
        Ok(self.store.get(id)?.as_ref().map(ProposalDto::from))
    }
}

/// Contract read queries.
#[derive(Debug)]
pub struct ContractQueries<S> {
    store: S,
}

impl<S> ContractQueries<S>
where
    S: ContractStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All contracts, newest first.
    pub fn list(&self) -> Result<Vec<ContractDto>, StoreError> {
        let mut dtos: Vec<ContractDto> =
            self.store.list()?.iter().map(ContractDto::from).collect();
        dtos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(dtos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;

    use crate::store::{InMemoryContractStore, InMemoryProposalStore};

    #[test]
    fn list_renders_labels_and_orders_newest_first() {
        let store = Arc::new(InMemoryProposalStore::new());
        let queries = ProposalQueries::new(store.clone());

        let t0 = Utc::now();
        let older = Proposal::create("Alice", 100, t0 - Duration::seconds(60)).unwrap();
        let mut newer = Proposal::create("Bob", 200, t0).unwrap();
        newer.reject("out of appetite").unwrap();

        store.insert(older.clone()).unwrap();
        store.insert(newer.clone()).unwrap();

        let dtos = queries.list().unwrap();
        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[0].client_name, "Bob");
        assert_eq!(dtos[0].status, "Rejected");
        assert_eq!(dtos[0].rejection_reason.as_deref(), Some("out of appetite"));
        assert_eq!(dtos[1].client_name, "Alice");
        assert_eq!(dtos[1].status, "Under Review");
        assert_eq!(dtos[1].rejection_reason, None);
    }

    #[test]
    fn get_miss_is_none() {
        let store = Arc::new(InMemoryProposalStore::new());
        let queries = ProposalQueries::new(store);
        assert!(queries.get(ProposalId::new()).unwrap().is_none());
    }

    #[test]
    fn contract_list_is_denormalized() {
        let store = Arc::new(InMemoryContractStore::new());
        let queries = ContractQueries::new(store.clone());

        let proposal_id = ProposalId::new();
        let contract = Contract::issue(proposal_id, Utc::now());
        store.create_if_absent(contract.clone()).unwrap();

        let dtos = queries.list().unwrap();
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].proposal_id, proposal_id);
        assert_eq!(dtos[0].id, contract.id_typed());
    }
}
