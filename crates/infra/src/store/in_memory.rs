//! In-memory state stores for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use underwrite_contracting::Contract;
use underwrite_core::{AggregateRoot, ExpectedVersion, ProposalId};
use underwrite_proposals::Proposal;

use super::r#trait::{ContractStore, InsertOutcome, ProposalStore, StoreError};

/// In-memory proposal store with optimistic single-row updates.
#[derive(Debug, Default)]
pub struct InMemoryProposalStore {
    rows: RwLock<HashMap<ProposalId, Proposal>>,
    unavailable: AtomicBool,
}

impl InMemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: simulate store outage so transient-failure paths are exercisable.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "proposal store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl ProposalStore for InMemoryProposalStore {
    fn insert(&self, proposal: Proposal) -> Result<(), StoreError> {
        self.check_available()?;
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        rows.insert(proposal.id_typed(), proposal);
        Ok(())
    }

    fn update(&self, proposal: Proposal, expected: ExpectedVersion) -> Result<(), StoreError> {
        self.check_available()?;
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        // Version check and replace happen under one lock: the conditional
        // write is atomic, as a SQL `UPDATE ... WHERE version = ?` would be.
        let current = rows.get(&proposal.id_typed()).ok_or(StoreError::NotFound)?;
        if !expected.matches(current.version()) {
            return Err(StoreError::Concurrency(format!(
                "expected {expected:?}, found {}",
                current.version()
            )));
        }

        rows.insert(proposal.id_typed(), proposal);
        Ok(())
    }

    fn get(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        self.check_available()?;
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(rows.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Proposal>, StoreError> {
        self.check_available()?;
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(rows.values().cloned().collect())
    }
}

/// In-memory contract store keyed by the proposal correlation id.
///
/// The map key **is** the unique constraint: check-and-insert happens inside
/// one write lock, so two concurrent deliveries of the same approval event
/// cannot both create a contract.
#[derive(Debug, Default)]
pub struct InMemoryContractStore {
    rows: RwLock<HashMap<ProposalId, Contract>>,
    unavailable: AtomicBool,
}

impl InMemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: simulate store outage (consumer must not acknowledge).
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "contract store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl ContractStore for InMemoryContractStore {
    fn create_if_absent(&self, contract: Contract) -> Result<InsertOutcome, StoreError> {
        self.check_available()?;
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        if rows.contains_key(&contract.proposal_id()) {
            return Ok(InsertOutcome::Duplicate);
        }
        rows.insert(contract.proposal_id(), contract);
        Ok(InsertOutcome::Created)
    }

    fn get_by_proposal(&self, proposal_id: ProposalId) -> Result<Option<Contract>, StoreError> {
        self.check_available()?;
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(rows.get(&proposal_id).cloned())
    }

    fn list(&self) -> Result<Vec<Contract>, StoreError> {
        self.check_available()?;
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(rows.values().cloned().collect())
    }
}
