//! State stores for the two independently-owned aggregates.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryContractStore, InMemoryProposalStore};
pub use r#trait::{ContractStore, InsertOutcome, ProposalStore, StoreError};
