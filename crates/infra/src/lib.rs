//! Infrastructure layer: stores, command orchestration, the approval-event
//! consumer, and the read-side queries.

pub mod cancellation;
pub mod commands;
pub mod consumer;
pub mod queries;
pub mod store;
pub mod workers;

#[cfg(test)]
mod integration_tests;

pub use cancellation::CancellationToken;
pub use commands::{
    ApproveProposal, CommandError, CreateProposal, EditProposal, ProposalCommands,
    RejectProposal,
};
pub use consumer::{ApprovedProposalConsumer, Disposition};
pub use queries::{ContractDto, ContractQueries, ProposalDto, ProposalQueries};
pub use store::{
    ContractStore, InMemoryContractStore, InMemoryProposalStore, InsertOutcome, ProposalStore,
    StoreError,
};
pub use workers::{ConsumerWorker, WorkerHandle};
