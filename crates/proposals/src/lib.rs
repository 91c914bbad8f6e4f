//! Proposal aggregate: lifecycle state machine and transition rules.

pub mod proposal;

pub use proposal::{Operation, Proposal, ProposalStatus, transition};
