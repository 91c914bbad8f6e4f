//! Contract records owned by the contracting service.

pub mod contract;

pub use contract::Contract;
