//! Domain error model.
//!
//! Expected business failures are values, not panics. Every failure carries a
//! stable machine-readable code so the boundary layer (HTTP, UI) can map it to
//! a response without parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Stable machine-readable error code surfaced to boundary layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Client name blank or missing.
    ClientName,
    /// Proposal value not strictly positive.
    Value,
    /// Rejection reason blank or missing.
    Reason,
    /// Approval attempted outside `UnderReview`.
    Approval,
    /// Rejection attempted outside `UnderReview`.
    Rejection,
    /// Edit attempted on a rejected proposal.
    Edit,
    /// Proposal does not exist.
    NotFound,
    /// Optimistic concurrency conflict (stale version).
    Conflict,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ClientName => "Proposal.ClientName",
            ErrorCode::Value => "Proposal.Value",
            ErrorCode::Reason => "Proposal.Reason",
            ErrorCode::Approval => "Proposal.Approval",
            ErrorCode::Rejection => "Proposal.Rejection",
            ErrorCode::Edit => "Proposal.Edit",
            ErrorCode::NotFound => "Proposal.NotFound",
            ErrorCode::Conflict => "Proposal.Conflict",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, state
/// machine guards, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank name, non-positive amount).
    #[error("validation failed [{code}]: {message}")]
    Validation {
        code: ErrorCode,
        message: &'static str,
    },

    /// A transition is not allowed from the current state.
    #[error("invalid state [{code}]: {message}")]
    InvalidState {
        code: ErrorCode,
        message: &'static str,
    },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested aggregate was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// Stale version / optimistic concurrency conflict.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(code: ErrorCode, message: &'static str) -> Self {
        Self::Validation { code, message }
    }

    pub fn invalid_state(code: ErrorCode, message: &'static str) -> Self {
        Self::InvalidState { code, message }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Stable code for boundary mapping.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation { code, .. } => *code,
            DomainError::InvalidState { code, .. } => *code,
            DomainError::InvalidId(_) => ErrorCode::NotFound,
            DomainError::NotFound => ErrorCode::NotFound,
            DomainError::Conflict(_) => ErrorCode::Conflict,
        }
    }
}
