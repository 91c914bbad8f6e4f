use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use underwrite_core::{AggregateRoot, DomainError, DomainResult, ErrorCode, ProposalId};

/// Proposal status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    UnderReview,
    Approved,
    Rejected,
}

impl ProposalStatus {
    /// Human-readable label for read projections (never the enum ordinal).
    pub fn label(self) -> &'static str {
        match self {
            ProposalStatus::UnderReview => "Under Review",
            ProposalStatus::Approved => "Approved",
            ProposalStatus::Rejected => "Rejected",
        }
    }
}

/// Named transition operations on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Approve,
    Reject,
    Edit,
}

/// Explicit transition table: (current status, operation) → next status.
///
/// Policy lives here, auditable in one place:
/// - Approve/Reject only from `UnderReview`; `Rejected` is terminal.
/// - Editing an `Approved` proposal reverts it to `UnderReview`: changed terms
///   invalidate a prior approval and must not silently re-trigger a contract.
/// - No transition ever goes directly between `Approved` and `Rejected`.
pub fn transition(current: ProposalStatus, op: Operation) -> DomainResult<ProposalStatus> {
    use Operation::{Approve, Edit, Reject};
    use ProposalStatus::{Approved, Rejected, UnderReview};

    match (current, op) {
        (UnderReview, Approve) => Ok(Approved),
        (UnderReview, Reject) => Ok(Rejected),
        (UnderReview, Edit) => Ok(UnderReview),
        (Approved, Edit) => Ok(UnderReview),
        (Approved | Rejected, Approve) => Err(DomainError::invalid_state(
            ErrorCode::Approval,
            "a proposal can only be approved while under review",
        )),
        (Approved | Rejected, Reject) => Err(DomainError::invalid_state(
            ErrorCode::Rejection,
            "a proposal can only be rejected while under review",
        )),
        (Rejected, Edit) => Err(DomainError::invalid_state(
            ErrorCode::Edit,
            "rejected proposals cannot be edited",
        )),
    }
}

/// Aggregate root: Proposal.
///
/// State is mutated only through the named transition operations below; every
/// successful transition bumps `version` for the store's conditional write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    id: ProposalId,
    client_name: String,
    /// Value in the smallest currency unit (e.g., cents). Always > 0.
    value_cents: i64,
    status: ProposalStatus,
    /// Present if and only if `status == Rejected`.
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    version: u64,
}

impl Proposal {
    /// Validated factory: fails fast on a blank name or non-positive value.
    pub fn create(
        client_name: impl Into<String>,
        value_cents: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let client_name = client_name.into();
        validate_client_name(&client_name)?;
        validate_value(value_cents)?;

        Ok(Self {
            id: ProposalId::new(),
            client_name,
            value_cents,
            status: ProposalStatus::UnderReview,
            rejection_reason: None,
            created_at: now,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> ProposalId {
        self.id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn value_cents(&self) -> i64 {
        self.value_cents
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Approve the proposal. Allowed only while under review.
    ///
    /// The caller is responsible for publishing the approval event **after**
    /// the new state is persisted; no event may exist for an uncommitted state.
    pub fn approve(&mut self) -> DomainResult<()> {
        self.status = transition(self.status, Operation::Approve)?;
        self.version += 1;
        Ok(())
    }

    /// Reject the proposal with a mandatory reason. Terminal.
    pub fn reject(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        // State check first, then field validation: rejecting an approved
        // proposal reports the state error even if the reason is also blank.
        let next = transition(self.status, Operation::Reject)?;

        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(DomainError::validation(
                ErrorCode::Reason,
                "a rejection reason is required",
            ));
        }

        self.status = next;
        self.rejection_reason = Some(reason);
        self.version += 1;
        Ok(())
    }

    /// Edit the client name and value. Editing an approved proposal reverts it
    /// to `UnderReview` (re-review policy); editing a rejected one is refused.
    pub fn edit(&mut self, client_name: impl Into<String>, value_cents: i64) -> DomainResult<()> {
        let next = transition(self.status, Operation::Edit)?;

        let client_name = client_name.into();
        validate_client_name(&client_name)?;
        validate_value(value_cents)?;

        self.client_name = client_name;
        self.value_cents = value_cents;
        self.status = next;
        self.version += 1;
        Ok(())
    }
}

impl AggregateRoot for Proposal {
    type Id = ProposalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn validate_client_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation(
            ErrorCode::ClientName,
            "client name must not be blank",
        ));
    }
    Ok(())
}

fn validate_value(value_cents: i64) -> DomainResult<()> {
    if value_cents <= 0 {
        return Err(DomainError::validation(
            ErrorCode::Value,
            "value must be greater than zero",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn under_review_proposal() -> Proposal {
        Proposal::create("Alice", 100_000, test_time()).unwrap()
    }

    fn approved_proposal() -> Proposal {
        let mut proposal = under_review_proposal();
        proposal.approve().unwrap();
        proposal
    }

    fn rejected_proposal() -> Proposal {
        let mut proposal = under_review_proposal();
        proposal.reject("insufficient documentation").unwrap();
        proposal
    }

    #[test]
    fn create_starts_under_review() {
        let proposal = under_review_proposal();
        assert_eq!(proposal.status(), ProposalStatus::UnderReview);
        assert_eq!(proposal.client_name(), "Alice");
        assert_eq!(proposal.value_cents(), 100_000);
        assert_eq!(proposal.rejection_reason(), None);
        assert_eq!(proposal.version(), 1);
    }

    #[test]
    fn create_rejects_blank_names() {
        for name in ["", "   ", "\t\n"] {
            let err = Proposal::create(name, 100_000, test_time()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ClientName);
        }
    }

    #[test]
    fn create_rejects_non_positive_values() {
        for value in [0, -1, i64::MIN] {
            let err = Proposal::create("Alice", value, test_time()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::Value);
        }
    }

    #[test]
    fn approve_moves_under_review_to_approved() {
        let mut proposal = under_review_proposal();
        proposal.approve().unwrap();
        assert_eq!(proposal.status(), ProposalStatus::Approved);
        assert_eq!(proposal.version(), 2);
    }

    #[test]
    fn approve_twice_fails_and_keeps_approved_status() {
        let mut proposal = approved_proposal();
        let err = proposal.approve().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Approval);
        assert_eq!(proposal.status(), ProposalStatus::Approved);
    }

    #[test]
    fn reject_requires_a_non_blank_reason() {
        let mut proposal = under_review_proposal();
        let err = proposal.reject("   ").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Reason);
        assert_eq!(proposal.status(), ProposalStatus::UnderReview);
        assert_eq!(proposal.rejection_reason(), None);
    }

    #[test]
    fn reject_sets_status_and_reason() {
        let proposal = rejected_proposal();
        assert_eq!(proposal.status(), ProposalStatus::Rejected);
        assert_eq!(
            proposal.rejection_reason(),
            Some("insufficient documentation")
        );
    }

    #[test]
    fn reject_after_approve_fails_with_state_error() {
        let mut proposal = approved_proposal();
        // State error wins even though the reason is also blank.
        let err = proposal.reject("").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Rejection);
        assert_eq!(proposal.status(), ProposalStatus::Approved);
    }

    #[test]
    fn edit_while_under_review_keeps_status() {
        let mut proposal = under_review_proposal();
        proposal.edit("Bob", 50_000).unwrap();
        assert_eq!(proposal.status(), ProposalStatus::UnderReview);
        assert_eq!(proposal.client_name(), "Bob");
        assert_eq!(proposal.value_cents(), 50_000);
    }

    #[test]
    fn edit_reverts_approved_to_under_review() {
        let mut proposal = approved_proposal();
        proposal.edit("Alice", 200_000).unwrap();
        assert_eq!(proposal.status(), ProposalStatus::UnderReview);
    }

    #[test]
    fn edit_on_rejected_always_fails_regardless_of_input() {
        let mut proposal = rejected_proposal();

        let err = proposal.edit("Valid Name", 100_000).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Edit);

        // Invalid input does not change the outcome: the state check is first.
        let err = proposal.edit("", -5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Edit);

        assert_eq!(proposal.status(), ProposalStatus::Rejected);
        assert_eq!(
            proposal.rejection_reason(),
            Some("insufficient documentation")
        );
    }

    #[test]
    fn edit_validates_fields_like_create() {
        let mut proposal = under_review_proposal();

        let err = proposal.edit("  ", 100).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ClientName);

        let err = proposal.edit("Bob", 0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Value);

        // Failed edits leave the aggregate untouched.
        assert_eq!(proposal.client_name(), "Alice");
        assert_eq!(proposal.value_cents(), 100_000);
        assert_eq!(proposal.version(), 1);
    }

    #[test]
    fn rejection_reason_present_iff_rejected() {
        assert_eq!(under_review_proposal().rejection_reason(), None);
        assert_eq!(approved_proposal().rejection_reason(), None);
        assert!(rejected_proposal().rejection_reason().is_some());
    }

    #[test]
    fn transition_table_is_exhaustive() {
        use Operation::*;
        use ProposalStatus::*;

        assert_eq!(transition(UnderReview, Approve).unwrap(), Approved);
        assert_eq!(transition(UnderReview, Reject).unwrap(), Rejected);
        assert_eq!(transition(UnderReview, Edit).unwrap(), UnderReview);

        assert_eq!(
            transition(Approved, Approve).unwrap_err().code(),
            ErrorCode::Approval
        );
        assert_eq!(
            transition(Approved, Reject).unwrap_err().code(),
            ErrorCode::Rejection
        );
        assert_eq!(transition(Approved, Edit).unwrap(), UnderReview);

        assert_eq!(
            transition(Rejected, Approve).unwrap_err().code(),
            ErrorCode::Approval
        );
        assert_eq!(
            transition(Rejected, Reject).unwrap_err().code(),
            ErrorCode::Rejection
        );
        assert_eq!(
            transition(Rejected, Edit).unwrap_err().code(),
            ErrorCode::Edit
        );
    }

    #[test]
    fn status_labels_are_human_readable() {
        assert_eq!(ProposalStatus::UnderReview.label(), "Under Review");
        assert_eq!(ProposalStatus::Approved.label(), "Approved");
        assert_eq!(ProposalStatus::Rejected.label(), "Rejected");
    }

    proptest! {
        #[test]
        fn any_valid_input_creates_under_review(
            name in "[a-zA-Z][a-zA-Z ]{0,40}",
            value in 1i64..=i64::MAX,
        ) {
            let proposal = Proposal::create(name.clone(), value, test_time()).unwrap();
            prop_assert_eq!(proposal.status(), ProposalStatus::UnderReview);
            prop_assert_eq!(proposal.client_name(), name.as_str());
            prop_assert_eq!(proposal.value_cents(), value);
        }

        #[test]
        fn whitespace_only_names_never_create(name in "[ \t]{0,10}", value in 1i64..=1_000_000) {
            let err = Proposal::create(name, value, test_time()).unwrap_err();
            prop_assert_eq!(err.code(), ErrorCode::ClientName);
        }

        #[test]
        fn non_positive_values_never_create(value in i64::MIN..=0) {
            let err = Proposal::create("Alice", value, test_time()).unwrap_err();
            prop_assert_eq!(err.code(), ErrorCode::Value);
        }
    }
}
