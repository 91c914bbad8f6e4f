//! Integration events published for external consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use underwrite_core::ProposalId;

use crate::event::Event;

/// Published once per successful approval; the contracting service consumes it
/// to issue exactly one contract per distinct `proposal_id`.
///
/// Schema evolution is append-only: new fields must be optional (defaulted) so
/// old producers stay decodable, and consumers ignore fields they don't know.
/// `occurred_at` was added after v1 producers shipped, hence the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalApproved {
    pub proposal_id: ProposalId,
    pub client_name: String,
    /// Proposal value in the smallest currency unit (e.g., cents).
    pub value_cents: i64,
    #[serde(default = "Utc::now")]
    pub occurred_at: DateTime<Utc>,
}

impl ProposalApproved {
    /// Stable wire name, also used by consumers to route envelopes.
    pub const EVENT_TYPE: &'static str = "proposal.approved";

    pub fn new(proposal_id: ProposalId, client_name: impl Into<String>, value_cents: i64) -> Self {
        Self {
            proposal_id,
            client_name: client_name.into(),
            value_cents,
            occurred_at: Utc::now(),
        }
    }
}

impl Event for ProposalApproved {
    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
