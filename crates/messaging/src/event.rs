use chrono::{DateTime, Utc};

/// A domain-agnostic integration event.
///
/// Events are:
/// - **immutable** (treat them as facts; consumers never re-validate business rules)
/// - **versioned** (append-only schema evolution: add optional fields, never remove)
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "proposal.approved").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
