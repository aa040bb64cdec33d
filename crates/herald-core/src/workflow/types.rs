//! Strongly typed approval workflow types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly typed ApprovalId
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(String);

impl ApprovalId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|_| Self(s.to_string()))
            .map_err(|e| format!("Invalid ApprovalId format: {}", e))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApprovalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a pending approval. Every transition out of
/// `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl ApprovalStatus {
    /// Directory name used by the durable spool
    pub fn directory_name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One draft's tracked review state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
    pub id: ApprovalId,
    pub content: String,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl PendingApproval {
    pub fn new(content: String) -> Self {
        Self {
            id: ApprovalId::new(),
            content,
            status: ApprovalStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    pub(crate) fn settle(&mut self, status: ApprovalStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.decided_at = Some(Utc::now());
    }
}

/// The two ways a human can resolve a pending approval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Reject,
}

/// A human decision event, parsed once at the messaging boundary.
///
/// The wire format is `approve:<uuid>` / `reject:<uuid>` in the inline
/// keyboard callback data; nothing downstream touches the raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve(ApprovalId),
    Reject(ApprovalId),
}

impl Decision {
    /// Parse inline-keyboard callback data. Malformed or unknown data
    /// yields `None`.
    pub fn parse(callback_data: &str) -> Option<Self> {
        let (action, id) = callback_data.split_once(':')?;
        let id = ApprovalId::from_string(id).ok()?;

        match action {
            "approve" => Some(Self::Approve(id)),
            "reject" => Some(Self::Reject(id)),
            _ => None,
        }
    }

    /// Render the callback data carried by the approval buttons
    pub fn callback_data(&self) -> String {
        match self {
            Self::Approve(id) => format!("approve:{}", id),
            Self::Reject(id) => format!("reject:{}", id),
        }
    }

    pub fn approval_id(&self) -> &ApprovalId {
        match self {
            Self::Approve(id) | Self::Reject(id) => id,
        }
    }

    pub fn action(&self) -> DecisionAction {
        match self {
            Self::Approve(_) => DecisionAction::Approve,
            Self::Reject(_) => DecisionAction::Reject,
        }
    }
}

/// Terminal outcome of handling one decision event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Approved and committed to the platform, with the platform post id
    Published(String),
    /// Approved but the publish call failed; never retried automatically
    PublishFailed,
    /// Rejected by the reviewer
    Discarded,
    /// The record was absent or already resolved; safe no-op
    AlreadyProcessed,
}

impl DecisionOutcome {
    /// The single human-readable acknowledgment for this outcome
    pub fn acknowledgment(&self) -> &'static str {
        match self {
            Self::Published(_) => "✅ Post published successfully!",
            Self::PublishFailed => "❌ Failed to publish post.",
            Self::Discarded => "❌ Post rejected.",
            Self::AlreadyProcessed => "⚠️ Post not found or already processed.",
        }
    }
}

/// Per-state record counts for the status report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub expired: usize,
}

impl StatusCounts {
    pub fn increment(&mut self, status: ApprovalStatus) {
        match status {
            ApprovalStatus::Pending => self.pending += 1,
            ApprovalStatus::Approved => self.approved += 1,
            ApprovalStatus::Rejected => self.rejected += 1,
            ApprovalStatus::Expired => self.expired += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected + self.expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse_round_trip() {
        let id = ApprovalId::new();
        let approve = Decision::Approve(id.clone());
        let reject = Decision::Reject(id.clone());

        assert_eq!(Decision::parse(&approve.callback_data()), Some(approve));
        assert_eq!(Decision::parse(&reject.callback_data()), Some(reject));
    }

    #[test]
    fn test_decision_parse_rejects_garbage() {
        assert_eq!(Decision::parse(""), None);
        assert_eq!(Decision::parse("approve"), None);
        assert_eq!(Decision::parse("approve:not-a-uuid"), None);
        assert_eq!(
            Decision::parse(&format!("promote:{}", ApprovalId::new())),
            None
        );
    }

    #[test]
    fn test_new_approval_is_pending() {
        let approval = PendingApproval::new("hello".to_string());

        assert_eq!(approval.status, ApprovalStatus::Pending);
        assert!(approval.decided_at.is_none());
        assert_eq!(approval.content, "hello");
    }

    #[test]
    fn test_settle_stamps_decision_time() {
        let mut approval = PendingApproval::new("hello".to_string());
        approval.settle(ApprovalStatus::Approved);

        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert!(approval.decided_at.is_some());
    }

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.increment(ApprovalStatus::Pending);
        counts.increment(ApprovalStatus::Pending);
        counts.increment(ApprovalStatus::Rejected);

        assert_eq!(counts.pending, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.total(), 3);
    }
}
