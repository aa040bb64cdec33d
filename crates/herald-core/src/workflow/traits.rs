//! Capability traits at the external-service seams
//!
//! Each external collaborator is consumed through a narrow async trait,
//! implemented by a concrete client and mocked in tests.

use super::types::ApprovalId;
use crate::error::Result;
use async_trait::async_trait;

/// Delivers an approval request to a human reviewer and carries the
/// approve/reject actions for it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_approval_request(&self, content: &str, id: &ApprovalId) -> Result<()>;
}

/// Commits approved content to the target platform.
///
/// Treated as non-idempotent: repeated calls with the same content may
/// create duplicate posts, so callers must never retry a failed publish.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, content: &str) -> Result<String>;
}

/// Produces free-form text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Lists usernames connected to the posting account
#[async_trait]
pub trait SocialGraph: Send + Sync {
    async fn follower_usernames(&self, max: usize) -> Result<Vec<String>>;
}
