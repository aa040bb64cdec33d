//! Approval workflow module

pub mod engine;
pub mod store;
pub mod traits;
pub mod types;

pub use engine::ApprovalWorkflow;
pub use store::ApprovalStore;
pub use traits::{Notifier, Publisher, SocialGraph, TextGenerator};
pub use types::{
    ApprovalId, ApprovalStatus, Decision, DecisionAction, DecisionOutcome, PendingApproval,
    StatusCounts,
};
