//! Herald Core Library
//!
//! Business logic for the herald community assistant: configuration,
//! external service clients, knowledge lookup, and the human-approval
//! publishing workflow.

pub mod clients;
pub mod config;
pub mod error;
pub mod services;
pub mod workflow;

// Re-export main types for easy access
pub use config::HeraldConfig;
pub use error::{HeraldError, Result};

pub use clients::{ModelClient, TelegramClient, TwitterClient};

pub use services::{KnowledgeBase, PostDrafter, QueryResponder};

pub use workflow::{
    ApprovalId, ApprovalStatus, ApprovalStore, ApprovalWorkflow, Decision, DecisionAction,
    DecisionOutcome, Notifier, PendingApproval, Publisher, SocialGraph, StatusCounts,
    TextGenerator,
};
