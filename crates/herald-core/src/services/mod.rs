//! Service modules for business logic

pub mod drafter;
pub mod knowledge;
pub mod responder;

pub use drafter::PostDrafter;
pub use knowledge::{KnowledgeBase, KnowledgeEntry, KnowledgeMatch};
pub use responder::{QueryResponder, FALLBACK_REPLY};
