// Gateway module for the knowledge base - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod base;
mod types;

// Public re-exports - the ONLY way to access knowledge functionality
pub use base::{KnowledgeBase, KnowledgeError};
pub use types::{Course, Faq, Policy, PolicyKind};
