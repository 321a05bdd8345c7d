// Gateway module for the support agent - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod conversation;
mod offline;
mod prompt;
mod support_agent;

// Public re-exports - the ONLY way to access agent functionality
pub use conversation::Conversation;
pub use offline::{OfflineRouter, RoutedQuery};
pub use prompt::system_instruction;
pub use support_agent::{AgentInfo, AgentReply, ReplyOutcome, SupportAgent};
