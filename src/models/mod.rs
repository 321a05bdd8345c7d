// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod anthropic;
mod factory;
mod gemini;
mod http;
mod openai;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use anthropic::AnthropicModel;
pub use factory::ModelFactory;
pub use gemini::GeminiModel;
pub use openai::OpenAiModel;
pub use traits::Model;
pub use types::{
    ChatMessage, MessageRole, ModelCapabilities, ModelConfig, ModelError, ModelResponse,
    ParseProviderError, ProviderKind, TokenUsage, ToolCall, ToolDefinition,
};
