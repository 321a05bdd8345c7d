use async_trait::async_trait;

use super::types::{
    ChatMessage, ModelCapabilities, ModelConfig, ModelError, ModelResponse, ProviderKind,
    ToolDefinition,
};

/// Core trait that all model backends must implement
#[async_trait]
pub trait Model: Send + Sync {
    /// Send the conversation and the available tools to the model.
    ///
    /// One round-trip only: the caller runs any requested tools and calls
    /// again with the results appended to `messages`.
    async fn chat(
        &mut self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        config: &ModelConfig,
    ) -> Result<ModelResponse, ModelError>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Provider serving this model
    fn provider(&self) -> ProviderKind;

    /// Get model capabilities
    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities::for_provider(self.provider())
    }
}
