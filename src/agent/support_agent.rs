use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::conversation::Conversation;
use super::prompt::system_instruction;
use crate::app::{AgentSettings, AppContext};
use crate::constants::{FALLBACK_MESSAGE, MODEL_FAILURE_MESSAGE};
use crate::knowledge::KnowledgeBase;
use crate::models::{
    ChatMessage, Model, ModelCapabilities, ModelConfig, ModelFactory, ProviderKind, TokenUsage, ToolDefinition,
};
use crate::tools::ToolRegistry;
use crate::utils::SupportError;

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    /// The model wrote an answer
    Answered,
    /// No usable answer; the student was pointed to human support
    Fallback,
    /// The provider call failed; the student got an apology
    ModelError,
}

/// One answer with what it took to produce it
#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub text: String,
    pub outcome: ReplyOutcome,
    /// Tool names in call order
    pub tools_used: Vec<String>,
    pub usage: TokenUsage,
}

/// Configuration summary reported by `info`
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub agent_name: String,
    pub provider: ProviderKind,
    pub model_id: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub available_providers: Vec<ProviderKind>,
    pub tools_available: usize,
    pub capabilities: ModelCapabilities,
    /// True when the preferred provider had no key
    pub fell_back: bool,
}

/// Receives a question, lets the model pick tools, returns the answer text
pub struct SupportAgent {
    model: Box<dyn Model>,
    tools: ToolRegistry,
    definitions: Vec<ToolDefinition>,
    conversation: Conversation,
    model_config: ModelConfig,
    settings: AgentSettings,
    available: Vec<ProviderKind>,
    fell_back: bool,
}

impl SupportAgent {
    /// Select a provider from the context's credentials and build its adapter
    pub fn new(ctx: &AppContext, requested: Option<ProviderKind>) -> Result<Self, SupportError> {
        let selection = ctx.select_provider(requested)?;
        let model = ModelFactory::create(&selection, ctx.config.agent.request_timeout_secs)?;
        let model_config = ModelFactory::model_config(&selection, &system_instruction());

        let mut agent = Self::with_model(
            model,
            Arc::clone(&ctx.knowledge),
            ctx.config.agent.clone(),
            model_config,
        );
        agent.available = ctx.available_providers();
        agent.fell_back = selection.fell_back;

        info!(
            provider = %selection.provider,
            model = %selection.settings.model_id,
            "student support agent initialized"
        );
        Ok(agent)
    }

    /// Build around an existing model
    pub fn with_model(
        model: Box<dyn Model>,
        knowledge: Arc<KnowledgeBase>,
        settings: AgentSettings,
        model_config: ModelConfig,
    ) -> Self {
        let available = vec![model.provider()];
        Self {
            model,
            tools: ToolRegistry::new(knowledge),
            definitions: ToolRegistry::definitions(),
            conversation: Conversation::new(settings.history_limit),
            model_config,
            settings,
            available,
            fell_back: false,
        }
    }

    /// Replace the tool registry, e.g. to pin its date
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Answer one message. Never fails: provider errors and unusable
    /// replies turn into canned messages.
    pub async fn respond(&mut self, message: &str) -> AgentReply {
        let checkpoint = self.conversation.len();
        self.conversation.push(ChatMessage::user(message));

        let mut usage = TokenUsage::default();
        let mut tools_used = Vec::new();

        for round in 0..self.settings.max_tool_rounds {
            let response = match self
                .model
                .chat(
                    self.conversation.messages(),
                    &self.definitions,
                    &self.model_config,
                )
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "model call failed");
                    self.conversation.truncate(checkpoint);
                    return AgentReply {
                        text: MODEL_FAILURE_MESSAGE.to_string(),
                        outcome: ReplyOutcome::ModelError,
                        tools_used,
                        usage,
                    };
                }
            };

            if let Some(u) = &response.usage {
                usage.add(u);
            }

            if response.tool_calls.is_empty() {
                let text = response.content.trim();
                if text.is_empty() {
                    warn!("model returned an empty reply");
                    return self.fall_back(checkpoint, message, tools_used, usage);
                }
                self.conversation.push(ChatMessage::assistant(text));
                self.conversation.trim();
                return AgentReply {
                    text: text.to_string(),
                    outcome: ReplyOutcome::Answered,
                    tools_used,
                    usage,
                };
            }

            debug!(round, calls = response.tool_calls.len(), "model requested tools");
            self.conversation.push(ChatMessage::assistant_with_tools(
                response.content,
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                tools_used.push(call.name.clone());
                let content = self.tools.run_for_model(call);
                self.conversation.push(ChatMessage::tool_result(call, content));
            }
        }

        warn!(
            max_rounds = self.settings.max_tool_rounds,
            "model kept requesting tools, giving up"
        );
        self.fall_back(checkpoint, message, tools_used, usage)
    }

    /// Replace the turn with the question and the human-support fallback
    fn fall_back(
        &mut self,
        checkpoint: usize,
        message: &str,
        tools_used: Vec<String>,
        usage: TokenUsage,
    ) -> AgentReply {
        self.conversation.truncate(checkpoint);
        self.conversation.push(ChatMessage::user(message));
        self.conversation.push(ChatMessage::assistant(FALLBACK_MESSAGE));
        self.conversation.trim();
        AgentReply {
            text: FALLBACK_MESSAGE.to_string(),
            outcome: ReplyOutcome::Fallback,
            tools_used,
            usage,
        }
    }

    /// Answer text only
    pub async fn chat(&mut self, message: &str) -> String {
        self.respond(message).await.text
    }

    pub fn agent_info(&self) -> AgentInfo {
        AgentInfo {
            agent_name: self.settings.name.clone(),
            provider: self.model.provider(),
            model_id: self.model.name().to_string(),
            temperature: self.model_config.temperature,
            max_tokens: self.model_config.max_tokens,
            available_providers: self.available.clone(),
            tools_available: self.definitions.len(),
            capabilities: self.model.capabilities(),
            fell_back: self.fell_back,
        }
    }

    /// Forget the conversation so far
    pub fn reset(&mut self) {
        self.conversation.clear();
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
