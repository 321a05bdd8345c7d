use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{
    CLAUDE_35_CONTEXT, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GEMINI_20_CONTEXT,
    GPT4O_CONTEXT,
};

/// Hosted model providers, declared in fallback priority order.
/// Deserialized through `FromStr`, so config files and env agree on
/// case-insensitive names and aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Static priority order used when the preferred provider has no credential
    pub const PRIORITY: [ProviderKind; 3] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic Claude",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GOOGLE_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::PRIORITY[0]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown provider '{0}' (expected gemini, openai or anthropic)")]
pub struct ParseProviderError(pub String);

impl FromStr for ProviderKind {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" | "gpt" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            _ => Err(ParseProviderError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = ParseProviderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Result of a tool invocation, fed back to the model
    Tool,
}

/// A request from the model to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, synthesized when the provider has none
    pub id: String,
    pub name: String,
    /// JSON object with the tool arguments
    pub arguments: serde_json::Value,
}

/// Tool schema advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Whether the tool takes any arguments at all
    pub fn has_parameters(&self) -> bool {
        self.parameters
            .get("properties")
            .and_then(|p| p.as_object())
            .is_some_and(|p| !p.is_empty())
    }
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages: id of the call this answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool messages: name of the tool that produced the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
            timestamp: Local::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Assistant turn that asks for tools to run
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(MessageRole::Assistant, content)
        }
    }

    /// Tool output answering `call`; `content` is the JSON result text
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call.id.clone()),
            tool_name: Some(call.name.clone()),
            ..Self::new(MessageRole::Tool, content)
        }
    }
}

/// Configuration for model parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub system_prompt: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            system_prompt: None,
        }
    }
}

/// Response from a model: text, tool calls, or both
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    /// Text of the reply, empty when the model only asked for tools
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    /// Usage statistics if available
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model_name: String,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Capabilities of a model
#[derive(Debug, Clone, Serialize)]
pub struct ModelCapabilities {
    pub max_context_length: usize,
    pub supports_functions: bool,
}

impl ModelCapabilities {
    pub fn for_provider(provider: ProviderKind) -> Self {
        let max_context_length = match provider {
            ProviderKind::Gemini => GEMINI_20_CONTEXT,
            ProviderKind::OpenAi => GPT4O_CONTEXT,
            ProviderKind::Anthropic => CLAUDE_35_CONTEXT,
        };
        Self {
            max_context_length,
            supports_functions: true,
        }
    }
}

/// Errors talking to a hosted model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to reach {provider}: {source}")]
    Transport {
        provider: ProviderKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Api {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {provider}: {message}")]
    Decode {
        provider: ProviderKind,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" claude ".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_serde_names() {
        assert_eq!(serde_json::to_value(ProviderKind::OpenAi).unwrap(), json!("openai"));
        let parsed: ProviderKind = serde_json::from_value(json!("anthropic")).unwrap();
        assert_eq!(parsed, ProviderKind::Anthropic);
        let alias: ProviderKind = serde_json::from_value(json!("GPT")).unwrap();
        assert_eq!(alias, ProviderKind::OpenAi);
        assert!(serde_json::from_value::<ProviderKind>(json!("mistral")).is_err());
    }

    #[test]
    fn test_tool_result_links_call() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "search_faqs".to_string(),
            arguments: json!({"question": "refund"}),
        };
        let msg = ChatMessage::tool_result(&call, "{}");
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.tool_name.as_deref(), Some("search_faqs"));
    }

    #[test]
    fn test_has_parameters() {
        let with = ToolDefinition {
            name: "a".into(),
            description: String::new(),
            parameters: json!({"type": "object", "properties": {"q": {"type": "string"}}}),
        };
        let without = ToolDefinition {
            name: "b".into(),
            description: String::new(),
            parameters: json!({"type": "object", "properties": {}}),
        };
        assert!(with.has_parameters());
        assert!(!without.has_parameters());
    }
}
