use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::http::{build_client, check_status, decode, transport};
use super::traits::Model;
use super::types::{
    ChatMessage, MessageRole, ModelConfig, ModelError, ModelResponse, ProviderKind, TokenUsage,
    ToolCall, ToolDefinition,
};

/// OpenAI chat completions (`/v1/chat/completions`) with function tools
pub struct OpenAiModel {
    client: Client,
    base_url: String,
    model_name: String,
    api_key: String,
}

impl OpenAiModel {
    pub fn new(
        model_name: &str,
        base_url: &str,
        api_key: String,
        timeout_secs: u64,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            api_key,
        })
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        config: &ModelConfig,
    ) -> Value {
        let mut json_messages = Vec::new();

        if let Some(system) = &config.system_prompt {
            json_messages.push(json!({
                "role": "system",
                "content": system
            }));
        }

        for msg in messages {
            let message = match msg.role {
                MessageRole::System => json!({"role": "system", "content": msg.content}),
                MessageRole::User => json!({"role": "user", "content": msg.content}),
                MessageRole::Assistant if !msg.tool_calls.is_empty() => {
                    let calls: Vec<Value> = msg
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments.to_string(),
                                }
                            })
                        })
                        .collect();
                    let content = if msg.content.is_empty() {
                        Value::Null
                    } else {
                        json!(msg.content)
                    };
                    json!({"role": "assistant", "content": content, "tool_calls": calls})
                }
                MessageRole::Assistant => json!({"role": "assistant", "content": msg.content}),
                MessageRole::Tool => json!({
                    "role": "tool",
                    "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
                    "content": msg.content,
                }),
            };
            json_messages.push(message);
        }

        let mut request_body = json!({
            "model": self.model_name,
            "messages": json_messages,
        });

        if !tools.is_empty() {
            let tools: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            request_body["tools"] = json!(tools);
        }
        if let Some(temp) = config.temperature {
            request_body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            request_body["max_tokens"] = json!(max_tokens);
        }

        request_body
    }
}

#[async_trait]
impl Model for OpenAiModel {
    async fn chat(
        &mut self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        config: &ModelConfig,
    ) -> Result<ModelResponse, ModelError> {
        let provider = ProviderKind::OpenAi;
        let request_body = self.build_request(messages, tools, config);
        let url = format!("{}/v1/chat/completions", self.base_url);

        debug!(model = %self.model_name, messages = messages.len(), "sending OpenAI request");
        trace!(payload = %request_body, "full OpenAI request payload");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(transport(provider))?;

        let response = check_status(provider, response).await?;
        let parsed: ChatCompletionResponse = response.json().await.map_err(decode(provider))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ModelError::Decode {
                provider,
                message: "response has no choices".to_string(),
            })?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                Ok(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: parse_arguments(&call.function.arguments)?,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(ModelResponse {
            content: message.content.unwrap_or_default(),
            tool_calls,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model_name: self.model_name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

/// Function arguments arrive as a JSON-encoded string
fn parse_arguments(raw: &str) -> Result<Value, ModelError> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw).map_err(|e| ModelError::Decode {
        provider: ProviderKind::OpenAi,
        message: format!("tool arguments are not valid JSON: {e}"),
    })
}

// Response structures (OpenAI format)

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}
