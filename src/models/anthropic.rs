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
use crate::constants::{ANTHROPIC_API_VERSION, DEFAULT_MAX_TOKENS};

/// Anthropic Messages API (`/v1/messages`) with tool use
pub struct AnthropicModel {
    client: Client,
    base_url: String,
    model_name: String,
    api_key: String,
}

impl AnthropicModel {
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
        // The system prompt is a top-level field, not a message
        let mut system_parts: Vec<&str> = config.system_prompt.iter().map(String::as_str).collect();
        let mut turns: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                MessageRole::System => system_parts.push(&msg.content),
                MessageRole::User => {
                    push_blocks(&mut turns, "user", vec![json!({"type": "text", "text": msg.content})]);
                }
                MessageRole::Assistant => {
                    let mut blocks = Vec::new();
                    if !msg.content.is_empty() {
                        blocks.push(json!({"type": "text", "text": msg.content}));
                    }
                    for call in &msg.tool_calls {
                        let input = if call.arguments.is_object() {
                            call.arguments.clone()
                        } else {
                            json!({})
                        };
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": call.id,
                            "name": call.name,
                            "input": input,
                        }));
                    }
                    push_blocks(&mut turns, "assistant", blocks);
                }
                MessageRole::Tool => {
                    push_blocks(
                        &mut turns,
                        "user",
                        vec![json!({
                            "type": "tool_result",
                            "tool_use_id": msg.tool_call_id.clone().unwrap_or_default(),
                            "content": msg.content,
                        })],
                    );
                }
            }
        }

        let mut request_body = json!({
            "model": self.model_name,
            "max_tokens": config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": turns,
        });

        if !system_parts.is_empty() {
            request_body["system"] = json!(system_parts.join("\n\n"));
        }
        if !tools.is_empty() {
            let tools: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.parameters,
                    })
                })
                .collect();
            request_body["tools"] = json!(tools);
        }
        if let Some(temp) = config.temperature {
            request_body["temperature"] = json!(temp);
        }

        request_body
    }
}

/// Append content blocks, merging into the previous turn when the role repeats.
/// The API requires user and assistant turns to alternate.
fn push_blocks(turns: &mut Vec<Value>, role: &str, blocks: Vec<Value>) {
    if blocks.is_empty() {
        return;
    }
    if let Some(last) = turns.last_mut() {
        if last["role"] == role {
            if let Some(content) = last["content"].as_array_mut() {
                content.extend(blocks);
                return;
            }
        }
    }
    turns.push(json!({"role": role, "content": blocks}));
}

#[async_trait]
impl Model for AnthropicModel {
    async fn chat(
        &mut self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        config: &ModelConfig,
    ) -> Result<ModelResponse, ModelError> {
        let provider = ProviderKind::Anthropic;
        let request_body = self.build_request(messages, tools, config);
        let url = format!("{}/v1/messages", self.base_url);

        debug!(model = %self.model_name, messages = messages.len(), "sending Anthropic request");
        trace!(payload = %request_body, "full Anthropic request payload");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(transport(provider))?;

        let response = check_status(provider, response).await?;
        let parsed: MessagesResponse = response.json().await.map_err(decode(provider))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in parsed.content {
            match block {
                ContentBlock::Text { text } => content.push_str(&text),
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments: input,
                }),
                ContentBlock::Other => {}
            }
        }

        Ok(ModelResponse {
            content,
            tool_calls,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
            model_name: self.model_name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

// Response structures (Anthropic Messages format)

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: usize,
    output_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_tool_results_merge_into_one_user_turn() {
        let model = AnthropicModel::new("claude", "http://localhost", "k".into(), 5).unwrap();
        let first = ToolCall {
            id: "tu_1".into(),
            name: "get_support_services".into(),
            arguments: json!({}),
        };
        let second = ToolCall {
            id: "tu_2".into(),
            name: "get_certification_info".into(),
            arguments: Value::Null,
        };
        let messages = vec![
            ChatMessage::user("support and certificates?"),
            ChatMessage::assistant_with_tools("Let me check.", vec![first.clone(), second.clone()]),
            ChatMessage::tool_result(&first, "{}"),
            ChatMessage::tool_result(&second, "{}"),
        ];
        let config = ModelConfig {
            system_prompt: Some("system".into()),
            ..ModelConfig::default()
        };

        let body = model.build_request(&messages, &[], &config);
        let turns = body["messages"].as_array().unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(body["system"], "system");
        assert_eq!(turns[1]["content"].as_array().unwrap().len(), 3);
        assert_eq!(turns[1]["content"][2]["input"], json!({}));
        assert_eq!(turns[2]["role"], "user");
        assert_eq!(turns[2]["content"].as_array().unwrap().len(), 2);
        assert_eq!(turns[2]["content"][1]["tool_use_id"], "tu_2");
        assert!(body.get("tools").is_none());
    }

    #[tokio::test]
    async fn test_chat_parses_text_and_tool_use() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": "Checking prerequisites."},
                    {"type": "tool_use", "id": "tu_9", "name": "check_prerequisites",
                     "input": {"course_query": "ai101"}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 20, "output_tokens": 7}
            })))
            .mount(&server)
            .await;

        let mut model =
            AnthropicModel::new("claude-3-5-sonnet-20241022", &server.uri(), "test-key".into(), 5)
                .unwrap();
        let response = model
            .chat(&[ChatMessage::user("ai prereqs?")], &[], &ModelConfig::default())
            .await
            .unwrap();

        assert_eq!(response.content, "Checking prerequisites.");
        assert_eq!(response.tool_calls[0].name, "check_prerequisites");
        assert_eq!(response.tool_calls[0].arguments["course_query"], "ai101");
        assert_eq!(response.usage.unwrap().total_tokens, 27);
    }
}
