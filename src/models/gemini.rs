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

/// Google Gemini `generateContent` with function declarations
pub struct GeminiModel {
    client: Client,
    base_url: String,
    model_name: String,
    api_key: String,
}

impl GeminiModel {
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
        let mut system_parts: Vec<Value> = config
            .system_prompt
            .iter()
            .map(|text| json!({"text": text}))
            .collect();
        let mut contents: Vec<Value> = Vec::new();

        for msg in messages {
            match msg.role {
                MessageRole::System => system_parts.push(json!({"text": msg.content})),
                MessageRole::User => push_parts(&mut contents, "user", vec![json!({"text": msg.content})]),
                MessageRole::Assistant => {
                    let mut parts = Vec::new();
                    if !msg.content.is_empty() {
                        parts.push(json!({"text": msg.content}));
                    }
                    for call in &msg.tool_calls {
                        parts.push(json!({
                            "functionCall": {"name": call.name, "args": call.arguments}
                        }));
                    }
                    push_parts(&mut contents, "model", parts);
                }
                MessageRole::Tool => {
                    // functionResponse.response must be an object
                    let response = match serde_json::from_str::<Value>(&msg.content) {
                        Ok(value) if value.is_object() => value,
                        _ => json!({"result": msg.content}),
                    };
                    push_parts(
                        &mut contents,
                        "user",
                        vec![json!({
                            "functionResponse": {
                                "name": msg.tool_name.clone().unwrap_or_default(),
                                "response": response,
                            }
                        })],
                    );
                }
            }
        }

        let mut request_body = json!({ "contents": contents });

        if !system_parts.is_empty() {
            request_body["systemInstruction"] = json!({"parts": system_parts});
        }
        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    let mut declaration = json!({
                        "name": tool.name,
                        "description": tool.description,
                    });
                    // Gemini rejects object schemas with no properties
                    if tool.has_parameters() {
                        declaration["parameters"] = tool.parameters.clone();
                    }
                    declaration
                })
                .collect();
            request_body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        let mut generation = json!({});
        if let Some(temp) = config.temperature {
            generation["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            generation["maxOutputTokens"] = json!(max_tokens);
        }
        request_body["generationConfig"] = generation;

        request_body
    }
}

fn push_parts(contents: &mut Vec<Value>, role: &str, parts: Vec<Value>) {
    if parts.is_empty() {
        return;
    }
    if let Some(last) = contents.last_mut() {
        if last["role"] == role {
            if let Some(existing) = last["parts"].as_array_mut() {
                existing.extend(parts);
                return;
            }
        }
    }
    contents.push(json!({"role": role, "parts": parts}));
}

#[async_trait]
impl Model for GeminiModel {
    async fn chat(
        &mut self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        config: &ModelConfig,
    ) -> Result<ModelResponse, ModelError> {
        let provider = ProviderKind::Gemini;
        let request_body = self.build_request(messages, tools, config);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );

        debug!(model = %self.model_name, messages = messages.len(), "sending Gemini request");
        trace!(payload = %request_body, "full Gemini request payload");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(transport(provider))?;

        let response = check_status(provider, response).await?;
        let parsed: GenerateContentResponse = response.json().await.map_err(decode(provider))?;

        let parts = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for part in parts {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                // Gemini does not assign call ids
                tool_calls.push(ToolCall {
                    id: format!("gemini-call-{}", tool_calls.len()),
                    name: call.name,
                    arguments: call.args,
                });
            }
        }

        Ok(ModelResponse {
            content,
            tool_calls,
            usage: parsed.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            model_name: self.model_name.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }
}

// Response structures (Gemini generateContent format)

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}
