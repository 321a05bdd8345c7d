use serde::Serialize;
use std::time::Instant;

use super::responder::Responder;
use crate::agent::ReplyOutcome;
use crate::cli::OutputFormat;

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The prompt that was executed
    pub prompt: String,
    /// The answer shown to the student
    pub response: String,
    pub outcome: ReplyOutcome,
    /// Tools called while answering, in order
    pub tools_used: Vec<String>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Provider and model, or "offline"
    pub model: String,
    /// Total tokens used
    pub tokens_used: Option<usize>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Non-interactive runner for executing single prompts
pub struct NonInteractiveRunner {
    responder: Responder,
}

impl NonInteractiveRunner {
    pub fn new(responder: Responder) -> Self {
        Self { responder }
    }

    /// Execute a single prompt and return the result
    pub async fn execute(&mut self, prompt: String) -> NonInteractiveResult {
        let start_time = Instant::now();
        let reply = self.responder.respond(&prompt).await;

        let mut errors = Vec::new();
        if reply.outcome == ReplyOutcome::ModelError {
            errors.push("The language model request failed; see logs for details".to_string());
        }
        let tokens_used = match &self.responder {
            Responder::Agent(_) => Some(reply.usage.total_tokens),
            Responder::Offline(_) => None,
        };

        NonInteractiveResult {
            prompt,
            response: reply.text,
            outcome: reply.outcome,
            tools_used: reply.tools_used,
            errors,
            metadata: ExecutionMetadata {
                model: self.responder.label(),
                tokens_used,
                duration_ms: start_time.elapsed().as_millis(),
            },
        }
    }
}

/// Format the result according to the output format
pub fn format_result(result: &NonInteractiveResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)),
        OutputFormat::Text => {
            let mut output = result.response.clone();
            if !result.errors.is_empty() {
                output.push_str("\n\n--- Errors ---\n");
                for error in &result.errors {
                    output.push_str(&format!("- {}\n", error));
                }
            }
            output
        }
        OutputFormat::Markdown => {
            let mut output = String::new();

            output.push_str("## Question\n\n");
            output.push_str(&result.prompt);
            output.push_str("\n\n## Answer\n\n");
            output.push_str(&result.response);
            output.push_str("\n\n");

            if !result.tools_used.is_empty() {
                output.push_str("## Tools Used\n\n");
                for tool in &result.tools_used {
                    output.push_str(&format!("- `{}`\n", tool));
                }
                output.push('\n');
            }

            if !result.errors.is_empty() {
                output.push_str("## Errors\n\n");
                for error in &result.errors {
                    output.push_str(&format!("- {}\n", error));
                }
                output.push('\n');
            }

            output.push_str("---\n");
            output.push_str(&format!(
                "*Model: {} | Tokens: {} | Duration: {}ms*\n",
                result.metadata.model,
                result.metadata.tokens_used.unwrap_or(0),
                result.metadata.duration_ms
            ));

            output
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::OfflineRouter;
    use crate::constants::FALLBACK_MESSAGE;
    use crate::knowledge::KnowledgeBase;
    use crate::tools::ToolRegistry;
    use serde_json::Value;
    use std::sync::Arc;

    fn offline_runner() -> NonInteractiveRunner {
        let tools = ToolRegistry::new(Arc::new(KnowledgeBase::embedded().unwrap()));
        NonInteractiveRunner::new(Responder::Offline(OfflineRouter::new(tools)))
    }

    #[tokio::test]
    async fn test_offline_prompt_json() {
        let mut runner = offline_runner();
        let result = runner.execute("Can I get a refund?".to_string()).await;
        assert_eq!(result.outcome, ReplyOutcome::Answered);
        assert_eq!(result.metadata.model, "offline");

        let json: Value = serde_json::from_str(&format_result(&result, OutputFormat::Json)).unwrap();
        assert_eq!(json["tools_used"][0], "search_faqs");
        assert_eq!(json["outcome"], "answered");
        assert!(json["metadata"]["tokens_used"].is_null());
    }

    #[tokio::test]
    async fn test_unrecognized_prompt_markdown() {
        let mut runner = offline_runner();
        let result = runner.execute("xyzzy".to_string()).await;
        assert_eq!(result.response, FALLBACK_MESSAGE);

        let markdown = format_result(&result, OutputFormat::Markdown);
        assert!(markdown.starts_with("## Question\n\nxyzzy"));
        assert!(!markdown.contains("## Tools Used"));
        assert!(markdown.contains("*Model: offline"));
    }
}
