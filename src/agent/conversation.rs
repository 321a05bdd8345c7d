use std::path::Path;

use crate::models::{ChatMessage, MessageRole};
use crate::utils::SupportError;

/// Message history carried between turns, bounded by a message count.
///
/// Trimming only drops whole exchanges: the history always starts with a
/// user message, so tool results are never separated from the call that
/// produced them.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    limit: usize,
}

impl Conversation {
    pub fn new(limit: usize) -> Self {
        Self {
            messages: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drop everything after the first `len` messages
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Drop the oldest exchanges until the history fits the limit.
    /// The newest exchange is kept even if it alone exceeds the limit.
    pub fn trim(&mut self) {
        while self.messages.len() > self.limit {
            let next_user = self
                .messages
                .iter()
                .skip(1)
                .position(|m| m.role == MessageRole::User);
            match next_user {
                Some(offset) => {
                    self.messages.drain(..=offset);
                }
                None => break,
            }
        }
    }

    /// Write the transcript as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SupportError> {
        let json = serde_json::to_string_pretty(&self.messages)
            .map_err(|e| SupportError::Config(format!("failed to serialize transcript: {e}")))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolCall;
    use serde_json::json;
    use tempfile::TempDir;

    fn exchange(conversation: &mut Conversation, question: &str, with_tool: bool) {
        conversation.push(ChatMessage::user(question));
        if with_tool {
            let call = ToolCall {
                id: "c1".into(),
                name: "search_faqs".into(),
                arguments: json!({"question": question}),
            };
            conversation.push(ChatMessage::assistant_with_tools("", vec![call.clone()]));
            conversation.push(ChatMessage::tool_result(&call, "{}"));
        }
        conversation.push(ChatMessage::assistant("answer"));
    }

    #[test]
    fn test_trim_drops_whole_exchanges() {
        let mut conversation = Conversation::new(5);
        exchange(&mut conversation, "first", true);
        exchange(&mut conversation, "second", false);
        assert_eq!(conversation.len(), 6);

        conversation.trim();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].content, "second");
    }

    #[test]
    fn test_trim_keeps_oversized_latest_exchange() {
        let mut conversation = Conversation::new(2);
        exchange(&mut conversation, "only", true);
        conversation.trim();
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.messages()[0].role, MessageRole::User);
    }

    #[test]
    fn test_save_writes_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcript.json");
        let mut conversation = Conversation::new(10);
        exchange(&mut conversation, "hello", false);

        conversation.save(&path).unwrap();
        let saved: Vec<ChatMessage> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].content, "hello");
    }
}
