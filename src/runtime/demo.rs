use colored::Colorize;
use std::io::Write;

use super::responder::Responder;
use crate::agent::ReplyOutcome;

/// Questions a prospective student typically asks
pub const SAMPLE_QUESTIONS: [&str; 10] = [
    "What courses do you offer?",
    "Tell me about the Python course",
    "What are the payment options?",
    "When does the AI course start?",
    "What are the prerequisites for Data Science course?",
    "How do I get a certificate?",
    "I need help with enrollment",
    "What support services are available?",
    "Can I get a refund?",
    "What are the technical requirements?",
];

/// Answer every sample question in order and write the transcript to `out`.
/// Returns how many questions ended in the human-support fallback.
pub async fn run_demo<W: Write>(responder: &mut Responder, out: &mut W) -> std::io::Result<usize> {
    writeln!(out, "{}", "Student Support Agent Demo".bold())?;
    writeln!(out, "Answering with: {}", responder.label().green())?;
    writeln!(out, "{}", "-".repeat(40))?;

    let mut fallbacks = 0;
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        writeln!(out, "\n{} {}", format!("Question {}:", i + 1).cyan(), question)?;
        let reply = responder.respond(question).await;
        if reply.outcome != ReplyOutcome::Answered {
            fallbacks += 1;
        }
        writeln!(out, "{}", reply.text)?;
        if !reply.tools_used.is_empty() {
            writeln!(out, "{}", format!("[tools: {}]", reply.tools_used.join(", ")).dimmed())?;
        }
        writeln!(out, "{}", "-".repeat(40))?;
    }
    Ok(fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::OfflineRouter;
    use crate::knowledge::KnowledgeBase;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_offline_demo_answers_everything() {
        colored::control::set_override(false);
        let tools = ToolRegistry::new(Arc::new(KnowledgeBase::embedded().unwrap()));
        let mut responder = Responder::Offline(OfflineRouter::new(tools));
        let mut out = Vec::new();

        let fallbacks = run_demo(&mut responder, &mut out).await.unwrap();
        let transcript = String::from_utf8(out).unwrap();

        assert_eq!(fallbacks, 0);
        assert!(transcript.contains("Question 10: What are the technical requirements?"));
        assert!(transcript.contains("[tools: search_faqs]"));
    }
}
