use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use super::support_agent::{AgentReply, ReplyOutcome};
use crate::constants::FALLBACK_MESSAGE;
use crate::models::TokenUsage;
use crate::tools::{ToolName, ToolRegistry};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("valid word pattern"));

/// Keywords per intent, checked in this order. A trailing `*` matches any
/// word with that prefix; other keywords match the word or its plural.
const RULES: &[(ToolName, &[&str])] = &[
    (ToolName::CheckPrerequisites, &["prereq*", "ready", "readiness"]),
    (ToolName::GetEnrollmentProcess, &["enrol*", "regist*", "signup", "apply", "admission*"]),
    (
        ToolName::GetPaymentInformation,
        &[
            "pay", "paying", "payment", "price", "pricing", "cost", "fee", "installment*",
            "discount*", "tuition", "afford*",
        ],
    ),
    (ToolName::GetScheduleAndTiming, &["schedul*", "start*", "when", "date", "timing", "begin*"]),
    (ToolName::GetCertificationInfo, &["certif*", "credential*", "badge", "credit", "diploma"]),
    (
        ToolName::GetSupportServices,
        &["support", "service", "technical", "tech", "contact", "system"],
    ),
    (ToolName::GetCourseInformation, &["course", "offer*", "catalog*", "program*", "class", "curriculum"]),
];

/// Broad intents that yield to a matching FAQ when no course is named
const YIELDS_TO_FAQ: &[ToolName] = &[ToolName::GetCourseInformation, ToolName::GetSupportServices];

/// Words too common to search FAQs with
const STOPWORDS: &[&str] = &[
    "what", "when", "where", "which", "there", "about", "your", "have", "does", "with", "this",
    "that", "would", "could", "should", "tell", "know", "want", "please", "from", "they", "them",
    "more", "some", "into", "will", "able", "need", "available",
];

fn keyword_matches(word: &str, keyword: &str) -> bool {
    match keyword.strip_suffix('*') {
        Some(prefix) => word.starts_with(prefix),
        None => word == keyword || word.strip_suffix('s') == Some(keyword),
    }
}

/// A question mapped to one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedQuery {
    pub tool: ToolName,
    pub arguments: Value,
}

/// Answers without a language model by routing the question to one tool
/// and rendering its result as text
#[derive(Debug, Clone)]
pub struct OfflineRouter {
    tools: ToolRegistry,
}

impl OfflineRouter {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Pick a tool and its arguments, or `None` for an unrecognized query
    pub fn route(&self, query: &str) -> Option<RoutedQuery> {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = WORD.find_iter(&lowered).map(|m| m.as_str()).collect();
        let kb = self.tools.knowledge();
        let course = kb.course_mentioned_in(query).map(|c| c.id.clone());

        let intent = RULES.iter().find_map(|(tool, keywords)| {
            let triggers: Vec<&str> = words
                .iter()
                .copied()
                .filter(|word| keywords.iter().any(|k| keyword_matches(word, k)))
                .collect();
            (!triggers.is_empty()).then_some((*tool, triggers))
        });

        let faq_route = |keyword: String| RoutedQuery {
            tool: ToolName::SearchFaqs,
            arguments: json!({"question": keyword}),
        };

        if let Some((tool, triggers)) = &intent {
            if course.is_none() && YIELDS_TO_FAQ.contains(tool) {
                if let Some(keyword) = self.faq_keyword(&words, triggers) {
                    let routed = faq_route(keyword);
                    debug!(query, routed = ?routed.tool, "offline routing");
                    return Some(routed);
                }
            }
        }

        let course_arg = course.clone().unwrap_or_default();
        let routed = match intent.map(|(tool, _)| tool) {
            Some(ToolName::CheckPrerequisites) => Some(RoutedQuery {
                tool: ToolName::CheckPrerequisites,
                // An unresolved course still goes through, the tool explains it wasn't found
                arguments: json!({"course_query": course.unwrap_or_else(|| query.trim().to_string())}),
            }),
            Some(ToolName::GetCourseInformation) => Some(RoutedQuery {
                tool: ToolName::GetCourseInformation,
                arguments: json!({"query": course_arg}),
            }),
            Some(tool @ (ToolName::GetSupportServices | ToolName::GetCertificationInfo)) => {
                Some(RoutedQuery {
                    tool,
                    arguments: json!({}),
                })
            }
            Some(tool) => Some(RoutedQuery {
                tool,
                arguments: json!({"course_query": course_arg}),
            }),
            None => match course {
                Some(id) => Some(RoutedQuery {
                    tool: ToolName::GetCourseInformation,
                    arguments: json!({"query": id}),
                }),
                None => self.faq_keyword(&words, &[]).map(faq_route),
            },
        };

        debug!(query, routed = ?routed.as_ref().map(|r| r.tool), "offline routing");
        routed
    }

    /// Longest meaningful word, other than `skip`, that hits at least one FAQ
    fn faq_keyword(&self, words: &[&str], skip: &[&str]) -> Option<String> {
        let mut candidates: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| w.len() >= 4 && !STOPWORDS.contains(w) && !skip.contains(w))
            .collect();
        candidates.sort_by_key(|w| std::cmp::Reverse(w.len()));
        candidates
            .into_iter()
            .find(|w| !self.tools.knowledge().search_faqs(w).is_empty())
            .map(str::to_string)
    }

    /// Rendered tool result, or the human-support fallback
    pub fn respond(&self, query: &str) -> AgentReply {
        let fallback = |tools_used| AgentReply {
            text: FALLBACK_MESSAGE.to_string(),
            outcome: ReplyOutcome::Fallback,
            tools_used,
            usage: TokenUsage::default(),
        };

        let Some(routed) = self.route(query) else {
            return fallback(Vec::new());
        };
        let tools_used = vec![routed.tool.as_str().to_string()];
        match self.tools.invoke(routed.tool, &routed.arguments) {
            Ok(output) => AgentReply {
                text: output.to_string().trim_end().to_string(),
                outcome: ReplyOutcome::Answered,
                tools_used,
                usage: TokenUsage::default(),
            },
            Err(e) => {
                debug!(error = %e, "offline tool call failed");
                fallback(tools_used)
            }
        }
    }

    pub fn answer(&self, query: &str) -> String {
        self.respond(query).text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use std::sync::Arc;

    fn router() -> OfflineRouter {
        let tools = ToolRegistry::new(Arc::new(KnowledgeBase::embedded().unwrap()))
            .with_today("2025-01-01".parse().unwrap());
        OfflineRouter::new(tools)
    }

    fn routed(query: &str) -> RoutedQuery {
        router()
            .route(query)
            .unwrap_or_else(|| panic!("'{query}' was not routed"))
    }

    #[test]
    fn test_routes_sample_questions() {
        let cases = [
            ("Tell me about the Python course", ToolName::GetCourseInformation, "query", "py101"),
            ("When does the AI course start?", ToolName::GetScheduleAndTiming, "course_query", "ai101"),
            (
                "What are the payment options for Data Science?",
                ToolName::GetPaymentInformation,
                "course_query",
                "ds201",
            ),
            ("How do I enroll in the Python course?", ToolName::GetEnrollmentProcess, "course_query", "py101"),
            (
                "What are the prerequisites for AI course?",
                ToolName::CheckPrerequisites,
                "course_query",
                "ai101",
            ),
        ];
        for (query, tool, key, value) in cases {
            let r = routed(query);
            assert_eq!(r.tool, tool, "{query}");
            assert_eq!(r.arguments[key], value, "{query}");
        }
    }

    #[test]
    fn test_routes_argumentless_tools() {
        assert_eq!(routed("What support is available?").tool, ToolName::GetSupportServices);
        assert_eq!(routed("How do I get certified?").tool, ToolName::GetCertificationInfo);
    }

    #[test]
    fn test_bare_course_mention() {
        let r = routed("machine learning?");
        assert_eq!(r.tool, ToolName::GetCourseInformation);
        assert_eq!(r.arguments["query"], "ai101");
    }

    #[test]
    fn test_faq_fallthrough() {
        let r = routed("Can I get a refund?");
        assert_eq!(r.tool, ToolName::SearchFaqs);
        assert_eq!(r.arguments["question"], "refund");
    }

    #[test]
    fn test_every_faq_question_finds_its_faq() {
        let router = router();
        for faq in router.tools.knowledge().faqs() {
            let r = routed(&faq.question);
            assert_eq!(r.tool, ToolName::SearchFaqs, "{}", faq.question);
            let keyword = r.arguments["question"].as_str().unwrap();
            let hits = router.tools.knowledge().search_faqs(keyword);
            assert!(
                hits.iter().any(|hit| hit.question == faq.question),
                "'{}' searched for '{keyword}'",
                faq.question
            );
        }
    }

    #[test]
    fn test_broad_intents_without_faq_hit_keep_their_tool() {
        let r = routed("What courses do you offer?");
        assert_eq!(r.tool, ToolName::GetCourseInformation);
        assert_eq!(r.arguments["query"], "");
        assert_eq!(routed("What are the technical requirements?").tool, ToolName::GetSupportServices);
        assert_eq!(routed("What support services are available?").tool, ToolName::GetSupportServices);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        assert!(keyword_matches("fees", "fee"));
        assert!(!keyword_matches("feedback", "fee"));
        assert!(!keyword_matches("feel", "fee"));
        assert!(keyword_matches("courses", "course"));
        assert!(!keyword_matches("coursework", "course"));
        assert!(keyword_matches("enrollment", "enrol*"));
    }

    #[test]
    fn test_unrecognized_query_gets_fallback() {
        let router = router();
        assert!(router.route("xyzzy plugh").is_none());
        assert_eq!(router.answer("xyzzy plugh"), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_respond_reports_tool() {
        let reply = router().respond("How do I get a certificate?");
        assert_eq!(reply.outcome, ReplyOutcome::Answered);
        assert_eq!(reply.tools_used, vec!["get_certification_info"]);
    }

    #[test]
    fn test_answer_renders_tool_output() {
        let answer = router().answer("How much does the data science course cost?");
        assert!(answer.contains("$449.99"));
    }
}
