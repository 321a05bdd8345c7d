use chrono::{Local, NaiveDate};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::handlers;
use super::types::ToolOutput;
use crate::knowledge::KnowledgeBase;
use crate::models::{ToolCall, ToolDefinition};

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Tool '{tool}' requires the '{argument}' argument")]
    MissingArgument { tool: ToolName, argument: &'static str },

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArgument { tool: ToolName, reason: String },

    #[error("Failed to serialize tool result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The tools offered to the model, by wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetCourseInformation,
    GetScheduleAndTiming,
    GetPaymentInformation,
    GetSupportServices,
    GetCertificationInfo,
    SearchFaqs,
    GetEnrollmentProcess,
    CheckPrerequisites,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::GetCourseInformation,
        ToolName::GetScheduleAndTiming,
        ToolName::GetPaymentInformation,
        ToolName::GetSupportServices,
        ToolName::GetCertificationInfo,
        ToolName::SearchFaqs,
        ToolName::GetEnrollmentProcess,
        ToolName::CheckPrerequisites,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetCourseInformation => "get_course_information",
            ToolName::GetScheduleAndTiming => "get_schedule_and_timing",
            ToolName::GetPaymentInformation => "get_payment_information",
            ToolName::GetSupportServices => "get_support_services",
            ToolName::GetCertificationInfo => "get_certification_info",
            ToolName::SearchFaqs => "search_faqs",
            ToolName::GetEnrollmentProcess => "get_enrollment_process",
            ToolName::CheckPrerequisites => "check_prerequisites",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ToolName::GetCourseInformation => {
                "Retrieves detailed information about courses based on the student's query \
                 (course name, ID, or general topic). Returns all courses when nothing matches."
            }
            ToolName::GetScheduleAndTiming => {
                "Provides course schedules, timing, and upcoming start dates, for one course \
                 or for the whole catalog."
            }
            ToolName::GetPaymentInformation => {
                "Provides payment options, pricing, discounts, and installment plans, \
                 optionally for a specific course."
            }
            ToolName::GetSupportServices => {
                "Provides information about available student support services, technical \
                 requirements, and contact methods."
            }
            ToolName::GetCertificationInfo => {
                "Provides information about certificates, credits, and completion requirements."
            }
            ToolName::SearchFaqs => {
                "Searches frequently asked questions for a keyword or phrase from the student's question."
            }
            ToolName::GetEnrollmentProcess => {
                "Explains the enrollment process and requirements, optionally for a specific course."
            }
            ToolName::CheckPrerequisites => {
                "Checks course prerequisites and gives readiness recommendations, optionally \
                 taking the student's background into account."
            }
        }
    }

    /// JSON Schema of the arguments object
    fn parameters(&self) -> Value {
        let course_query = json!({
            "type": "string",
            "description": "Course ID (e.g. 'py101') or part of the course name"
        });
        match self {
            ToolName::GetCourseInformation => object_schema(
                json!({"query": {
                    "type": "string",
                    "description": "Course name, ID, or topic the student asked about"
                }}),
                &["query"],
            ),
            ToolName::GetScheduleAndTiming
            | ToolName::GetPaymentInformation
            | ToolName::GetEnrollmentProcess => {
                object_schema(json!({ "course_query": course_query }), &[])
            }
            ToolName::GetSupportServices | ToolName::GetCertificationInfo => {
                object_schema(json!({}), &[])
            }
            ToolName::SearchFaqs => object_schema(
                json!({"question": {
                    "type": "string",
                    "description": "Keyword or short phrase to look for in the FAQs"
                }}),
                &["question"],
            ),
            ToolName::CheckPrerequisites => object_schema(
                json!({
                    "course_query": course_query,
                    "student_background": {
                        "type": "string",
                        "description": "The student's educational background, if mentioned"
                    }
                }),
                &["course_query"],
            ),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    let mut schema = json!({"type": "object", "properties": properties});
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// Runs tools against a shared knowledge base
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    knowledge: Arc<KnowledgeBase>,
    today: NaiveDate,
}

impl ToolRegistry {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self {
            knowledge,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date used for "next start date" answers
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Schemas for every tool, in a stable order
    pub fn definitions() -> Vec<ToolDefinition> {
        ToolName::ALL.iter().map(ToolName::definition).collect()
    }

    /// Run one tool with a JSON arguments object
    pub fn invoke(&self, tool: ToolName, args: &Value) -> Result<ToolOutput, ToolError> {
        let args = Args::new(tool, args)?;
        let kb = self.knowledge.as_ref();

        let output = match tool {
            ToolName::GetCourseInformation => {
                ToolOutput::CourseInfo(handlers::get_course_information(kb, args.required("query")?))
            }
            ToolName::GetScheduleAndTiming => ToolOutput::Schedule(
                handlers::get_schedule_and_timing(kb, args.optional("course_query")?, self.today),
            ),
            ToolName::GetPaymentInformation => ToolOutput::Payment(
                handlers::get_payment_information(kb, args.optional("course_query")?),
            ),
            ToolName::GetSupportServices => {
                ToolOutput::Support(handlers::get_support_services(kb))
            }
            ToolName::GetCertificationInfo => {
                ToolOutput::Certification(handlers::get_certification_info(kb))
            }
            ToolName::SearchFaqs => {
                ToolOutput::Faq(handlers::search_faqs(kb, args.required("question")?))
            }
            ToolName::GetEnrollmentProcess => ToolOutput::Enrollment(
                handlers::get_enrollment_process(kb, args.optional("course_query")?),
            ),
            ToolName::CheckPrerequisites => ToolOutput::Prerequisites(
                handlers::check_prerequisites(
                    kb,
                    args.required("course_query")?,
                    args.optional("student_background")?,
                ),
            ),
        };

        debug!(tool = %tool, status = ?output.status(), "tool finished");
        Ok(output)
    }

    /// Resolve a model tool call by name and return its JSON result
    pub fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool: ToolName = call.name.parse()?;
        let output = self.invoke(tool, &call.arguments)?;
        Ok(serde_json::to_value(output)?)
    }

    /// Tool message content for the model. Failures become an error object
    /// the model can read, so a bad call never ends the conversation.
    pub fn run_for_model(&self, call: &ToolCall) -> String {
        match self.dispatch(call) {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                json!({"status": "error", "message": e.to_string()}).to_string()
            }
        }
    }
}

/// Arguments object of one call
struct Args<'a> {
    tool: ToolName,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    fn new(tool: ToolName, value: &'a Value) -> Result<Self, ToolError> {
        match value {
            Value::Null => Ok(Self { tool, map: None }),
            Value::Object(map) => Ok(Self {
                tool,
                map: Some(map),
            }),
            other => Err(ToolError::InvalidArgument {
                tool,
                reason: format!("expected an object, got {other}"),
            }),
        }
    }

    fn get(&self, name: &'static str) -> Result<Option<&'a str>, ToolError> {
        match self.map.and_then(|map| map.get(name)) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(ToolError::InvalidArgument {
                tool: self.tool,
                reason: format!("'{name}' must be a string, got {other}"),
            }),
        }
    }

    fn required(&self, name: &'static str) -> Result<&'a str, ToolError> {
        self.get(name)?.ok_or(ToolError::MissingArgument {
            tool: self.tool,
            argument: name,
        })
    }

    /// Missing optional arguments read as the empty string
    fn optional(&self, name: &'static str) -> Result<&'a str, ToolError> {
        Ok(self.get(name)?.unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(Arc::new(KnowledgeBase::embedded().unwrap()))
            .with_today("2025-01-01".parse().unwrap())
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "call_0".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_definitions_cover_every_tool() {
        let defs = ToolRegistry::definitions();
        assert_eq!(defs.len(), 8);
        for (def, tool) in defs.iter().zip(ToolName::ALL) {
            assert_eq!(def.name, tool.as_str());
            assert_eq!(def.name.parse::<ToolName>().unwrap(), tool);
        }
        let prereq = ToolName::CheckPrerequisites.definition();
        assert_eq!(prereq.parameters["required"], json!(["course_query"]));
        assert!(!ToolName::GetSupportServices.definition().has_parameters());
    }

    #[test]
    fn test_dispatch_runs_tool() {
        let result = registry()
            .dispatch(&call("get_payment_information", json!({"course_query": "ai101"})))
            .unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["course_pricing"]["discounted_price"], "$539.99");
    }

    #[test]
    fn test_optional_arguments_default_to_empty() {
        let result = registry()
            .dispatch(&call("get_schedule_and_timing", Value::Null))
            .unwrap();
        assert!(result.get("general_schedule").is_some());
    }

    #[test]
    fn test_missing_required_argument() {
        let err = registry()
            .dispatch(&call("search_faqs", json!({})))
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::MissingArgument {
                argument: "question",
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_argument_type() {
        let err = registry()
            .dispatch(&call("get_course_information", json!({"query": 101})))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[test]
    fn test_unknown_tool_reported_to_model() {
        let content = registry().run_for_model(&call("delete_student", json!({})));
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().contains("delete_student"));
    }
}
