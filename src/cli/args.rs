use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::ProviderKind;

#[derive(Parser, Debug)]
#[command(name = "student-support")]
#[command(version)]
#[command(about = "Conversational student support assistant for course, enrollment and payment questions", long_about = None)]
pub struct Cli {
    /// Preferred provider (gemini, openai, anthropic); falls back by priority when it has no key
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Path to configuration file
    #[arg(short, long, env = "STUDENT_SUPPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// TOML file replacing the embedded course catalog
    #[arg(long)]
    pub knowledge_base: Option<PathBuf>,

    /// Answer from the knowledge base only, without a language model
    #[arg(long)]
    pub offline: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Non-interactive prompt to execute
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration and an example .env
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show credentials and the provider that would be used
    Status,
    /// List providers in priority order with their models
    Providers,
    /// List the tools and their argument schemas
    Tools,
    /// Run one tool and print its JSON result
    Tool {
        /// Tool name, e.g. get_course_information
        name: String,
        /// Tool argument as key=value (repeatable)
        #[arg(short, long = "arg", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },
    /// Answer a set of sample student questions
    Demo {
        /// Use the offline router instead of a language model
        #[arg(long)]
        offline: bool,
    },
    /// Show the agent configuration
    Info,
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
