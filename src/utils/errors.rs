use thiserror::Error;

use crate::knowledge::KnowledgeError;
use crate::models::{ModelError, ParseProviderError, ProviderKind};
use crate::tools::ToolError;

/// Main error type for the student support assistant
#[derive(Error, Debug)]
pub enum SupportError {
    #[error(
        "No API keys configured. Set GOOGLE_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY \
         (a .env file in the working directory works too)"
    )]
    NoCredentials,

    #[error("Provider '{0}' is not available. Check API key configuration.")]
    ProviderUnavailable(ProviderKind),

    #[error(transparent)]
    UnknownProvider(#[from] ParseProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for SupportError {
    fn from(err: figment::Error) -> Self {
        SupportError::Config(err.to_string())
    }
}

impl SupportError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            SupportError::NoCredentials => 2,
            _ => 1,
        }
    }
}
