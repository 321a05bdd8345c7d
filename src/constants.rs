/// Constants module to avoid magic numbers in the codebase

// Institution
pub const INSTITUTION_NAME: &str = "Scoreazy";
pub const SUPPORT_EMAIL: &str = "support@scoreazy.edu";
pub const SUPPORT_PHONE: &str = "1-800-SCOREAZY";
pub const DEFAULT_AGENT_NAME: &str = "student_support_agent";

// Provider endpoints
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

// Default models
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

// Model Token Limits
pub const GEMINI_20_CONTEXT: usize = 1048576; // 1M tokens
pub const GPT4O_CONTEXT: usize = 128000;
pub const CLAUDE_35_CONTEXT: usize = 200000;

// Default Model Configuration
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 4096;
pub const GEMINI_MAX_TOKENS: usize = 8192;

// Agent loop
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;
pub const DEFAULT_HISTORY_LIMIT: usize = 20; // messages kept between turns

// Configuration files
pub const APP_NAME: &str = "student-support";
pub const LOCAL_CONFIG_DIR: &str = ".student-support";
pub const ENV_PREFIX: &str = "STUDENT_SUPPORT_";
pub const LEGACY_DEFAULT_MODEL_ENV: &str = "DEFAULT_MODEL";
pub const VERTEX_AI_ENV: &str = "GOOGLE_GENAI_USE_VERTEXAI";
pub const PLACEHOLDER_KEY_PREFIX: &str = "your_";

// Canned replies
pub const FALLBACK_MESSAGE: &str = "I'm not sure how to help with that. Please contact our \
support team at support@scoreazy.edu or 1-800-SCOREAZY and a staff member will assist you.";
pub const MODEL_FAILURE_MESSAGE: &str = "I'm sorry, I'm having trouble answering right now. \
Please try again in a moment, or reach our support team at support@scoreazy.edu.";

// REPL exit words
pub const EXIT_COMMANDS: &[&str] = &["quit", "exit", "q"];
