use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::{
    ANTHROPIC_BASE_URL, ANTHROPIC_DEFAULT_MODEL, APP_NAME, DEFAULT_AGENT_NAME,
    DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_TOKENS, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_TEMPERATURE,
    ENV_PREFIX, GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, GEMINI_MAX_TOKENS,
    HTTP_REQUEST_TIMEOUT_SECS, LEGACY_DEFAULT_MODEL_ENV, LOCAL_CONFIG_DIR, OPENAI_BASE_URL,
    OPENAI_DEFAULT_MODEL,
};
use crate::models::ProviderKind;
use crate::utils::SupportError;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider tried first when it has a credential
    #[serde(default)]
    pub default_provider: ProviderKind,

    /// Google Gemini settings
    #[serde(default = "gemini_settings")]
    pub gemini: ModelSettings,

    /// OpenAI settings
    #[serde(default = "openai_settings")]
    pub openai: ModelSettings,

    /// Anthropic settings
    #[serde(default = "anthropic_settings")]
    pub anthropic: ModelSettings,

    /// Conversation loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Knowledge base source
    #[serde(default)]
    pub knowledge: KnowledgeSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: ProviderKind::default(),
            gemini: gemini_settings(),
            openai: openai_settings(),
            anthropic: anthropic_settings(),
            agent: AgentSettings::default(),
            knowledge: KnowledgeSettings::default(),
        }
    }
}

impl Config {
    /// Settings for one provider
    pub fn settings(&self, provider: ProviderKind) -> &ModelSettings {
        match provider {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
        }
    }
}

/// Per-provider model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier sent to the provider
    pub model_id: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature for generation
    pub temperature: f32,
    /// API root, overridable for proxies and tests
    pub base_url: String,
}

impl ModelSettings {
    pub fn default_for(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Gemini => gemini_settings(),
            ProviderKind::OpenAi => openai_settings(),
            ProviderKind::Anthropic => anthropic_settings(),
        }
    }
}

fn gemini_settings() -> ModelSettings {
    ModelSettings {
        model_id: GEMINI_DEFAULT_MODEL.to_string(),
        max_tokens: GEMINI_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
        base_url: GEMINI_BASE_URL.to_string(),
    }
}

fn openai_settings() -> ModelSettings {
    ModelSettings {
        model_id: OPENAI_DEFAULT_MODEL.to_string(),
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
        base_url: OPENAI_BASE_URL.to_string(),
    }
}

fn anthropic_settings() -> ModelSettings {
    ModelSettings {
        model_id: ANTHROPIC_DEFAULT_MODEL.to_string(),
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
        base_url: ANTHROPIC_BASE_URL.to_string(),
    }
}

/// Conversation loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Name reported by `info`
    pub name: String,
    /// Model round-trips allowed per question before giving up
    pub max_tool_rounds: usize,
    /// Messages kept between turns
    pub history_limit: usize,
    /// HTTP timeout for provider calls
    pub request_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Knowledge base source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// TOML file replacing the embedded catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Load configuration from multiple sources
///
/// Lowest to highest precedence: defaults, the global config file, the
/// project-local config file, `explicit`, `STUDENT_SUPPORT_*` variables and
/// finally the legacy `DEFAULT_MODEL` variable.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, SupportError> {
    let mut files = Vec::new();
    if let Some(dir) = get_config_dir() {
        files.push(dir.join(CONFIG_FILE_NAME));
    }
    files.push(PathBuf::from(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(SupportError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        files.push(path.to_path_buf());
    }

    let mut config: Config = layered_files(&files)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    let legacy = std::env::var(LEGACY_DEFAULT_MODEL_ENV).ok();
    if let Some(provider) = legacy_default_provider(legacy.as_deref()) {
        config.default_provider = provider;
    }
    Ok(config)
}

/// `DEFAULT_MODEL` is only a preference: an unknown value is logged and ignored
fn legacy_default_provider(raw: Option<&str>) -> Option<ProviderKind> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    match raw.parse() {
        Ok(provider) => Some(provider),
        Err(e) => {
            warn!(variable = LEGACY_DEFAULT_MODEL_ENV, error = %e, "ignoring preferred provider");
            None
        }
    }
}

/// Defaults overlaid with every config file that exists, in order
fn layered_files(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    for file in files {
        if file.exists() {
            debug!(path = %file.display(), "merging config file");
            figment = figment.merge(Toml::file(file));
        }
    }
    figment
}

/// Get the configuration directory
pub fn get_config_dir() -> Option<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
        return Some(proj_dirs.config_dir().to_path_buf());
    }
    // Fallback to home directory
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join(APP_NAME))
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &Path) -> Result<(), SupportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_string = toml::to_string_pretty(config)
        .map_err(|e| SupportError::Config(format!("failed to serialize config: {e}")))?;
    std::fs::write(path, toml_string)?;
    Ok(())
}

const ENV_EXAMPLE: &str = r#"# Student Support Assistant credentials
# At least one key is required. Priority: Gemini, then OpenAI, then Anthropic.

GOOGLE_API_KEY=your_google_api_key_here
# OPENAI_API_KEY=your_openai_api_key_here
# ANTHROPIC_API_KEY=your_anthropic_api_key_here

# Preferred provider (gemini, openai or anthropic)
DEFAULT_MODEL=gemini
GOOGLE_GENAI_USE_VERTEXAI=FALSE
"#;

/// Create the global config file and an example `.env` if they don't exist.
/// Returns the files that were written.
pub fn init_config() -> Result<Vec<PathBuf>, SupportError> {
    let config_dir = get_config_dir()
        .ok_or_else(|| SupportError::Config("could not determine config directory".into()))?;
    init_config_in(&config_dir, Path::new("."))
}

pub(crate) fn init_config_in(
    config_dir: &Path,
    project_dir: &Path,
) -> Result<Vec<PathBuf>, SupportError> {
    let mut created = Vec::new();

    let config_file = config_dir.join(CONFIG_FILE_NAME);
    if !config_file.exists() {
        save_config(&Config::default(), &config_file)?;
        created.push(config_file);
    }

    let env_example = project_dir.join(".env.example");
    if !env_example.exists() {
        std::fs::write(&env_example, ENV_EXAMPLE)?;
        created.push(env_example);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use figment::Jail;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_per_provider() {
        let config = Config::default();
        assert_eq!(config.default_provider, ProviderKind::Gemini);
        assert_eq!(config.gemini.model_id, "gemini-2.0-flash");
        assert_eq!(config.gemini.max_tokens, 8192);
        assert_eq!(config.openai.model_id, "gpt-4o");
        assert_eq!(config.anthropic.model_id, "claude-3-5-sonnet-20241022");
        assert_eq!(config.settings(ProviderKind::OpenAi).max_tokens, 4096);
        assert!((config.anthropic.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        std::fs::write(
            &global,
            "default_provider = \"anthropic\"\n[openai]\nmodel_id = \"gpt-4o-mini\"\n",
        )
        .unwrap();
        std::fs::write(&local, "default_provider = \"openai\"\n[agent]\nmax_tool_rounds = 2\n")
            .unwrap();

        let config: Config = layered_files(&[global, local, dir.path().join("missing.toml")])
            .extract()
            .unwrap();

        assert_eq!(config.default_provider, ProviderKind::OpenAi);
        assert_eq!(config.openai.model_id, "gpt-4o-mini");
        // Untouched keys of a partially overridden table keep their defaults
        assert_eq!(config.openai.max_tokens, 4096);
        assert_eq!(config.agent.max_tool_rounds, 2);
        assert_eq!(config.agent.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_provider_aliases_in_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(&file, "default_provider = \"claude\"\n").unwrap();

        let config: Config = layered_files(&[file]).extract().unwrap();
        assert_eq!(config.default_provider, ProviderKind::Anthropic);
    }

    #[test]
    fn test_legacy_default_provider_parsing() {
        assert_eq!(legacy_default_provider(Some("GEMINI")), Some(ProviderKind::Gemini));
        assert_eq!(legacy_default_provider(Some(" claude ")), Some(ProviderKind::Anthropic));
        assert_eq!(legacy_default_provider(Some("mistral")), None);
        assert_eq!(legacy_default_provider(Some("")), None);
        assert_eq!(legacy_default_provider(None), None);
    }

    /// Point the global config lookup into the jail so no real file leaks in
    fn isolate(jail: &mut Jail) {
        let home = jail.directory().to_path_buf();
        jail.set_env("HOME", home.display());
        jail.set_env("XDG_CONFIG_HOME", home.join(".config").display());
        jail.set_env(LEGACY_DEFAULT_MODEL_ENV, "");
    }

    #[test]
    fn test_prefixed_env_overrides_nested_file_values() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "custom.toml",
                "default_provider = \"anthropic\"\n[agent]\nmax_tool_rounds = 2\n",
            )?;
            jail.set_env("STUDENT_SUPPORT_AGENT__MAX_TOOL_ROUNDS", "7");
            jail.set_env("STUDENT_SUPPORT_OPENAI__MODEL_ID", "gpt-4o-mini");

            let config = load_config(Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.agent.max_tool_rounds, 7);
            assert_eq!(config.openai.model_id, "gpt-4o-mini");
            assert_eq!(config.default_provider, ProviderKind::Anthropic);
            Ok(())
        });
    }

    #[test]
    fn test_legacy_variable_beats_prefixed_env() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.set_env("STUDENT_SUPPORT_DEFAULT_PROVIDER", "anthropic");
            jail.set_env(LEGACY_DEFAULT_MODEL_ENV, "OpenAI");

            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config.default_provider, ProviderKind::OpenAi);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_legacy_value_keeps_file_default() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("custom.toml", "default_provider = \"anthropic\"\n")?;
            jail.set_env(LEGACY_DEFAULT_MODEL_ENV, "mistral");

            let config = load_config(Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.default_provider, ProviderKind::Anthropic);
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_provider_is_case_insensitive() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.set_env("STUDENT_SUPPORT_DEFAULT_PROVIDER", "GEMINI");

            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config.default_provider, ProviderKind::Gemini);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SupportError::Config(_)));
    }

    #[test]
    fn test_init_config_writes_once() {
        let config_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        let created = init_config_in(config_dir.path(), project_dir.path()).unwrap();
        assert_eq!(created.len(), 2);

        let written = std::fs::read_to_string(config_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        let parsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(parsed.gemini, Config::default().gemini);

        let again = init_config_in(config_dir.path(), project_dir.path()).unwrap();
        assert!(again.is_empty());
    }
}
