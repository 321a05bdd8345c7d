use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::config::{load_config, Config, ModelSettings};
use super::credentials::Credentials;
use super::selection::{model_settings, select_provider, ProviderSelection};
use crate::knowledge::KnowledgeBase;
use crate::models::ProviderKind;
use crate::utils::SupportError;

/// Everything loaded once at startup and read-only afterwards
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub credentials: Credentials,
    pub knowledge: Arc<KnowledgeBase>,
}

impl AppContext {
    pub fn new(config: Config, credentials: Credentials, knowledge: KnowledgeBase) -> Self {
        Self {
            config,
            credentials,
            knowledge: Arc::new(knowledge),
        }
    }

    /// Load configuration, credentials and the knowledge base.
    /// `knowledge_override` takes precedence over `knowledge.path` from the config.
    pub fn load(
        config_file: Option<&Path>,
        knowledge_override: Option<&Path>,
    ) -> Result<Self, SupportError> {
        let config = load_config(config_file)?;
        let credentials = Credentials::from_env();
        let knowledge_path = knowledge_override.or(config.knowledge.path.as_deref());
        let knowledge = KnowledgeBase::load(knowledge_path)?;

        info!(
            courses = knowledge.all_courses().len(),
            available = ?credentials.available_providers(),
            "application context loaded"
        );
        Ok(Self::new(config, credentials, knowledge))
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        self.credentials.available_providers()
    }

    pub fn is_available(&self, provider: ProviderKind) -> bool {
        self.credentials.is_available(provider)
    }

    pub fn model_settings(&self, provider: ProviderKind) -> Result<ModelSettings, SupportError> {
        model_settings(&self.config, &self.credentials, provider)
    }

    pub fn select_provider(
        &self,
        requested: Option<ProviderKind>,
    ) -> Result<ProviderSelection, SupportError> {
        select_provider(&self.config, &self.credentials, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_delegates_to_credentials() {
        let credentials = Credentials::from_lookup(|name| {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });
        let ctx = AppContext::new(Config::default(), credentials, KnowledgeBase::embedded().unwrap());

        assert_eq!(ctx.available_providers(), vec![ProviderKind::OpenAi]);
        assert!(ctx.is_available(ProviderKind::OpenAi));
        assert!(ctx.model_settings(ProviderKind::Anthropic).is_err());
        assert_eq!(ctx.select_provider(None).unwrap().provider, ProviderKind::OpenAi);
    }

    #[test]
    fn test_load_with_missing_knowledge_file_fails() {
        let config_file = NamedTempFile::new().unwrap();
        let err = AppContext::load(
            Some(config_file.path()),
            Some(Path::new("/definitely/not/here.toml")),
        )
        .unwrap_err();
        assert!(matches!(err, SupportError::Knowledge(_)));
    }
}
