use tracing::info;

use super::anthropic::AnthropicModel;
use super::gemini::GeminiModel;
use super::openai::OpenAiModel;
use super::traits::Model;
use super::types::{ModelConfig, ModelError, ProviderKind};
use crate::app::ProviderSelection;

/// Factory for creating the adapter that serves a selected provider
pub struct ModelFactory;

impl ModelFactory {
    /// Build the adapter for `selection`
    pub fn create(
        selection: &ProviderSelection,
        timeout_secs: u64,
    ) -> Result<Box<dyn Model>, ModelError> {
        let settings = &selection.settings;
        let api_key = selection.api_key.clone();

        info!(
            provider = %selection.provider,
            model = %settings.model_id,
            "creating model adapter"
        );

        let model: Box<dyn Model> = match selection.provider {
            ProviderKind::Gemini => Box::new(GeminiModel::new(
                &settings.model_id,
                &settings.base_url,
                api_key,
                timeout_secs,
            )?),
            ProviderKind::OpenAi => Box::new(OpenAiModel::new(
                &settings.model_id,
                &settings.base_url,
                api_key,
                timeout_secs,
            )?),
            ProviderKind::Anthropic => Box::new(AnthropicModel::new(
                &settings.model_id,
                &settings.base_url,
                api_key,
                timeout_secs,
            )?),
        };
        Ok(model)
    }

    /// Generation parameters for the selected provider
    pub fn model_config(selection: &ProviderSelection, system_prompt: &str) -> ModelConfig {
        ModelConfig {
            temperature: Some(selection.settings.temperature),
            max_tokens: Some(selection.settings.max_tokens),
            system_prompt: Some(system_prompt.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ModelSettings;

    fn selection(provider: ProviderKind) -> ProviderSelection {
        ProviderSelection {
            provider,
            settings: ModelSettings::default_for(provider),
            api_key: "test-key".to_string(),
            fell_back: false,
        }
    }

    #[test]
    fn test_create_matches_provider() {
        for provider in ProviderKind::PRIORITY {
            let model = ModelFactory::create(&selection(provider), 5).unwrap();
            assert_eq!(model.provider(), provider);
            assert_eq!(model.name(), ModelSettings::default_for(provider).model_id);
        }
    }

    #[test]
    fn test_model_config_uses_settings() {
        let config = ModelFactory::model_config(&selection(ProviderKind::Gemini), "hello");
        assert_eq!(config.max_tokens, Some(8192));
        assert_eq!(config.system_prompt.as_deref(), Some("hello"));
    }
}
