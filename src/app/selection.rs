use tracing::{info, warn};

use super::config::{Config, ModelSettings};
use super::credentials::Credentials;
use crate::models::ProviderKind;
use crate::utils::SupportError;

/// The provider chosen for a session, with everything needed to call it
#[derive(Clone)]
pub struct ProviderSelection {
    pub provider: ProviderKind,
    pub settings: ModelSettings,
    pub api_key: String,
    /// True when the preferred provider had no credential
    pub fell_back: bool,
}

impl std::fmt::Debug for ProviderSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSelection")
            .field("provider", &self.provider)
            .field("settings", &self.settings)
            .field("fell_back", &self.fell_back)
            .finish_non_exhaustive()
    }
}

/// Settings for a provider that has a credential
pub fn model_settings(
    config: &Config,
    credentials: &Credentials,
    provider: ProviderKind,
) -> Result<ModelSettings, SupportError> {
    if !credentials.is_available(provider) {
        return Err(SupportError::ProviderUnavailable(provider));
    }
    Ok(config.settings(provider).clone())
}

/// Pick the provider for this session.
///
/// The requested provider (or the configured default) wins when it has a
/// credential; otherwise the first available provider in priority order is
/// used. With no credential at all the operator gets `NoCredentials`.
pub fn select_provider(
    config: &Config,
    credentials: &Credentials,
    requested: Option<ProviderKind>,
) -> Result<ProviderSelection, SupportError> {
    let preferred = requested.unwrap_or(config.default_provider);

    let (provider, fell_back) = if credentials.is_available(preferred) {
        (preferred, false)
    } else {
        let fallback = credentials
            .available_providers()
            .into_iter()
            .next()
            .ok_or(SupportError::NoCredentials)?;
        warn!(
            requested = %preferred,
            using = %fallback,
            "requested provider has no API key, falling back"
        );
        (fallback, true)
    };

    let api_key = credentials
        .key(provider)
        .ok_or(SupportError::ProviderUnavailable(provider))?
        .to_string();

    info!(%provider, model = %config.settings(provider).model_id, "provider selected");

    Ok(ProviderSelection {
        provider,
        settings: config.settings(provider).clone(),
        api_key,
        fell_back,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(vars: &[&str]) -> Credentials {
        Credentials::from_lookup(|name| {
            vars.contains(&name).then(|| format!("key-for-{name}"))
        })
    }

    #[test]
    fn test_default_provider_when_available() {
        let selection =
            select_provider(&Config::default(), &creds(&["GOOGLE_API_KEY", "OPENAI_API_KEY"]), None)
                .unwrap();
        assert_eq!(selection.provider, ProviderKind::Gemini);
        assert_eq!(selection.api_key, "key-for-GOOGLE_API_KEY");
        assert_eq!(selection.settings.model_id, "gemini-2.0-flash");
        assert!(!selection.fell_back);
    }

    #[test]
    fn test_requested_provider_wins() {
        let selection = select_provider(
            &Config::default(),
            &creds(&["GOOGLE_API_KEY", "ANTHROPIC_API_KEY"]),
            Some(ProviderKind::Anthropic),
        )
        .unwrap();
        assert_eq!(selection.provider, ProviderKind::Anthropic);
        assert!(!selection.fell_back);
    }

    #[test]
    fn test_falls_back_in_priority_order() {
        let selection = select_provider(
            &Config::default(),
            &creds(&["ANTHROPIC_API_KEY", "OPENAI_API_KEY"]),
            Some(ProviderKind::Gemini),
        )
        .unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenAi);
        assert!(selection.fell_back);
    }

    #[test]
    fn test_configured_default_is_used() {
        let config = Config {
            default_provider: ProviderKind::Anthropic,
            ..Config::default()
        };
        let selection =
            select_provider(&config, &creds(&["GOOGLE_API_KEY", "ANTHROPIC_API_KEY"]), None)
                .unwrap();
        assert_eq!(selection.provider, ProviderKind::Anthropic);
    }

    #[test]
    fn test_no_credentials() {
        let err = select_provider(&Config::default(), &creds(&[]), None).unwrap_err();
        assert!(matches!(err, SupportError::NoCredentials));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_model_settings_requires_key() {
        let config = Config::default();
        let available = creds(&["OPENAI_API_KEY"]);
        assert_eq!(
            model_settings(&config, &available, ProviderKind::OpenAi).unwrap().model_id,
            "gpt-4o"
        );
        assert!(matches!(
            model_settings(&config, &available, ProviderKind::Gemini),
            Err(SupportError::ProviderUnavailable(ProviderKind::Gemini))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let selection =
            select_provider(&Config::default(), &creds(&["GOOGLE_API_KEY"]), None).unwrap();
        assert!(!format!("{selection:?}").contains("key-for"));
    }
}
