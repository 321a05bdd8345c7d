use std::fmt;

use crate::constants::{PLACEHOLDER_KEY_PREFIX, VERTEX_AI_ENV};
use crate::models::ProviderKind;

/// API keys found in the environment, one slot per provider
#[derive(Clone, Default)]
pub struct Credentials {
    gemini: Option<String>,
    openai: Option<String>,
    anthropic: Option<String>,
    /// Reported by `status`; requests always go to the public Gemini API
    pub use_vertex_ai: bool,
}

impl Credentials {
    /// Read keys from the process environment (after `.env` has been loaded)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read keys through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = |provider: ProviderKind| usable_key(lookup(provider.api_key_env()));
        Self {
            gemini: key(ProviderKind::Gemini),
            openai: key(ProviderKind::OpenAi),
            anthropic: key(ProviderKind::Anthropic),
            use_vertex_ai: lookup(VERTEX_AI_ENV)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        }
    }

    pub fn key(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::Gemini => self.gemini.as_deref(),
            ProviderKind::OpenAi => self.openai.as_deref(),
            ProviderKind::Anthropic => self.anthropic.as_deref(),
        }
    }

    pub fn is_available(&self, provider: ProviderKind) -> bool {
        self.key(provider).is_some()
    }

    /// Providers with a credential, in priority order
    pub fn available_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::PRIORITY
            .into_iter()
            .filter(|p| self.is_available(*p))
            .collect()
    }
}

/// Empty values and untouched `.env.example` placeholders count as absent
fn usable_key(value: Option<String>) -> Option<String> {
    let value = value?.trim().to_string();
    if value.is_empty() || value.starts_with(PLACEHOLDER_KEY_PREFIX) {
        None
    } else {
        Some(value)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("gemini", &mask(&self.gemini))
            .field("openai", &mask(&self.openai))
            .field("anthropic", &mask(&self.anthropic))
            .field("use_vertex_ai", &self.use_vertex_ai)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn credentials(pairs: &[(&str, &str)]) -> Credentials {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Credentials::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_available_in_priority_order() {
        let creds = credentials(&[("ANTHROPIC_API_KEY", "sk-ant"), ("GOOGLE_API_KEY", "g-key")]);
        assert_eq!(
            creds.available_providers(),
            vec![ProviderKind::Gemini, ProviderKind::Anthropic]
        );
        assert!(!creds.is_available(ProviderKind::OpenAi));
        assert_eq!(creds.key(ProviderKind::Anthropic), Some("sk-ant"));
    }

    #[test]
    fn test_placeholders_and_blanks_are_absent() {
        let creds = credentials(&[
            ("GOOGLE_API_KEY", "your_google_api_key_here"),
            ("OPENAI_API_KEY", "   "),
        ]);
        assert!(creds.available_providers().is_empty());
    }

    #[test]
    fn test_vertex_flag_and_debug_masking() {
        let creds = credentials(&[
            ("GOOGLE_API_KEY", "secret-value"),
            ("GOOGLE_GENAI_USE_VERTEXAI", "TRUE"),
        ]);
        assert!(creds.use_vertex_ai);
        let printed = format!("{creds:?}");
        assert!(!printed.contains("secret-value"));
        assert!(printed.contains("<set>"));
    }
}
