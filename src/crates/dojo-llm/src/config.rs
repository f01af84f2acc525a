//! Connection settings for remote model providers.

use crate::error::{LlmError, Result};
use crate::identifier::ModelIdentifier;
use std::time::Duration;

/// Configuration for an OpenAI-compatible remote provider.
#[derive(Debug, Clone)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,

    /// Model name as sent to the provider.
    pub model: String,

    /// Request timeout duration.
    pub timeout: Duration,

    /// Organization ID, sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,
}

impl RemoteLlmConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
            organization: None,
        }
    }

    /// Resolve API key and endpoint for `id` from the process environment.
    pub fn from_identifier(id: &ModelIdentifier) -> Result<Self> {
        Self::from_identifier_with(id, |key| std::env::var(key).ok())
    }

    /// Resolve API key and endpoint for `id` through `lookup`.
    ///
    /// The key comes from the provider's key variable (`OPENAI_API_KEY`, ...);
    /// the endpoint defaults to the provider's public URL unless
    /// `<PROVIDER>_BASE_URL` is set.
    pub fn from_identifier_with<F>(id: &ModelIdentifier, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key_var = id.provider.api_key_env();
        let api_key = lookup(key_var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::ApiKeyNotFound(format!("Environment variable: {}", key_var)))?;

        let base_url = lookup(&id.provider.base_url_env())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| id.provider.default_base_url().to_string());

        let mut config = Self::new(api_key, base_url.trim_end_matches('/'), id.model.clone());
        if id.provider == crate::identifier::Provider::OpenAi {
            config.organization = lookup("OPENAI_ORGANIZATION");
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolves_default_endpoint() {
        let id = ModelIdentifier::parse("openai:gpt-4o").unwrap();
        let config = RemoteLlmConfig::from_identifier_with(&id, env(&[("OPENAI_API_KEY", "sk-test")]))
            .unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_base_url_override() {
        let id = ModelIdentifier::parse("deepseek/deepseek-chat").unwrap();
        let config = RemoteLlmConfig::from_identifier_with(
            &id,
            env(&[
                ("DEEPSEEK_API_KEY", "ds-key"),
                ("DEEPSEEK_BASE_URL", "http://localhost:9999/v1/"),
            ]),
        )
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let id = ModelIdentifier::parse("openai:gpt-4o").unwrap();
        let err = RemoteLlmConfig::from_identifier_with(&id, env(&[("OPENAI_API_KEY", "  ")]))
            .unwrap_err();

        assert!(err.is_auth_error());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
