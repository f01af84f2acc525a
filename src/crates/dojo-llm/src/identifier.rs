//! Model identifier strings.
//!
//! Two spellings are accepted, as used by the example agents:
//!
//! - `provider:model`, e.g. `openai:gpt-4o`
//! - `provider/model`, e.g. `deepseek/deepseek-chat`,
//!   `openrouter/anthropic/claude-3.5-sonnet` (only the first `/` splits)
//!
//! A bare model name with neither separator is treated as an OpenAI model.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model providers reachable through an OpenAI-compatible chat-completions API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    DeepSeek,
    OpenRouter,
    Xai,
    Anthropic,
    Gemini,
}

impl Provider {
    /// Canonical prefix used in identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::OpenRouter => "openrouter",
            Provider::Xai => "xai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    /// Default OpenAI-compatible endpoint
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Xai => "https://api.x.ai/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Xai => "XAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Environment variable that overrides the endpoint, e.g. `OPENAI_BASE_URL`
    pub fn base_url_env(&self) -> String {
        format!("{}_BASE_URL", self.as_str().to_ascii_uppercase())
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "deepseek" => Some(Provider::DeepSeek),
            "openrouter" => Some(Provider::OpenRouter),
            "xai" | "grok" => Some(Provider::Xai),
            "anthropic" => Some(Provider::Anthropic),
            "gemini" | "google" | "google_genai" => Some(Provider::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `provider:model` / `provider/model` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelIdentifier {
    pub provider: Provider,
    pub model: String,
}

impl ModelIdentifier {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LlmError::InvalidModelIdentifier(
                "identifier is empty".to_string(),
            ));
        }

        for separator in [':', '/'] {
            if let Some((prefix, model)) = raw.split_once(separator) {
                if let Some(provider) = Provider::from_prefix(prefix) {
                    return Self::checked(provider, model, raw);
                }
            }
        }

        if raw.contains(':') || raw.contains('/') {
            let prefix = raw
                .split(|c| c == ':' || c == '/')
                .next()
                .unwrap_or_default();
            return Err(LlmError::UnknownProvider(prefix.to_string()));
        }

        Self::checked(Provider::OpenAi, raw, raw)
    }

    fn checked(provider: Provider, model: &str, raw: &str) -> Result<Self> {
        let model = model.trim();
        if model.is_empty() {
            return Err(LlmError::InvalidModelIdentifier(format!(
                "'{}' has no model name",
                raw
            )));
        }
        Ok(Self::new(provider, model))
    }
}

impl FromStr for ModelIdentifier {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}
