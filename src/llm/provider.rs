use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::llm::errors::LlmError;

/// The LLM vendors a prompt can be improved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    #[default]
    Gemini,
    Claude,
    XAI,
}

impl Provider {
    pub const ALL: [Provider; 4] = [Provider::OpenAI, Provider::Gemini, Provider::Claude, Provider::XAI];

    /// Storage value of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::XAI => "xai",
        }
    }

    /// Human-readable vendor name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Gemini => "Google Gemini",
            Provider::Claude => "Anthropic Claude",
            Provider::XAI => "xAI",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-5-mini",
            Provider::Gemini => "gemini-2.5-pro",
            Provider::Claude => "claude-sonnet-4-5",
            Provider::XAI => "grok-4-0709",
        }
    }

    /// Settings key holding the model name for this provider.
    pub fn model_key(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openaiModel",
            Provider::Gemini => "geminiModel",
            Provider::Claude => "claudeModel",
            Provider::XAI => "xaiModel",
        }
    }

    /// Message used when an error response carries no message of its own.
    pub(crate) fn fallback_error(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI API Error",
            Provider::Gemini => "Gemini API Error",
            Provider::Claude => "Claude API Error",
            Provider::XAI => "xAI API Error",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| LlmError::InvalidProvider(s.to_string()))
    }
}

#[cfg(test)]
mod test_provider {
    use super::Provider;

    #[test]
    fn test_round_trip_names() {
        for provider in Provider::ALL {
            assert_eq!(Ok(provider), provider.as_str().parse::<Provider>());
            assert_eq!(format!("\"{}\"", provider), serde_json::to_string(&provider).unwrap());
        }
        assert!("bard".parse::<Provider>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Provider::Gemini, Provider::default());
        assert_eq!("claude-sonnet-4-5", Provider::Claude.default_model());
        assert_eq!("xaiModel", Provider::XAI.model_key());
    }
}
