//! # LLM
//! The prompt improvement call. An LLM receives the user's prompt with a [system prompt](system_prompt::system_prompt)
//! and replies with improvement points and a structured prompt, as JSON.
//!
//! Anything that answers such a call implements [ImprovePrompt]. [HttpImprover](client::HttpImprover) talks to the
//! vendors directly. Errors collapse into [LlmError](errors::LlmError), whose `Display` is the message to show.

pub mod client;
pub mod provider;
pub mod request;
pub mod response;
pub mod system_prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm::errors::LlmError;
use crate::llm::provider::Provider;
use crate::llm::system_prompt::ExplanationStyle;

/// The reply of a prompt improvement call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovedPrompt {
    #[serde(default)]
    pub improvement_points: Vec<String>,
    #[serde(default)]
    pub structured_prompt: String,
}

/// Everything needed to address one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub explanation_style: ExplanationStyle,
}

impl ProviderConfig {
    /// Config for `provider` with its default model and the default explanation style.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            explanation_style: ExplanationStyle::default(),
        }
    }

    /// Uses `model`, or the provider default when `model` is blank.
    pub fn with_model(mut self, model: &str) -> Self {
        let model = model.trim();
        self.model = if model.is_empty() { self.provider.default_model() } else { model }.to_string();
        self
    }

    pub fn with_explanation_style(mut self, style: ExplanationStyle) -> Self {
        self.explanation_style = style;
        self
    }
}

/// An image sent along with the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Improves a prompt with an LLM.
#[async_trait]
pub trait ImprovePrompt: Send + Sync {
    async fn improve(&self,
                     prompt: &str,
                     config: &ProviderConfig,
                     attachments: &[Attachment]) -> Result<ImprovedPrompt, LlmError>;
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    use crate::llm::provider::Provider;

    /// Failure of a prompt improvement call. `Display` gives the single message shown to the user.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum LlmError {
        /// No API key configured.
        MissingApiKey,
        /// A provider name that is not one of [Provider::ALL].
        InvalidProvider(String),
        /// The vendor answered with a non-success status.
        Api { provider: Provider, status: u16, message: String },
        /// The reply could not be read as improvement points and a structured prompt.
        UnparsableResponse,
        /// The request did not get a response.
        Transport(String),
    }

    impl fmt::Display for LlmError {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            match self {
                LlmError::MissingApiKey => write!(f, "API Key is missing."),
                LlmError::InvalidProvider(_) => write!(f, "Invalid provider selected."),
                LlmError::Api { message, .. } => write!(f, "{}", message),
                LlmError::UnparsableResponse => write!(f, "Failed to parse AI response as JSON."),
                LlmError::Transport(message) => write!(f, "{}", message),
            }
        }
    }

    impl Error for LlmError {}
}
