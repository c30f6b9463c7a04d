//! Request bodies of the provider APIs.
//!
//! [ProviderRequest] is a tagged variant with one explicit body per vendor. It serializes to the bare body of the
//! selected vendor; the URL and headers come from [ProviderRequest::endpoint] and [ProviderRequest::headers].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use url::Url;

use crate::llm::provider::Provider;
use crate::llm::Attachment;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const XAI_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
pub const GEMINI_MODELS_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const CLAUDE_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const CLAUDE_API_VERSION: &str = "2023-06-01";
pub const CLAUDE_MAX_TOKENS: u32 = 4096;

/// The request for one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderRequest {
    OpenAI(ChatCompletionsBody),
    Gemini(GenerateContentBody),
    Claude(MessagesBody),
    XAI(ChatCompletionsBody),
}

impl ProviderRequest {
    /// Builds the request asking `model` of `provider` to improve `user_prompt`.
    pub fn build(provider: Provider,
                 model: &str,
                 system_prompt: &str,
                 user_prompt: &str,
                 attachments: &[Attachment]) -> Self {
        match provider {
            Provider::OpenAI => ProviderRequest::OpenAI(ChatCompletionsBody::new(model, system_prompt, user_prompt, attachments)),
            Provider::XAI => ProviderRequest::XAI(ChatCompletionsBody::new(model, system_prompt, user_prompt, attachments)),
            Provider::Gemini => ProviderRequest::Gemini(GenerateContentBody::new(model, system_prompt, user_prompt, attachments)),
            Provider::Claude => ProviderRequest::Claude(MessagesBody::new(model, system_prompt, user_prompt, attachments)),
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ProviderRequest::OpenAI(_) => Provider::OpenAI,
            ProviderRequest::Gemini(_) => Provider::Gemini,
            ProviderRequest::Claude(_) => Provider::Claude,
            ProviderRequest::XAI(_) => Provider::XAI,
        }
    }

    /// URL to POST the body to. Gemini takes the API key as a query parameter.
    pub fn endpoint(&self, api_key: &str) -> Result<Url, url::ParseError> {
        match self {
            ProviderRequest::OpenAI(_) => Url::parse(OPENAI_ENDPOINT),
            ProviderRequest::XAI(_) => Url::parse(XAI_ENDPOINT),
            ProviderRequest::Claude(_) => Url::parse(CLAUDE_ENDPOINT),
            ProviderRequest::Gemini(body) => Url::parse_with_params(
                &format!("{}/{}:generateContent", GEMINI_MODELS_ENDPOINT, body.model),
                &[("key", api_key)],
            ),
        }
    }

    /// Headers besides `Content-Type`.
    pub fn headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        match self {
            ProviderRequest::OpenAI(_) | ProviderRequest::XAI(_) => {
                vec![("Authorization", format!("Bearer {}", api_key))]
            }
            ProviderRequest::Gemini(_) => Vec::new(),
            ProviderRequest::Claude(_) => vec![
                ("x-api-key", api_key.to_string()),
                ("anthropic-version", CLAUDE_API_VERSION.to_string()),
                ("anthropic-dangerous-direct-browser-access", "true".to_string()),
            ],
        }
    }
}

fn data_url(attachment: &Attachment) -> String {
    format!("data:{};base64,{}", attachment.mime_type, BASE64.encode(&attachment.data))
}

// OpenAI and xAI chat completions

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionsBody {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

impl ChatCompletionsBody {
    fn new(model: &str, system_prompt: &str, user_prompt: &str, attachments: &[Attachment]) -> Self {
        let user_content = if attachments.is_empty() {
            ChatContent::Text(user_prompt.to_string())
        } else {
            let mut parts = vec![ChatContentPart::Text { text: user_prompt.to_string() }];
            parts.extend(attachments.iter().map(|a| ChatContentPart::ImageUrl { image_url: ImageUrl { url: data_url(a) } }));
            ChatContent::Parts(parts)
        };
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: ChatContent::Text(system_prompt.to_string()) },
                ChatMessage { role: "user".to_string(), content: user_content },
            ],
            response_format: ResponseFormat { kind: "json_object".to_string() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

// Gemini generateContent

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentBody {
    /// Part of the URL, not the body.
    #[serde(skip)]
    pub model: String,
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentBody {
    fn new(model: &str, system_prompt: &str, user_prompt: &str, attachments: &[Attachment]) -> Self {
        let mut parts = vec![GeminiPart::Text { text: format!("{}\n\nUser Prompt:\n{}", system_prompt, user_prompt) }];
        parts.extend(attachments.iter().map(|a| GeminiPart::InlineData {
            inline_data: InlineData { mime_type: a.mime_type.clone(), data: BASE64.encode(&a.data) },
        }));
        Self {
            model: model.to_string(),
            contents: vec![GeminiContent { parts }],
            generation_config: GenerationConfig { response_mime_type: "application/json".to_string() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

// Claude messages

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesBody {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<ClaudeMessage>,
}

impl MessagesBody {
    fn new(model: &str, system_prompt: &str, user_prompt: &str, attachments: &[Attachment]) -> Self {
        let content = if attachments.is_empty() {
            ClaudeContent::Text(user_prompt.to_string())
        } else {
            let mut blocks: Vec<ClaudeBlock> = attachments
                .iter()
                .map(|a| ClaudeBlock::Image {
                    source: ClaudeImageSource {
                        kind: "base64".to_string(),
                        media_type: a.mime_type.clone(),
                        data: BASE64.encode(&a.data),
                    },
                })
                .collect();
            blocks.push(ClaudeBlock::Text { text: user_prompt.to_string() });
            ClaudeContent::Blocks(blocks)
        };
        Self {
            model: model.to_string(),
            max_tokens: CLAUDE_MAX_TOKENS,
            system: system_prompt.to_string(),
            messages: vec![ClaudeMessage { role: "user".to_string(), content }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaudeMessage {
    pub role: String,
    pub content: ClaudeContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClaudeContent {
    Text(String),
    Blocks(Vec<ClaudeBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeBlock {
    Text { text: String },
    Image { source: ClaudeImageSource },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaudeImageSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}
