use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use url::Url;

use crate::llm::errors::LlmError;
use crate::llm::request::ProviderRequest;
use crate::llm::response::{error_message, parse_improved, reply_text};
use crate::llm::system_prompt::system_prompt;
use crate::llm::{Attachment, ImprovePrompt, ImprovedPrompt, ProviderConfig};

/// Default timeout of a whole improve request. Reasoning models can take a while.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Calls the vendor HTTP APIs.
#[derive(Debug, Clone)]
pub struct HttpImprover {
    client: Client,
    endpoint_override: Option<Url>,
}

impl HttpImprover {
    pub fn new() -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to build client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            endpoint_override: None,
        }
    }

    /// Sends every request to `endpoint` instead of the vendor URL, e.g. a proxy speaking the vendor's API.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint_override = Some(endpoint);
        self
    }

    fn endpoint(&self, request: &ProviderRequest, api_key: &str) -> Result<Url, LlmError> {
        match &self.endpoint_override {
            Some(endpoint) => Ok(endpoint.clone()),
            None => request
                .endpoint(api_key)
                .map_err(|e| LlmError::Transport(format!("Invalid endpoint: {}", e))),
        }
    }
}

#[async_trait]
impl ImprovePrompt for HttpImprover {
    async fn improve(&self,
                     prompt: &str,
                     config: &ProviderConfig,
                     attachments: &[Attachment]) -> Result<ImprovedPrompt, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let provider = config.provider;
        let system_prompt = system_prompt(config.explanation_style);
        let request = ProviderRequest::build(provider, &config.model, &system_prompt, prompt, attachments);
        let endpoint = self.endpoint(&request, &config.api_key)?;
        debug!("Improving prompt with {} model {} ({} attachments)", provider, config.model, attachments.len());

        let mut builder = self.client.post(endpoint).json(&request);
        for (name, value) in request.headers(&config.api_key) {
            builder = builder.header(name, value);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to reach {}: {}", provider.display_name(), e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to read {} response: {}", provider.display_name(), e)))?;

        if !status.is_success() {
            let message = error_message(provider, &body);
            warn!("{} returned {}: {}", provider, status, message);
            return Err(LlmError::Api { provider, status: status.as_u16(), message });
        }
        let text = reply_text(provider, &body)?;
        parse_improved(&text).map_err(|e| {
            warn!("{} reply is not the expected JSON:\n{}", provider, text);
            e
        })
    }
}

#[cfg(test)]
mod test_client {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;
    use url::Url;

    use crate::llm::errors::LlmError;
    use crate::llm::provider::Provider;
    use crate::llm::{ImprovePrompt, ProviderConfig};

    use super::HttpImprover;

    fn improver(endpoint: Url) -> HttpImprover {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpImprover::with_client(client).with_endpoint(endpoint)
    }

    /// Serves one canned response and hands back the raw request it received.
    async fn serve_once(status: &'static str, body: String) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            if name.eq_ignore_ascii_case("content-length") {
                                value.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_improve_openai() {
        let content = json!({"improvementPoints": ["add context"], "structuredPrompt": "Teach {{Topic}}"}).to_string();
        let body = json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string();
        let (url, server) = serve_once("200 OK", body).await;

        let improver = improver(url);
        let config = ProviderConfig::new(Provider::OpenAI, "sk-test");
        let improved = improver.improve("teach me", &config, &[]).await.unwrap();
        assert_eq!(vec!["add context".to_string()], improved.improvement_points);
        assert_eq!("Teach {{Topic}}", improved.structured_prompt);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST / HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains("\"json_object\""));
        assert!(request.contains("teach me"));
    }

    #[tokio::test]
    async fn test_improve_claude_fenced_reply() {
        let text = "```json\n{\"improvementPoints\": [], \"structuredPrompt\": \"Hi\"}\n```";
        let body = json!({"content": [{"type": "text", "text": text}]}).to_string();
        let (url, server) = serve_once("200 OK", body).await;

        let improver = improver(url);
        let config = ProviderConfig::new(Provider::Claude, "sk-ant");
        let improved = improver.improve("hi", &config, &[]).await.unwrap();
        assert_eq!("Hi", improved.structured_prompt);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.contains("x-api-key: sk-ant"));
        assert!(request.contains("anthropic-version: 2023-06-01"));
    }

    #[tokio::test]
    async fn test_improve_api_error() {
        let body = json!({"error": {"message": "API key not valid."}}).to_string();
        let (url, server) = serve_once("400 Bad Request", body).await;

        let improver = improver(url);
        let config = ProviderConfig::new(Provider::Gemini, "bad");
        let err = improver.improve("hi", &config, &[]).await.unwrap_err();
        assert_eq!(
            LlmError::Api { provider: Provider::Gemini, status: 400, message: "API key not valid.".to_string() },
            err
        );
        assert_eq!("API key not valid.", err.to_string());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let improver = HttpImprover::new().unwrap();
        let config = ProviderConfig::new(Provider::XAI, "  ");
        assert_eq!(Err(LlmError::MissingApiKey), improver.improve("hi", &config, &[]).await);
    }
}
