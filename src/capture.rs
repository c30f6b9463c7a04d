//! Capturing the prompt typed into the page.
//!
//! The side panel asks the page with a [CaptureRequest] and gets a [CaptureResponse] carrying the text of the focused
//! editable element. [interpret_capture] turns that into prompt text or a message for the user.

use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

/// Action asking the page for the focused element's text.
pub const GET_PROMPT: &str = "GET_PROMPT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub action: String,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self { action: GET_PROMPT.to_string() }
    }
}

/// Reply of the page. `prompt` is empty when no editable element was found, and `error` may tell why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResponse {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Anything that can be asked for the page's prompt text.
#[async_trait]
pub trait PromptSource: Send + Sync {
    /// `Ok(None)` when the page did not answer.
    async fn request(&self, request: CaptureRequest) -> anyhow::Result<Option<CaptureResponse>>;
}

/// Why no prompt was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The focused element holds only whitespace, which is still taken over as the prompt.
    Empty { captured: String },
    /// No text was found.
    NoText,
    /// The page or the messaging failed.
    Failed(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Empty { .. } => write!(f, "Captured text is empty. Please focus on a text input and try again."),
            CaptureError::NoText => write!(f, "No text found in active input. Please click inside a text field first."),
            CaptureError::Failed(reason) => write!(f, "Failed to capture: {}", reason),
        }
    }
}

impl Error for CaptureError {}

/// Prompt text of a capture reply. An error reported by the page only counts as "no text".
pub fn interpret_capture(response: Option<CaptureResponse>) -> Result<String, CaptureError> {
    match response {
        Some(CaptureResponse { prompt, .. }) if !prompt.is_empty() => {
            if prompt.trim().is_empty() {
                Err(CaptureError::Empty { captured: prompt })
            } else {
                Ok(prompt)
            }
        }
        Some(CaptureResponse { error: Some(reason), .. }) => {
            warn!("Page could not capture a prompt: {}", reason);
            Err(CaptureError::NoText)
        }
        _ => Err(CaptureError::NoText),
    }
}

/// Asks `source` for the prompt text.
pub async fn capture_prompt(source: &dyn PromptSource) -> Result<String, CaptureError> {
    let response = source
        .request(CaptureRequest::default())
        .await
        .map_err(|e| CaptureError::Failed(e.to_string()))?;
    interpret_capture(response)
}

#[cfg(test)]
mod test_capture {
    use async_trait::async_trait;

    use super::{capture_prompt, interpret_capture, CaptureError, CaptureRequest, CaptureResponse, PromptSource, GET_PROMPT};

    fn reply(prompt: &str) -> Option<CaptureResponse> {
        Some(CaptureResponse { prompt: prompt.to_string(), error: None })
    }

    #[test]
    fn test_interpret() {
        assert_eq!(Ok("hello".to_string()), interpret_capture(reply("hello")));
        assert_eq!(Err(CaptureError::Empty { captured: " \n ".to_string() }), interpret_capture(reply(" \n ")));
        assert_eq!(Err(CaptureError::NoText), interpret_capture(reply("")));
        assert_eq!(Err(CaptureError::NoText), interpret_capture(None));
        let failed = Some(CaptureResponse { prompt: String::new(), error: Some("boom".to_string()) });
        assert_eq!(Err(CaptureError::NoText), interpret_capture(failed));
        assert_eq!(
            "Failed to capture: boom",
            CaptureError::Failed("boom".to_string()).to_string()
        );
    }

    #[test]
    fn test_message_shapes() {
        assert_eq!("{\"action\":\"GET_PROMPT\"}", serde_json::to_string(&CaptureRequest::default()).unwrap());
        let response: CaptureResponse = serde_json::from_str("{\"prompt\": \"hi\"}").unwrap();
        assert_eq!(reply("hi"), Some(response));
    }

    struct FixedSource(Option<CaptureResponse>);

    #[async_trait]
    impl PromptSource for FixedSource {
        async fn request(&self, request: CaptureRequest) -> anyhow::Result<Option<CaptureResponse>> {
            assert_eq!(GET_PROMPT, request.action);
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl PromptSource for BrokenSource {
        async fn request(&self, _request: CaptureRequest) -> anyhow::Result<Option<CaptureResponse>> {
            anyhow::bail!("Could not establish connection. Receiving end does not exist.")
        }
    }

    #[tokio::test]
    async fn test_capture_prompt() {
        assert_eq!(Ok("typed".to_string()), capture_prompt(&FixedSource(reply("typed"))).await);
        assert_eq!(
            Err(CaptureError::Failed("Could not establish connection. Receiving end does not exist.".to_string())),
            capture_prompt(&BrokenSource).await
        );
    }
}
