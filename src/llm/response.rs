//! Response bodies of the provider APIs.

use serde::Deserialize;

use crate::llm::errors::LlmError;
use crate::llm::provider::Provider;
use crate::llm::ImprovedPrompt;
use crate::utils::postprocess::json::parse_json_reply;

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiTextPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    text: Option<String>,
}

/// `{"error": {"message": ...}}`, shared by all four vendors.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// The generated text of a successful response body.
pub fn reply_text(provider: Provider, body: &str) -> Result<String, LlmError> {
    let text = match provider {
        Provider::OpenAI | Provider::XAI => serde_json::from_str::<ChatCompletionsResponse>(body)
            .ok()
            .and_then(|r| r.choices.into_iter().next())
            .and_then(|choice| choice.message.content),
        Provider::Gemini => serde_json::from_str::<GenerateContentResponse>(body)
            .ok()
            .and_then(|r| r.candidates.into_iter().next())
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text),
        Provider::Claude => serde_json::from_str::<MessagesResponse>(body)
            .ok()
            .and_then(|r| r.content.into_iter().next())
            .and_then(|block| block.text),
    };
    text.ok_or(LlmError::UnparsableResponse)
}

/// Message to show for an error response body.
pub fn error_message(provider: Provider, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| provider.fallback_error().to_string())
}

/// Parses the generated text into an [ImprovedPrompt]. A surrounding ```` ```json ```` fence is tolerated.
pub fn parse_improved(text: &str) -> Result<ImprovedPrompt, LlmError> {
    parse_json_reply(text).map_err(|_| LlmError::UnparsableResponse)
}

#[cfg(test)]
mod test_response {
    use serde_json::json;

    use crate::llm::errors::LlmError;
    use crate::llm::provider::Provider;

    use super::{error_message, parse_improved, reply_text};

    #[test]
    fn test_reply_text() {
        let openai = json!({"choices": [{"message": {"role": "assistant", "content": "A"}}]}).to_string();
        assert_eq!("A", reply_text(Provider::OpenAI, &openai).unwrap());
        assert_eq!("A", reply_text(Provider::XAI, &openai).unwrap());

        let gemini = json!({"candidates": [{"content": {"parts": [{"text": "G"}], "role": "model"}}]}).to_string();
        assert_eq!("G", reply_text(Provider::Gemini, &gemini).unwrap());

        let claude = json!({"content": [{"type": "text", "text": "C"}], "stop_reason": "end_turn"}).to_string();
        assert_eq!("C", reply_text(Provider::Claude, &claude).unwrap());
    }

    #[test]
    fn test_reply_text_missing() {
        assert_eq!(Err(LlmError::UnparsableResponse), reply_text(Provider::OpenAI, "{\"choices\": []}"));
        assert_eq!(Err(LlmError::UnparsableResponse), reply_text(Provider::Gemini, "not json"));
        assert_eq!(Err(LlmError::UnparsableResponse), reply_text(Provider::Claude, "{}"));
    }

    #[test]
    fn test_error_message() {
        let body = json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}).to_string();
        assert_eq!("Incorrect API key provided", error_message(Provider::OpenAI, &body));
        assert_eq!("Gemini API Error", error_message(Provider::Gemini, "<html>bad gateway</html>"));
        assert_eq!("Claude API Error", error_message(Provider::Claude, "{\"error\": {}}"));
    }

    #[test]
    fn test_parse_improved() {
        let improved = parse_improved("```json\n{\"improvementPoints\": [\"be specific\"], \"structuredPrompt\": \"Do {{X}}\"}\n```").unwrap();
        assert_eq!(vec!["be specific".to_string()], improved.improvement_points);
        assert_eq!("Do {{X}}", improved.structured_prompt);

        let improved = parse_improved("{\"structuredPrompt\": \"only prompt\"}").unwrap();
        assert!(improved.improvement_points.is_empty());

        assert_eq!(Err(LlmError::UnparsableResponse), parse_improved("I cannot help with that."));
    }
}
