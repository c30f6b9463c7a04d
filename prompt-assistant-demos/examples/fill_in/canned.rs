use async_trait::async_trait;
use prompt_assistant::llm::errors::LlmError;
use prompt_assistant::llm::{Attachment, ImprovePrompt, ImprovedPrompt, ProviderConfig};

/// Answers every prompt with the same structured prompt, for trying the fill loop without an API key.
pub struct CannedImprover;

#[async_trait]
impl ImprovePrompt for CannedImprover {
    async fn improve(&self,
                     prompt: &str,
                     _config: &ProviderConfig,
                     _attachments: &[Attachment]) -> Result<ImprovedPrompt, LlmError> {
        Ok(ImprovedPrompt {
            improvement_points: vec![
                "State who the answer is for.".to_string(),
                "Ask for a concrete output format.".to_string(),
            ],
            structured_prompt: format!(
                "{}\n\nExplain it to a {{{{Audience: [beginner;;practitioner;;expert]}}}} \
                as a {{{{Format: [bullet list;;short essay]}}}}, focusing on {{{{Focus area}}}}.",
                prompt.trim()
            ),
        })
    }
}
