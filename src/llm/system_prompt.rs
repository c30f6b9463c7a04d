use serde::{Deserialize, Serialize};

use crate::placeholder::OPTION_SEPARATOR;

/// How the improved prompt should ask the final responder to explain things.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExplanationStyle {
    Eli5,
    #[default]
    BeginnerFriendly,
    Technical,
    Concise,
    #[serde(rename = "none")]
    Unstyled,
}

impl ExplanationStyle {
    pub const ALL: [ExplanationStyle; 5] = [
        ExplanationStyle::Eli5,
        ExplanationStyle::BeginnerFriendly,
        ExplanationStyle::Technical,
        ExplanationStyle::Concise,
        ExplanationStyle::Unstyled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExplanationStyle::Eli5 => "Explain like I'm 5",
            ExplanationStyle::BeginnerFriendly => "Beginner friendly",
            ExplanationStyle::Technical => "Technical",
            ExplanationStyle::Concise => "Concise",
            ExplanationStyle::Unstyled => "None",
        }
    }

    /// Sentence appended to the system prompt, empty for [ExplanationStyle::Unstyled].
    pub fn instruction(&self) -> &'static str {
        match self {
            ExplanationStyle::Eli5 => "The Structured Prompt must require the AI (the final responder) to explain its answers \
            as if explaining to a 5-year-old child, using very simple words and everyday examples.",
            ExplanationStyle::BeginnerFriendly => "The Structured Prompt must require the AI (the final responder) to explain \
            its answers in simple, clear, beginner-friendly language that a middle-school student can easily understand.",
            ExplanationStyle::Technical => "The Structured Prompt must require the AI (the final responder) to provide \
            detailed, technically accurate explanations using appropriate domain-specific terminology.",
            ExplanationStyle::Concise => "The Structured Prompt must require the AI (the final responder) to provide concise, \
            to-the-point explanations without unnecessary details.",
            ExplanationStyle::Unstyled => "",
        }
    }
}

/// System prompt asking the LLM for improvement points and a structured prompt, as JSON.
///
/// The placeholder format it teaches is exactly what [crate::placeholder::extract_placeholders] parses.
pub fn system_prompt(style: ExplanationStyle) -> String {
    let instruction = style.instruction();
    let style_line = if instruction.is_empty() {
        String::new()
    } else {
        format!("{}\n", instruction)
    };
    let sep = OPTION_SEPARATOR;
    format!(r#"
You are a professional Prompt Engineer. Your task is to review the user's prompt and provide:
1. Improvement Points: What is missing, ambiguous, or could be better.
2. Structured Prompt: A rewritten version of the prompt using best practices (e.g., clear context, constraints, output format).
The Structured Prompt must be written in the same language as the user's original message (unless the user explicitly requests another language).
{style_line}
When the structured prompt requires user-specific information (e.g., skill level, priorities, specific requirements), use placeholders in the following format:
- For predefined options: {{{{Label: [option1{sep} option2{sep} option3]}}}}
  Example: Skill Level: {{{{Your Skill Level: [Beginner{sep} Intermediate{sep} Advanced{sep} Expert]}}}}
- For free-form input: {{{{Description of what to enter}}}}
  Example: Specific project requirements: {{{{Your specific project requirements}}}}
Never use the characters "}}" inside a placeholder.
**All placeholder descriptions must be written in the same language as the user's original message.**

Output your response in the following JSON format ONLY:
{{
  "improvementPoints": ["point 1", "point 2", ...],
  "structuredPrompt": "The full rewritten prompt..."
}}
"#)
}

#[cfg(test)]
mod test_system_prompt {
    use crate::placeholder::extract_placeholders;

    use super::{system_prompt, ExplanationStyle};

    #[test]
    fn test_style_instruction_included() {
        let prompt = system_prompt(ExplanationStyle::Technical);
        assert!(prompt.contains(ExplanationStyle::Technical.instruction()));
        let prompt = system_prompt(ExplanationStyle::Unstyled);
        assert!(!prompt.contains("The Structured Prompt must require"));
    }

    #[test]
    fn test_examples_parse_as_placeholders() {
        let prompt = system_prompt(ExplanationStyle::default());
        let placeholders = extract_placeholders(&prompt);
        let skill = placeholders
            .iter()
            .find(|p| p.label == "Your Skill Level")
            .expect("the options example should be a placeholder");
        assert_eq!(4, skill.options().len());
        assert!(placeholders.iter().any(|p| p.label == "Your specific project requirements" && !p.has_options()));
    }

    #[test]
    fn test_style_names() {
        assert_eq!("\"beginnerFriendly\"", serde_json::to_string(&ExplanationStyle::BeginnerFriendly).unwrap());
        assert_eq!("\"none\"", serde_json::to_string(&ExplanationStyle::Unstyled).unwrap());
        assert_eq!(ExplanationStyle::Eli5, serde_json::from_str("\"eli5\"").unwrap());
    }
}
