//! # prompt-assistant
//!
//! Placeholder-aware prompt improvement.
//!
//! A user's prompt goes to an LLM, which returns improvement points and a rewritten, *structured* prompt. The
//! structured prompt may contain placeholders for details only the user knows. The user fills them, and the filled
//! prompt is copied out.
//!
//! ## Placeholder
//!
//! A placeholder is a slot in a structured prompt, written in double braces.
//!
//! ```text
//! Write a cover letter for {{Job title}} at a {{Company size: [startup;;enterprise]}}.
//! ```
//!
//! * `{{Job title}}` is a free-form placeholder with label `"Job title"`.
//! * `{{Company size: [startup;;enterprise]}}` is an options placeholder with label `"Company size"` and options
//!   `startup` and `enterprise`. Options are separated by `;;`, so an option may contain commas.
//!
//! Placeholders are identified by their position: `placeholder-0`, `placeholder-1` and so on. See
//! [`extract_placeholders`](crate::placeholder::extract_placeholders).
//!
//! ## Structured Prompt and Partial Prompt
//!
//! A [`StructuredPrompt`](crate::prompt::StructuredPrompt) is the text with its placeholders. A
//! [`PartialPrompt`](crate::prompt::PartialPrompt) comes only from `StructuredPrompt::construct_prompt` and records
//! which placeholder got filled by what value. A placeholder counts as filled when its value is not blank.
//!
//! At any time a partial prompt renders a preview, where filled placeholders show as `**value**` and unfilled ones as
//! `**[label]**`, or the final text, where unfilled placeholders stay as written.
//!
//! ## Filler
//!
//! Values live in [`FillValues`](crate::filler::FillValues). An options placeholder is filled by selecting one of its
//! options or by switching to "Custom..." and typing any value. The custom marker is never a value.
//!
//! ## LLM
//!
//! [`ImprovePrompt`](crate::llm::ImprovePrompt) is the improvement call. [`HttpImprover`](crate::llm::client::HttpImprover)
//! speaks to OpenAI, Gemini, Claude and xAI. Replies are parsed leniently, since models like to wrap JSON in code
//! fences.
//!
//! ## Session
//!
//! [`PromptSession`](crate::session::PromptSession) ties it together: capture or type a prompt, improve it, fill the
//! placeholders in a [`FillDialog`](crate::session::FillDialog), and copy the result.
//!
//! ## Languages
//!
//! Settings carry the UI [`Language`](crate::i18n::Language), English or Japanese, detected from the locale when none
//! is stored. [`Catalog`](crate::i18n::Catalog) looks up messages with `{{name}}` parameters.
//!
//! ## Features
//! * `terminal_printing` (default): render previews in a terminal, see [`utils::printing`](crate::utils::printing).
//! * `system_clipboard`: copy to the OS clipboard with `clipboard::SystemClipboard`.
//!

pub mod capture;
pub mod clipboard;
pub mod filler;
pub mod i18n;
pub mod llm;
pub mod placeholder;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod utils;
