//! # Session
//! One prompt improvement session: the prompt being worked on, the LLM's answer and the values entered for its
//! placeholders.
//!
//! ## States
//! * [SessionState::Idle]: no structured prompt yet, or an improve request is running.
//! * [SessionState::NoPlaceholders]: the structured prompt has nothing to fill. It can be copied right away.
//! * [SessionState::Unfilled]: some placeholders are not filled. Copying requires the fill dialog first.
//! * [SessionState::Filled]: all placeholders are filled. It can be copied right away.
//!
//! A new improve request always resets to `Idle` and discards the values. Each request gets a [RequestTicket], and a
//! response whose ticket is not the latest is dropped, so a late answer never overwrites a newer one.
//!
//! ## Fill dialog
//! [PromptSession::open_fill_dialog] hands out a [FillDialog] working on a copy of the values. Options placeholders
//! holding a value that is not one of their options reopen in custom mode. [PromptSession::apply_fill_dialog] takes
//! the edited values over; dropping the dialog discards them.

use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

use anyhow::Result;
use log::{debug, info};

use crate::capture::{capture_prompt, CaptureError, PromptSource};
use crate::clipboard::{copy_text, ClipboardWriter};
use crate::filler::{placeholder_status, FieldMode, FillValues, PlaceholderStatus};
use crate::llm::errors::LlmError;
use crate::llm::{Attachment, ImprovePrompt, ImprovedPrompt, ProviderConfig};
use crate::placeholder::Placeholder;
use crate::prompt::errors::PlaceholderNotExist;
use crate::prompt::{PartialPrompt, StructuredPrompt};
use crate::utils::prompt_processing::normalize_line_endings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    NoPlaceholders,
    Unfilled,
    Filled,
}

/// Identifies one improve request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

/// What the copy action should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAction {
    /// There is nothing to copy.
    Nothing,
    /// Placeholders are unfilled, so the fill dialog has to be opened first.
    FillRequired,
    /// Copy this text.
    Copy(String),
}

#[derive(Debug, Default)]
pub struct PromptSession {
    prompt: String,
    improvement_points: Vec<String>,
    structured: Option<PartialPrompt>,
    error: Option<String>,
    in_flight: Option<RequestTicket>,
    issued: u64,
}

impl PromptSession {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Message of the last failure, if the last action failed.
    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[inline]
    pub fn improvement_points(&self) -> &[String] {
        &self.improvement_points
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn structured_prompt(&self) -> Option<&StructuredPrompt> {
        self.structured.as_ref().map(|partial| &partial.prompt)
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        match self.structured_prompt() {
            Some(prompt) => prompt.placeholders.as_slice(),
            None => &[],
        }
    }

    pub fn values(&self) -> Option<&FillValues> {
        self.structured.as_ref().map(PartialPrompt::values)
    }

    /// Values of the current structured prompt for direct editing.
    pub fn values_mut(&mut self) -> Option<&mut FillValues> {
        self.structured.as_mut().map(PartialPrompt::values_mut)
    }

    pub fn state(&self) -> SessionState {
        match &self.structured {
            None => SessionState::Idle,
            Some(partial) if !partial.prompt.has_placeholders() => SessionState::NoPlaceholders,
            Some(partial) if partial.is_complete() => SessionState::Filled,
            Some(_) => SessionState::Unfilled,
        }
    }

    pub fn placeholder_status(&self) -> Vec<PlaceholderStatus> {
        match &self.structured {
            Some(partial) => placeholder_status(&partial.prompt.placeholders, partial.values()),
            None => Vec::new(),
        }
    }

    /// Asks the page for its prompt text and takes it over. Whitespace-only text is taken over too, but reported as
    /// an error. Other failures leave the prompt as it was.
    pub async fn capture(&mut self, source: &dyn PromptSource) -> Result<(), CaptureError> {
        self.error = None;
        let result = capture_prompt(source).await;
        match &result {
            Ok(prompt) => self.prompt = prompt.clone(),
            Err(CaptureError::Empty { captured }) => self.prompt = captured.clone(),
            Err(_) => {}
        }
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result.map(|_| ())
    }

    /// Starts an improve request: clears the previous result and values.
    pub fn begin_improve(&mut self) -> Result<RequestTicket, SessionError> {
        if self.prompt.trim().is_empty() {
            self.error = Some(SessionError::EmptyPrompt.to_string());
            return Err(SessionError::EmptyPrompt);
        }
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }
        self.issued += 1;
        let ticket = RequestTicket(self.issued);
        self.in_flight = Some(ticket);
        self.error = None;
        self.improvement_points.clear();
        self.structured = None;
        Ok(ticket)
    }

    /// Takes over the outcome of the request identified by `ticket`. Returns `false`, changing nothing, if a newer
    /// request was started or the request was abandoned.
    pub fn finish_improve(&mut self, ticket: RequestTicket, result: Result<ImprovedPrompt, LlmError>) -> bool {
        if self.in_flight != Some(ticket) {
            debug!("Dropping response of stale request {:?}", ticket);
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(improved) => {
                self.improvement_points = improved.improvement_points;
                if !improved.structured_prompt.is_empty() {
                    let structured = StructuredPrompt::new(improved.structured_prompt);
                    info!("Received structured prompt with {} placeholders", structured.placeholders.len());
                    self.structured = Some(structured.construct_prompt());
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Gives up on the running request. Its response will be dropped.
    pub fn abandon_improve(&mut self) {
        self.in_flight = None;
    }

    /// Runs a whole improve request with `improver`.
    pub async fn improve(&mut self,
                         improver: &dyn ImprovePrompt,
                         config: &ProviderConfig,
                         attachments: &[Attachment]) -> Result<(), SessionError> {
        let ticket = self.begin_improve()?;
        let result = improver.improve(&self.prompt, config, attachments).await;
        let failed = result.as_ref().err().cloned();
        self.finish_improve(ticket, result);
        match failed {
            Some(e) => Err(SessionError::Llm(e)),
            None => Ok(()),
        }
    }

    /// Replaces the structured prompt with a user edit. Values stay attached to their ids, and ids that no longer
    /// exist are dropped.
    pub fn edit_structured_prompt(&mut self, text: impl Into<String>) {
        let values = self.structured.take().map(PartialPrompt::into_values).unwrap_or_default();
        self.structured = Some(StructuredPrompt::new(text).construct_prompt_with(values));
    }

    /// Text with emphasis markers for the current values.
    pub fn preview(&self) -> Option<String> {
        self.structured.as_ref().map(PartialPrompt::preview)
    }

    /// Final text with the current values, unfilled placeholders left as written.
    pub fn final_text(&self) -> Option<String> {
        self.structured.as_ref().map(PartialPrompt::substitute)
    }

    /// Opens the fill dialog on a copy of the current values.
    pub fn open_fill_dialog(&self) -> Option<FillDialog> {
        self.structured.as_ref().map(|partial| {
            let values = FillValues::reconstruct(&partial.prompt.placeholders, &partial.values().resolved());
            FillDialog {
                partial: partial.prompt.construct_prompt_with(values),
            }
        })
    }

    /// Takes over the values of `dialog`. Fails if the structured prompt changed since the dialog was opened.
    pub fn apply_fill_dialog(&mut self, dialog: FillDialog) -> Result<SessionState, SessionError> {
        let same_prompt = matches!(&self.structured, Some(current) if current.prompt == dialog.partial.prompt);
        if !same_prompt {
            return Err(SessionError::StaleDialog);
        }
        self.structured = Some(dialog.partial);
        Ok(self.state())
    }

    pub fn copy_action(&self) -> CopyAction {
        match (&self.structured, self.state()) {
            (None, _) => CopyAction::Nothing,
            (Some(_), SessionState::Unfilled) => CopyAction::FillRequired,
            (Some(partial), _) => CopyAction::Copy(normalize_line_endings(&partial.substitute())),
        }
    }

    /// Performs the copy action with `writer`. Nothing is written unless the action is [CopyAction::Copy].
    pub fn copy_to(&self, writer: &mut impl ClipboardWriter) -> Result<CopyAction> {
        let action = self.copy_action();
        if let CopyAction::Copy(text) = &action {
            copy_text(writer, text)?;
        }
        Ok(action)
    }
}

/// The fill dialog: one input per placeholder, a live preview, apply or cancel.
#[derive(Debug, Clone)]
pub struct FillDialog {
    partial: PartialPrompt,
}

impl FillDialog {
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.partial.prompt.placeholders
    }

    fn placeholder(&self, id: &str) -> Result<&Placeholder, PlaceholderNotExist> {
        self.partial.prompt.placeholder(id).ok_or_else(|| PlaceholderNotExist::new(id, "", self.placeholders()))
    }

    pub fn values(&self) -> &FillValues {
        self.partial.values()
    }

    /// How the input of `id` is presented.
    pub fn field_mode(&self, id: &str) -> Result<FieldMode, PlaceholderNotExist> {
        Ok(FieldMode::for_placeholder(self.placeholder(id)?, self.values()))
    }

    /// Types into a free-form input.
    pub fn set_text(&mut self, id: &str, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        self.partial.try_fill(id, value)?;
        Ok(self)
    }

    /// Picks an entry of a select. An empty option means "nothing selected".
    pub fn select_option(&mut self, id: &str, option: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        self.placeholder(id)?;
        self.partial.values_mut().select_option(id, option);
        Ok(self)
    }

    /// Picks the "Custom..." entry of a select.
    pub fn choose_custom(&mut self, id: &str) -> Result<&mut Self, PlaceholderNotExist> {
        self.placeholder(id)?;
        self.partial.values_mut().choose_custom(id);
        Ok(self)
    }

    /// Types into the custom input of a select.
    pub fn set_custom_text(&mut self, id: &str, text: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        self.placeholder(id)?;
        self.partial.values_mut().set_custom_text(id, text);
        Ok(self)
    }

    pub fn preview(&self) -> String {
        self.partial.preview()
    }

    pub fn all_filled(&self) -> bool {
        self.partial.is_complete()
    }

    pub fn status(&self) -> Vec<PlaceholderStatus> {
        placeholder_status(self.placeholders(), self.values())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Improve was requested without a prompt.
    EmptyPrompt,
    /// An improve request is already running.
    Busy,
    /// The structured prompt changed while a fill dialog was open.
    StaleDialog,
    /// The improve request failed.
    Llm(LlmError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyPrompt => write!(f, "Please enter or capture a prompt first."),
            SessionError::Busy => write!(f, "An improve request is already running."),
            SessionError::StaleDialog => write!(f, "The structured prompt changed while the dialog was open."),
            SessionError::Llm(e) => write!(f, "{}", e),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Llm(e) => Some(e),
            _ => None,
        }
    }
}
