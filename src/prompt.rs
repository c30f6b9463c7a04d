//! # Prompt
//! A structured prompt is the rewritten prompt an LLM returns. It may contain placeholders (see [crate::placeholder]).
//!
//! ## StructuredPrompt
//! A [StructuredPrompt] is the text together with its extracted placeholders. Extraction happens once, on construction.
//!
//! ## PartialPrompt
//! A partial prompt is a structured prompt with some placeholders filled. A partial prompt can be only constructed
//! from a structured prompt via [StructuredPrompt::construct_prompt].
//!
//! Values are entered via [PartialPrompt::fill] or [PartialPrompt::try_fill], or directly through
//! [PartialPrompt::values_mut]. At any time, [PartialPrompt::preview] renders the text with emphasis markers, and
//! [PartialPrompt::substitute] renders the final text with unfilled placeholders left as they are. When all
//! placeholders are filled, [PartialPrompt::complete] gives the final text.
//!
//! ## Substitution
//! Both renderings walk the placeholders in extraction order over the running result and replace **every**
//! occurrence of a placeholder's `raw` text. Two placeholders with identical `raw` text are therefore coupled: the
//! first one that gets replaced takes all occurrences, so they always end up with the same value.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};

use crate::filler::{all_filled, is_filled, FillValues, ValueSource};
use crate::placeholder::{extract_placeholders, Placeholder};
use crate::prompt::errors::{PlaceholderNotExist, UnfilledPlaceholders};

/// Renders `text` for preview: filled placeholders become `**value**`, unfilled ones `**[label]**`.
pub fn preview(text: &str, placeholders: &[Placeholder], values: &impl ValueSource) -> String {
    placeholders.iter().fold(text.to_string(), |result, placeholder| {
        let replacement = match values.value_of(&placeholder.id) {
            Some(value) if is_filled(placeholder, values) => format!("**{}**", value),
            _ => format!("**[{}]**", placeholder.label),
        };
        result.replace(&placeholder.raw, &replacement)
    })
}

/// Renders the final text: filled placeholders become their raw value, unfilled ones stay as written.
///
/// Line endings are left alone; see [crate::utils::prompt_processing::normalize_line_endings].
pub fn substitute(text: &str, placeholders: &[Placeholder], values: &impl ValueSource) -> String {
    placeholders.iter().fold(text.to_string(), |result, placeholder| {
        match values.value_of(&placeholder.id) {
            Some(value) if is_filled(placeholder, values) => result.replace(&placeholder.raw, value),
            _ => result,
        }
    })
}

/// A structured prompt with its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[readonly::make]
pub struct StructuredPrompt {
    /// The text of the structured prompt, immutable
    text: Arc<String>,

    /// The placeholders in the text in occurrence order, readonly
    #[readonly]
    pub placeholders: Arc<Vec<Placeholder>>,
}

impl StructuredPrompt {
    /// Extracts the placeholders of `text`. Warns if some placeholders are written identically, since those are
    /// always filled together.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let placeholders = extract_placeholders(&text);
        if placeholders.is_empty() {
            debug!("Structured prompt has no placeholder");
        } else {
            let mut seen = HashSet::new();
            let duplicated: Vec<&str> = placeholders
                .iter()
                .filter(|p| !seen.insert(p.raw.as_str()))
                .map(|p| p.raw.as_str())
                .collect();
            if !duplicated.is_empty() {
                warn!("Structured prompt repeats placeholders {:?}. \
                Every occurrence of a repeated placeholder receives the same value.", duplicated);
            }
        }
        Self {
            text: Arc::new(text),
            placeholders: Arc::new(placeholders),
        }
    }

    /// Get the structured prompt as a string.
    #[inline]
    pub fn str(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Looks up a placeholder by id.
    pub fn placeholder(&self, id: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| p.id == id)
    }

    pub fn preview(&self, values: &impl ValueSource) -> String {
        preview(&self.text, &self.placeholders, values)
    }

    pub fn substitute(&self, values: &impl ValueSource) -> String {
        substitute(&self.text, &self.placeholders, values)
    }

    pub fn all_filled(&self, values: &impl ValueSource) -> bool {
        all_filled(&self.placeholders, values)
    }

    /// The final text, if every placeholder is filled in `values`.
    pub fn complete(&self, values: &impl ValueSource) -> Result<String, UnfilledPlaceholders> {
        let unfilled: Vec<String> = self
            .placeholders
            .iter()
            .filter(|p| !is_filled(p, values))
            .map(|p| p.id.clone())
            .collect();
        if unfilled.is_empty() {
            Ok(self.substitute(values))
        } else {
            Err(UnfilledPlaceholders {
                all_placeholders: self.placeholders.iter().map(|p| p.id.clone()).collect(),
                unfilled_placeholders: unfilled,
            })
        }
    }

    /// Construct a partial prompt with no values.
    pub fn construct_prompt(&self) -> PartialPrompt {
        self.construct_prompt_with(FillValues::new())
    }

    /// Construct a partial prompt from existing values. Values of unknown ids are dropped.
    pub fn construct_prompt_with(&self, mut values: FillValues) -> PartialPrompt {
        values.retain_placeholders(&self.placeholders);
        PartialPrompt {
            prompt: self.clone(),
            values,
        }
    }
}

impl From<&str> for StructuredPrompt {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for StructuredPrompt {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A structured prompt with some placeholders filled. Can be only constructed from a structured prompt via
/// [StructuredPrompt::construct_prompt].
#[derive(Debug, Clone, PartialEq, Eq)]
#[readonly::make]
pub struct PartialPrompt {
    /// The structured prompt being filled, readonly
    #[readonly]
    pub prompt: StructuredPrompt,

    values: FillValues,
}

impl PartialPrompt {
    /// Fill a placeholder with a value.
    /// Panics if the placeholder does not exist.
    pub fn fill(&mut self, id: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.try_fill(id, value).unwrap()
    }

    /// Fill a placeholder with a value.
    /// Returns an error if the placeholder does not exist.
    pub fn try_fill(&mut self, id: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        let id = id.into();
        if self.prompt.placeholder(&id).is_some() {
            self.values.set_text(id, value);
            Ok(self)
        } else {
            Err(PlaceholderNotExist::new(id, value, &self.prompt.placeholders))
        }
    }

    #[inline]
    pub fn values(&self) -> &FillValues {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut FillValues {
        &mut self.values
    }

    /// Ids of placeholders that are not filled yet, in order.
    pub fn unfilled_placeholders(&self) -> Vec<&str> {
        self.prompt
            .placeholders
            .iter()
            .filter(|p| !is_filled(p, &self.values))
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.prompt.all_filled(&self.values)
    }

    pub fn preview(&self) -> String {
        self.prompt.preview(&self.values)
    }

    pub fn substitute(&self) -> String {
        self.prompt.substitute(&self.values)
    }

    /// Complete the partial prompt and return the final text.
    /// Returns an error if there are still unfilled placeholders.
    pub fn complete(&self) -> Result<String, UnfilledPlaceholders> {
        self.prompt.complete(&self.values)
    }

    pub fn into_values(self) -> FillValues {
        self.values
    }
}

pub mod errors {
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    use crate::placeholder::Placeholder;

    /// Error when trying to complete a partial prompt but there are still unfilled placeholders.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct UnfilledPlaceholders {
        pub unfilled_placeholders: Vec<String>,
        pub all_placeholders: Vec<String>,
    }

    impl fmt::Display for UnfilledPlaceholders {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "UnfilledPlaceholders: to complete the prompt,\n  Requires Placeholders:{:?}\n  Unfilled Placeholders:{:?}",
                   self.all_placeholders, self.unfilled_placeholders)
        }
    }

    impl Error for UnfilledPlaceholders {}

    /// Error when trying to fill a placeholder that does not exist in the structured prompt.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PlaceholderNotExist {
        pub try_fill_placeholder: String,
        pub value: String,
        pub available_placeholders: Vec<String>,
    }

    impl PlaceholderNotExist {
        pub(crate) fn new(try_fill_placeholder: impl Into<String>,
                          value: impl Into<String>,
                          available_placeholders: &[Placeholder]) -> Self {
            PlaceholderNotExist {
                try_fill_placeholder: try_fill_placeholder.into(),
                value: value.into(),
                available_placeholders: available_placeholders.iter().map(|p| p.id.clone()).collect(),
            }
        }
    }

    impl fmt::Display for PlaceholderNotExist {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "PlaceholderNotExist: try to fill placeholder = {} with value = {}, but available placeholders are {:?}",
                   self.try_fill_placeholder,
                   self.value,
                   self.available_placeholders)
        }
    }

    impl Error for PlaceholderNotExist {}
}

#[cfg(test)]
mod test_prompt {
    use std::collections::HashMap;

    use crate::filler::{is_filled, FillValues, CUSTOM_SENTINEL};
    use crate::placeholder::extract_placeholders;

    use super::{preview, substitute, StructuredPrompt};

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_preview() {
        let text = "Hello {{Name}}!";
        let placeholders = extract_placeholders(text);
        assert_eq!("Hello **[Name]**!", preview(text, &placeholders, &values(&[])));
        assert_eq!("Hello **[Name]**!", preview(text, &placeholders, &values(&[("placeholder-0", "  ")])));
        assert_eq!("Hello **Alice**!", preview(text, &placeholders, &values(&[("placeholder-0", "Alice")])));
    }

    #[test]
    fn test_preview_options() {
        let text = "Level: {{Skill Level: [Beginner;; Advanced]}}";
        let placeholders = extract_placeholders(text);
        assert_eq!("Level: **[Skill Level]**", preview(text, &placeholders, &values(&[])));
    }

    #[test]
    fn test_substitute() {
        let text = "I am {{Name}}, a {{Level: [Beginner;;Advanced]}} learner.\r\nThanks";
        let placeholders = extract_placeholders(text);
        assert_eq!(text, substitute(text, &placeholders, &values(&[])));
        assert_eq!(
            "I am {{Name}}, a Advanced learner.\r\nThanks",
            substitute(text, &placeholders, &values(&[("placeholder-1", "Advanced")]))
        );
        assert_eq!(
            "I am Bob, a Advanced learner.\r\nThanks",
            substitute(text, &placeholders, &values(&[("placeholder-0", "Bob"), ("placeholder-1", "Advanced")]))
        );
    }

    #[test]
    fn test_fully_filled_leaves_no_placeholder() {
        let text = "{{A}} {{B: [x;;y]}} {{C}} and {{A}} again";
        let placeholders = extract_placeholders(text);
        let filled: HashMap<String, String> = placeholders.iter().map(|p| (p.id.clone(), "v".to_string())).collect();
        let result = substitute(text, &placeholders, &filled);
        assert_eq!("v v v and v again", result);
        assert!(placeholders.iter().all(|p| !result.contains(p.raw.as_str())));
    }

    #[test]
    fn test_sentinel_never_emitted() {
        let text = "Level: {{Level: [Beginner;;Advanced]}}";
        let placeholders = extract_placeholders(text);
        let plain = values(&[("placeholder-0", CUSTOM_SENTINEL)]);
        assert_eq!(text, substitute(text, &placeholders, &plain));
        assert_eq!("Level: **[Level]**", preview(text, &placeholders, &plain));

        let mut custom = FillValues::new();
        custom.choose_custom("placeholder-0");
        assert!(!substitute(text, &placeholders, &custom).contains(CUSTOM_SENTINEL));
        custom.set_custom_text("placeholder-0", "Expert");
        assert_eq!("Level: Expert", substitute(text, &placeholders, &custom));
    }

    #[test]
    fn test_sentinel_typed_as_custom_text() {
        let text = "Level: {{Level: [Beginner;;Advanced]}}";
        let placeholders = extract_placeholders(text);
        let mut custom = FillValues::new();
        custom.choose_custom("placeholder-0").set_custom_text("placeholder-0", CUSTOM_SENTINEL);
        assert!(!is_filled(&placeholders[0], &custom));
        assert_eq!(text, substitute(text, &placeholders, &custom));
        assert_eq!("Level: **[Level]**", preview(text, &placeholders, &custom));
        assert!(custom.resolved().is_empty());
    }

    #[test]
    fn test_duplicates_are_coupled() {
        let text = "{{X}} vs {{X}}";
        let placeholders = extract_placeholders(text);
        assert_eq!("a vs a", substitute(text, &placeholders, &values(&[("placeholder-0", "a")])));
        assert_eq!("b vs b", substitute(text, &placeholders, &values(&[("placeholder-1", "b")])));
        assert_eq!("a vs a", substitute(text, &placeholders, &values(&[("placeholder-0", "a"), ("placeholder-1", "b")])));
        assert_eq!("**[X]** vs **[X]**", preview(text, &placeholders, &values(&[("placeholder-1", "b")])));
    }

    #[test]
    fn test_partial_prompt() {
        let prompt = StructuredPrompt::new("Write about {{Topic}} for {{Audience: [kids;;adults]}}.");
        assert!(prompt.has_placeholders());
        let mut partial = prompt.construct_prompt();
        assert_eq!(vec!["placeholder-0", "placeholder-1"], partial.unfilled_placeholders());
        let err = partial.complete().expect_err("unfilled placeholders should fail");
        assert_eq!(2, err.unfilled_placeholders.len());

        partial.fill("placeholder-0", "rust");
        assert!(!partial.is_complete());
        assert_eq!("Write about **rust** for **[Audience]**.", partial.preview());

        assert!(partial.try_fill("placeholder-9", "x").is_err());

        partial.values_mut().choose_custom("placeholder-1").set_custom_text("placeholder-1", "robots");
        assert!(partial.is_complete());
        assert_eq!("Write about rust for robots.", partial.complete().unwrap());
    }

    #[test]
    fn test_construct_with_drops_unknown_ids() {
        let prompt = StructuredPrompt::new("{{A}}");
        let mut values = FillValues::new();
        values.set_text("placeholder-0", "a").set_text("placeholder-3", "d");
        let partial = prompt.construct_prompt_with(values);
        assert_eq!(None, partial.values().selection("placeholder-3"));
        assert_eq!("a", partial.complete().unwrap());
    }

    #[test]
    fn test_complete_with_plain_values() {
        let prompt = StructuredPrompt::new("{{A}} and {{B}}");
        let err = prompt.complete(&values(&[("placeholder-0", "a"), ("placeholder-1", " ")])).unwrap_err();
        assert_eq!(vec!["placeholder-1".to_string()], err.unfilled_placeholders);
        assert_eq!(vec!["placeholder-0".to_string(), "placeholder-1".to_string()], err.all_placeholders);
        assert_eq!(
            "a and b",
            prompt.complete(&values(&[("placeholder-0", "a"), ("placeholder-1", "b")])).unwrap()
        );
    }

    #[test]
    fn test_no_placeholders() {
        let prompt = StructuredPrompt::new("Nothing to fill.");
        assert!(!prompt.has_placeholders());
        assert_eq!("Nothing to fill.", prompt.construct_prompt().complete().unwrap());
    }
}
