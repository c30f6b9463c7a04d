//! # Filler
//! Tracks which placeholders are filled and with what.
//!
//! Values are looked up by placeholder id through [ValueSource]. A plain `HashMap<String, String>` is a value
//! source, and so is [FillValues], which keeps an option selection apart from custom text:
//! selecting the "Custom..." entry of an options placeholder stores [CUSTOM_SENTINEL] as the selection, and the
//! actual value is whatever gets typed into the custom input. The sentinel is never a value, from either source.

use std::collections::HashMap;

use crate::placeholder::Placeholder;

/// Selection marking "the user is typing a custom value" for an options placeholder.
pub const CUSTOM_SENTINEL: &str = "__custom__";

/// Anything that resolves a placeholder id to the value entered for it.
pub trait ValueSource {
    /// The entered value, if any. Never returns [CUSTOM_SENTINEL].
    fn value_of(&self, id: &str) -> Option<&str>;
}

impl ValueSource for HashMap<String, String> {
    fn value_of(&self, id: &str) -> Option<&str> {
        self.get(id)
            .map(String::as_str)
            .filter(|value| *value != CUSTOM_SENTINEL)
    }
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn value_of(&self, id: &str) -> Option<&str> {
        (**self).value_of(id)
    }
}

/// Values entered for a set of placeholders.
///
/// `selections` holds what the input or select shows, which may be [CUSTOM_SENTINEL]; `custom` holds the text of the
/// custom input for placeholders in custom mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillValues {
    selections: HashMap<String, String>,
    custom: HashMap<String, String>,
}

impl FillValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds selections and custom text from previously resolved values, e.g. [FillValues::resolved].
    ///
    /// An options placeholder whose value is non-empty and not one of its options goes back into custom mode with
    /// that value pre-populated.
    pub fn reconstruct(placeholders: &[Placeholder], resolved: &impl ValueSource) -> Self {
        let mut values = Self::new();
        for placeholder in placeholders {
            let Some(value) = resolved.value_of(&placeholder.id) else {
                continue;
            };
            match FieldMode::for_value(placeholder, value) {
                FieldMode::Custom(text) => {
                    values.choose_custom(&placeholder.id);
                    values.set_custom_text(&placeholder.id, text);
                }
                _ => {
                    values.set_text(&placeholder.id, value);
                }
            }
        }
        values
    }

    /// Sets the value of a free-form input or the selected option of a select. Leaves custom mode.
    pub fn set_text(&mut self, id: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let id = id.into();
        self.custom.remove(&id);
        self.selections.insert(id, value.into());
        self
    }

    /// Alias of [FillValues::set_text] for selects.
    pub fn select_option(&mut self, id: impl Into<String>, option: impl Into<String>) -> &mut Self {
        self.set_text(id, option)
    }

    /// Switches a placeholder into custom mode. Custom text typed earlier is kept.
    pub fn choose_custom(&mut self, id: impl Into<String>) -> &mut Self {
        self.selections.insert(id.into(), CUSTOM_SENTINEL.to_string());
        self
    }

    /// Sets the custom text of a placeholder. Only counts while the placeholder is in custom mode.
    pub fn set_custom_text(&mut self, id: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.custom.insert(id.into(), text.into());
        self
    }

    /// Forgets everything entered for `id`.
    pub fn clear(&mut self, id: &str) -> &mut Self {
        self.selections.remove(id);
        self.custom.remove(id);
        self
    }

    /// What the input or select currently shows, possibly [CUSTOM_SENTINEL].
    pub fn selection(&self, id: &str) -> Option<&str> {
        self.selections.get(id).map(String::as_str)
    }

    /// The custom text typed for `id`, whether or not custom mode is active.
    pub fn custom_text(&self, id: &str) -> Option<&str> {
        self.custom.get(id).map(String::as_str)
    }

    /// Whether `id` is in custom mode.
    pub fn is_custom(&self, id: &str) -> bool {
        self.selection(id) == Some(CUSTOM_SENTINEL)
    }

    /// Drops values of ids not in `placeholders`.
    pub fn retain_placeholders(&mut self, placeholders: &[Placeholder]) {
        let keep = |id: &String| placeholders.iter().any(|p| &p.id == id);
        self.selections.retain(|id, _| keep(id));
        self.custom.retain(|id, _| keep(id));
    }

    /// Flattens into a map of resolved values. Placeholders in custom mode map to their custom text, and the
    /// sentinel never appears.
    pub fn resolved(&self) -> HashMap<String, String> {
        self.selections
            .keys()
            .filter_map(|id| self.value_of(id).map(|value| (id.clone(), value.to_string())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl ValueSource for FillValues {
    fn value_of(&self, id: &str) -> Option<&str> {
        match self.selections.get(id).map(String::as_str) {
            Some(CUSTOM_SENTINEL) => self.custom_text(id).filter(|text| *text != CUSTOM_SENTINEL),
            other => other,
        }
    }
}

/// How the input of a placeholder should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMode {
    /// A plain text input.
    FreeText,
    /// A select showing one of the options, or nothing selected.
    Select,
    /// The select shows "Custom..." and a text input holds the custom value.
    Custom(String),
}

impl FieldMode {
    /// Presentation of `placeholder` given a resolved value, as when reopening the fill dialog.
    pub fn for_value(placeholder: &Placeholder, value: &str) -> Self {
        if !placeholder.has_options() {
            FieldMode::FreeText
        } else if !value.is_empty() && !placeholder.is_option(value) {
            FieldMode::Custom(value.to_string())
        } else {
            FieldMode::Select
        }
    }

    /// Presentation of `placeholder` given the current values.
    pub fn for_placeholder(placeholder: &Placeholder, values: &FillValues) -> Self {
        if placeholder.has_options() && values.is_custom(&placeholder.id) {
            return FieldMode::Custom(values.custom_text(&placeholder.id).unwrap_or_default().to_string());
        }
        FieldMode::for_value(placeholder, values.value_of(&placeholder.id).unwrap_or_default())
    }
}

/// Fill status of one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderStatus {
    pub id: String,
    pub value: String,
    pub is_filled: bool,
}

/// A placeholder is filled iff its value exists and is not blank.
pub fn is_filled(placeholder: &Placeholder, values: &impl ValueSource) -> bool {
    values
        .value_of(&placeholder.id)
        .map_or(false, |value| !value.trim().is_empty())
}

/// Whether every placeholder is filled. True when there are no placeholders.
pub fn all_filled(placeholders: &[Placeholder], values: &impl ValueSource) -> bool {
    placeholders.iter().all(|placeholder| is_filled(placeholder, values))
}

/// Current value and fill status of every placeholder, in order.
pub fn placeholder_status(placeholders: &[Placeholder], values: &impl ValueSource) -> Vec<PlaceholderStatus> {
    placeholders
        .iter()
        .map(|placeholder| PlaceholderStatus {
            id: placeholder.id.clone(),
            value: values.value_of(&placeholder.id).unwrap_or_default().to_string(),
            is_filled: is_filled(placeholder, values),
        })
        .collect()
}
