//! # Placeholder
//! A placeholder is a fillable slot in a structured prompt, written as `{{...}}`.
//!
//! Two forms exist:
//! * Options: `{{Skill Level: [Beginner;; Intermediate;; Advanced]}}`, where the label is everything before the
//!   first `:` followed by a `[...]` block that runs to the end of the content, and options are separated by `;;`.
//! * Free-form: `{{Your specific project requirements}}`, i.e. anything without the trailing `: [...]`.
//!
//! The content between the delimiters never contains `}`, and the first `}}` after a `{{` closes a placeholder.
//! Malformed input never fails: anything that does not match the options grammar becomes a free-form label.
//!
//! Placeholders get ordinal ids (`placeholder-0`, `placeholder-1`, ...) by occurrence order, so re-extracting the
//! same text always yields the same ids. Ids are NOT derived from content: if a regenerated prompt reorders its
//! placeholders, values keyed by id attach to whatever placeholder now holds that position.

use crate::utils::prompt_processing::{scan_placeholders, split_label_and_options, strip_format};

/// Separator between options in an options placeholder.
pub const OPTION_SEPARATOR: &str = ";;";

/// Prefix of every placeholder id.
pub const ID_PREFIX: &str = "placeholder-";

/// One fillable slot discovered in a structured prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[readonly::make]
pub struct Placeholder {
    /// Ordinal id, `placeholder-<n>`, readonly
    #[readonly]
    pub id: String,

    /// The exact matched text including `{{` and `}}`, readonly. Substitution replaces this literally.
    #[readonly]
    pub raw: String,

    /// Text shown next to the input, readonly
    #[readonly]
    pub label: String,

    /// Choices of an options placeholder, never empty when present, readonly
    #[readonly]
    pub options: Option<Vec<String>>,
}

impl Placeholder {
    /// Parses the `{{...}}` text found at ordinal `index`.
    fn parse(index: usize, raw: &str) -> Self {
        let content = strip_format(raw).trim();
        let (label, options) = match split_label_and_options(content) {
            Some((label, options)) => {
                let options: Vec<String> = options
                    .split(OPTION_SEPARATOR)
                    .map(str::trim)
                    .filter(|option| !option.is_empty())
                    .map(String::from)
                    .collect();
                if options.is_empty() {
                    (content.to_string(), None)
                } else {
                    (label.trim().to_string(), Some(options))
                }
            }
            None => (content.to_string(), None),
        };
        Self {
            id: format!("{}{}", ID_PREFIX, index),
            raw: raw.to_string(),
            label,
            options,
        }
    }

    /// Whether the placeholder offers a fixed list of choices.
    #[inline]
    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }

    /// The options, or an empty slice for free-form placeholders.
    #[inline]
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Whether `value` is one of the options.
    pub fn is_option(&self, value: &str) -> bool {
        self.options().iter().any(|option| option == value)
    }
}

/// Extracts all placeholders from `text` in left-to-right order.
pub fn extract_placeholders(text: &str) -> Vec<Placeholder> {
    scan_placeholders(text)
        .into_iter()
        .enumerate()
        .map(|(index, span)| Placeholder::parse(index, &text[span]))
        .collect()
}

/// Like [extract_placeholders], treating a missing text as empty.
pub fn extract_placeholders_opt(text: Option<&str>) -> Vec<Placeholder> {
    text.map(extract_placeholders).unwrap_or_default()
}

#[cfg(test)]
mod test_placeholder {
    use super::{extract_placeholders, extract_placeholders_opt};

    #[test]
    fn test_empty() {
        assert!(extract_placeholders("").is_empty());
        assert!(extract_placeholders_opt(None).is_empty());
        assert!(extract_placeholders("plain text, {single} braces").is_empty());
    }

    #[test]
    fn test_free_form() {
        let placeholders = extract_placeholders("{{Your Name}}");
        assert_eq!(1, placeholders.len());
        let p = &placeholders[0];
        assert_eq!("placeholder-0", p.id);
        assert_eq!("{{Your Name}}", p.raw);
        assert_eq!("Your Name", p.label);
        assert!(!p.has_options());
        assert!(p.options().is_empty());
    }

    #[test]
    fn test_options() {
        let placeholders = extract_placeholders("Skill: {{Level: [Beginner;; Advanced]}}.");
        assert_eq!(1, placeholders.len());
        let p = &placeholders[0];
        assert_eq!("{{Level: [Beginner;; Advanced]}}", p.raw);
        assert_eq!("Level", p.label);
        assert_eq!(Some(vec!["Beginner".to_string(), "Advanced".to_string()]), p.options);
        assert!(p.is_option("Beginner"));
        assert!(!p.is_option("Expert"));
    }

    #[test]
    fn test_blank_options_dropped() {
        let placeholders = extract_placeholders("{{ Tone :  [ formal ;;;; ;; casual;;] }}");
        let p = &placeholders[0];
        assert_eq!("Tone", p.label);
        assert_eq!(&["formal".to_string(), "casual".to_string()][..], p.options());

        // all options blank: no options survive, so the content is a free-form label
        let placeholders = extract_placeholders("{{Tone: [ ;; ]}}");
        assert_eq!("Tone: [ ;; ]", placeholders[0].label);
        assert!(placeholders[0].options.is_none());
    }

    #[test]
    fn test_order_and_ids() {
        let placeholders = extract_placeholders("{{A}} and {{B: [x;;y]}}");
        assert_eq!(2, placeholders.len());
        assert_eq!("placeholder-0", placeholders[0].id);
        assert_eq!("A", placeholders[0].label);
        assert_eq!("placeholder-1", placeholders[1].id);
        assert_eq!("B", placeholders[1].label);
        assert_eq!(&["x".to_string(), "y".to_string()][..], placeholders[1].options());

        assert_eq!(placeholders, extract_placeholders("{{A}} and {{B: [x;;y]}}"));
    }

    #[test]
    fn test_duplicates_get_distinct_ids() {
        let placeholders = extract_placeholders("{{X}} vs {{X}}");
        assert_eq!(2, placeholders.len());
        assert_eq!(placeholders[0].raw, placeholders[1].raw);
        assert_eq!(placeholders[0].label, placeholders[1].label);
        assert_ne!(placeholders[0].id, placeholders[1].id);
    }

    #[test]
    fn test_malformed_is_free_form() {
        let placeholders = extract_placeholders("{{Label: [a;;b] tail}} {{{nested}} {{Level: [a\nb]}}");
        assert_eq!(3, placeholders.len());
        assert_eq!("Label: [a;;b] tail", placeholders[0].label);
        assert_eq!("{nested", placeholders[1].label);
        assert_eq!("Level: [a\nb]", placeholders[2].label);
        assert!(placeholders.iter().all(|p| p.options.is_none()));
    }
}
