//! # Languages
//! The UI speaks English or Japanese. Locale codes such as `ja-JP` are normalized to a supported [Language], with
//! English as fallback.
//!
//! Messages live in a [Catalog] of per-language tables. A message may carry `{{name}}` parameters, filled by
//! [interpolate]. Lookups fall back to English, then to the key itself.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

use anyhow::Result;
use lazy_static::lazy_static;
use log::warn;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PARAM_RE: Regex = Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap();
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ja];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
        }
    }

    /// English name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "Japanese",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "日本語",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    /// Accepts exact codes only, see [normalize_language_code] for locale codes.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.code() == code)
            .ok_or_else(|| UnsupportedLanguage(code.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLanguage(pub String);

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnsupportedLanguage {}

/// `ja-JP` → Japanese, `en_US.UTF-8` → English. Missing or unsupported codes give the default language.
pub fn normalize_language_code(code: Option<&str>) -> Language {
    code.map(|code| code.to_lowercase())
        .and_then(|code| {
            let primary = code.split(['-', '_', '.']).next().unwrap_or_default().to_string();
            primary.parse().ok()
        })
        .unwrap_or_default()
}

/// Language of the environment's locale (`LC_ALL`, `LC_MESSAGES`, then `LANG`).
pub fn system_language() -> Language {
    let locale = ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty());
    normalize_language_code(locale.as_deref())
}

/// Replaces `{{name}}` with `params["name"]`. Unknown names are left as written.
pub fn interpolate(text: &str, params: &HashMap<&str, String>) -> String {
    PARAM_RE
        .replace_all(text, |captures: &Captures| match params.get(&captures[1]) {
            Some(value) => value.clone(),
            None => captures[0].to_string(),
        })
        .into_owned()
}

/// Message tables by language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the messages of a flat JSON object `{"key": "message", ...}` for `language`.
    pub fn load_json(&mut self, language: Language, json: &str) -> Result<&mut Self> {
        let table: HashMap<String, String> = serde_json::from_str(json)?;
        self.tables.entry(language).or_default().extend(table);
        Ok(self)
    }

    pub fn insert(&mut self, language: Language, key: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.tables.entry(language).or_default().insert(key.into(), message.into());
        self
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.tables.get(&language).and_then(|table| table.get(key)).map(String::as_str)
    }

    /// Message of `key` in `language`, falling back to English and then to `key` itself.
    pub fn translate(&self, language: Language, key: &str, params: &HashMap<&str, String>) -> String {
        match self.lookup(language, key).or_else(|| self.lookup(Language::default(), key)) {
            Some(message) => interpolate(message, params),
            None => {
                warn!("Missing translation for key: {}", key);
                key.to_string()
            }
        }
    }
}
