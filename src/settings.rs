//! # Settings
//! User settings live in a flat key-value store under fixed keys:
//! `apiKey`, `provider`, `openaiModel`, `geminiModel`, `claudeModel`, `xaiModel`, `explanationStyle` and `language`.
//!
//! Loading is lenient. Missing or blank models fall back to the provider defaults, and unknown provider or style
//! values fall back to the defaults with a warning. Without a supported stored language, the detected one is used
//! and written back.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;

use crate::i18n::{system_language, Language};

use crate::llm::provider::Provider;
use crate::llm::system_prompt::ExplanationStyle;
use crate::llm::ProviderConfig;
use crate::utils::JsonMap;

pub const API_KEY: &str = "apiKey";
pub const PROVIDER: &str = "provider";
pub const EXPLANATION_STYLE: &str = "explanationStyle";
pub const LANGUAGE: &str = "language";

/// Every key [Settings] reads and writes.
pub const KEYS: [&str; 8] = [
    API_KEY, PROVIDER, "openaiModel", "geminiModel", "claudeModel", "xaiModel", EXPLANATION_STYLE, LANGUAGE,
];

/// Asynchronous key-value storage for settings.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Values of the requested keys that are present.
    async fn get(&self, keys: &[&str]) -> Result<JsonMap>;

    /// Writes the given keys, leaving others untouched.
    async fn set(&self, values: JsonMap) -> Result<()>;
}

/// Settings kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<JsonMap>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, keys: &[&str]) -> Result<JsonMap> {
        let values = self.values.lock().map_err(|_| anyhow!("settings store lock poisoned"))?;
        Ok(pick(&values, keys))
    }

    async fn set(&self, new_values: JsonMap) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("settings store lock poisoned"))?;
        values.extend(new_values);
        Ok(())
    }
}

/// Settings kept as a JSON object in a file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    pub path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> Result<JsonMap> {
        if !fs::try_exists(&self.path).await? {
            return Ok(JsonMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(JsonMap::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("Settings file {} is not a JSON object", self.path.display()))
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get(&self, keys: &[&str]) -> Result<JsonMap> {
        Ok(pick(&self.read_all().await?, keys))
    }

    async fn set(&self, new_values: JsonMap) -> Result<()> {
        let mut values = self.read_all().await?;
        values.extend(new_values);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)
            .await
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// The stored language, if it is a supported code.
fn stored_language(stored: &JsonMap) -> Option<Language> {
    stored.get(LANGUAGE).and_then(Value::as_str).and_then(|code| code.parse().ok())
}

fn pick(values: &JsonMap, keys: &[&str]) -> JsonMap {
    keys.iter()
        .filter_map(|key| values.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

/// The user's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_key: String,
    pub provider: Provider,
    pub openai_model: String,
    pub gemini_model: String,
    pub claude_model: String,
    pub xai_model: String,
    pub explanation_style: ExplanationStyle,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            provider: Provider::default(),
            openai_model: Provider::OpenAI.default_model().to_string(),
            gemini_model: Provider::Gemini.default_model().to_string(),
            claude_model: Provider::Claude.default_model().to_string(),
            xai_model: Provider::XAI.default_model().to_string(),
            explanation_style: ExplanationStyle::default(),
            language: Language::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `store`, filling whatever is missing with defaults. The language falls back to the
    /// environment's locale.
    pub async fn load(store: &dyn SettingsStore) -> Result<Self> {
        Self::load_with_detected_language(store, system_language()).await
    }

    /// Like [Settings::load], using `detected` when no supported language is stored. `detected` is then stored.
    pub async fn load_with_detected_language(store: &dyn SettingsStore, detected: Language) -> Result<Self> {
        let stored = store.get(&KEYS).await?;
        let mut settings = Self::from_map(&stored);
        if stored_language(&stored).is_none() {
            info!("No language preference stored, using detected language {}", detected);
            settings.language = detected;
            let mut values = JsonMap::new();
            values.insert(LANGUAGE.to_string(), Value::from(detected.code()));
            store.set(values).await?;
        }
        Ok(settings)
    }

    /// Writes every setting to `store`.
    pub async fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        match serde_json::to_value(self)? {
            Value::Object(map) => store.set(map).await,
            other => Err(anyhow!("settings serialized to a non-object: {}", other)),
        }
    }

    /// Builds settings from stored values. Never fails.
    pub fn from_map(stored: &JsonMap) -> Self {
        let mut settings = Self::default();
        let text = |key: &str| stored.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty());

        if let Some(api_key) = text(API_KEY) {
            settings.api_key = api_key.to_string();
        }
        if let Some(provider) = text(PROVIDER) {
            match provider.parse::<Provider>() {
                Ok(provider) => settings.provider = provider,
                Err(_) => warn!("Ignoring unknown provider {:?} in settings", provider),
            }
        }
        for provider in Provider::ALL {
            if let Some(model) = text(provider.model_key()) {
                *settings.model_mut(provider) = model.to_string();
            }
        }
        if let Some(style) = stored.get(EXPLANATION_STYLE) {
            match serde_json::from_value::<ExplanationStyle>(style.clone()) {
                Ok(style) => settings.explanation_style = style,
                Err(_) => warn!("Ignoring unknown explanation style {} in settings", style),
            }
        }
        match stored_language(stored) {
            Some(language) => settings.language = language,
            None => {
                if let Some(language) = stored.get(LANGUAGE) {
                    warn!("Ignoring unsupported language {} in settings", language);
                }
            }
        }
        settings
    }

    /// No API key yet, so the settings view should be shown first.
    pub fn needs_setup(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    pub fn model(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenAI => &self.openai_model,
            Provider::Gemini => &self.gemini_model,
            Provider::Claude => &self.claude_model,
            Provider::XAI => &self.xai_model,
        }
    }

    fn model_mut(&mut self, provider: Provider) -> &mut String {
        match provider {
            Provider::OpenAI => &mut self.openai_model,
            Provider::Gemini => &mut self.gemini_model,
            Provider::Claude => &mut self.claude_model,
            Provider::XAI => &mut self.xai_model,
        }
    }

    /// Model of the selected provider.
    pub fn current_model(&self) -> &str {
        self.model(self.provider)
    }

    pub fn set_current_model(&mut self, model: impl Into<String>) {
        *self.model_mut(self.provider) = model.into();
    }

    /// Puts the selected provider back on its default model.
    pub fn reset_current_model(&mut self) {
        let provider = self.provider;
        *self.model_mut(provider) = provider.default_model().to_string();
    }

    /// Config for an improve call with the selected provider.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(self.provider, self.api_key.trim())
            .with_model(self.current_model())
            .with_explanation_style(self.explanation_style)
    }
}
