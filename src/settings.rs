//! Read-only access to the user's translation settings.
//!
//! The core never writes settings; it resolves provider, credential, model,
//! and the usage-display preference once, up front, and reports
//! `MissingConfiguration` before dispatching anything when resolution fails.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{TranslateError, TranslateResult};
use crate::providers::Provider;

pub const KEY_PROVIDER: &str = "provider";
pub const KEY_MODEL: &str = "model";
pub const KEY_SHOW_TOKEN_COUNT: &str = "show_token_count";

const DEFAULT_SHOW_TOKEN_COUNT: bool = true;

/// Keyed settings storage, mirroring the host platform's sync storage.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory store, used by tests and embedders without a storage backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Fully resolved translation settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub show_token_count: bool,
}

impl Settings {
    /// Resolve settings from keyed storage.
    ///
    /// The credential lives under the active provider's own key
    /// (`openai_key`, `claude_key`, ...), so the provider has to resolve
    /// first.
    pub fn from_store(store: &dyn SettingsStore) -> TranslateResult<Self> {
        let provider_id = store
            .get(KEY_PROVIDER)
            .ok_or_else(|| missing("no provider selected"))?;
        let provider = Provider::from_id(&provider_id)
            .ok_or_else(|| missing(&format!("unknown provider {provider_id:?}")))?;

        let api_key = store
            .get(&provider.credential_key())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| missing(&format!("no API key stored for {}", provider.id())))?;

        let model = store
            .get(KEY_MODEL)
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| missing("no model selected"))?;

        let show_token_count = store
            .get(KEY_SHOW_TOKEN_COUNT)
            .map(|v| v == "true")
            .unwrap_or(DEFAULT_SHOW_TOKEN_COUNT);

        Ok(Settings {
            provider,
            api_key,
            model,
            show_token_count,
        })
    }

    /// Parse settings from a TOML document (the CLI's settings file).
    pub fn from_toml_str(input: &str) -> TranslateResult<Self> {
        let file: SettingsFile = toml::from_str(input)?;

        let provider = file.provider;
        let api_key = file
            .keys
            .get(&provider.credential_key())
            .filter(|key| !key.trim().is_empty())
            .cloned()
            .ok_or_else(|| missing(&format!("no API key configured for {}", provider.id())))?;

        Ok(Settings {
            provider,
            api_key,
            model: file.model,
            show_token_count: file.show_token_count.unwrap_or(DEFAULT_SHOW_TOKEN_COUNT),
        })
    }
}

#[derive(Deserialize)]
struct SettingsFile {
    provider: Provider,
    model: String,
    show_token_count: Option<bool>,
    #[serde(flatten)]
    keys: HashMap<String, String>,
}

fn missing(detail: &str) -> TranslateError {
    TranslateError::MissingConfiguration(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_credential_for_active_provider() {
        let mut store = MemoryStore::new();
        store
            .set(KEY_PROVIDER, "claude")
            .set("claude_key", "sk-test")
            .set("openai_key", "sk-other")
            .set(KEY_MODEL, "claude-3-5-haiku-latest");

        let settings = Settings::from_store(&store).unwrap();
        assert_eq!(settings.provider, Provider::Claude);
        assert_eq!(settings.api_key, "sk-test");
        assert!(settings.show_token_count);
    }

    #[test]
    fn missing_key_is_missing_configuration() {
        let mut store = MemoryStore::new();
        store.set(KEY_PROVIDER, "openai").set(KEY_MODEL, "gpt-4o");

        let err = Settings::from_store(&store).unwrap_err();
        assert!(matches!(err, TranslateError::MissingConfiguration(_)));
    }

    #[test]
    fn parses_toml_settings_file() {
        let settings = Settings::from_toml_str(
            r#"
            provider = "deepseek"
            model = "deepseek-chat"
            deepseek_key = "sk-ds"
            show_token_count = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider, Provider::DeepSeek);
        assert_eq!(settings.model, "deepseek-chat");
        assert!(!settings.show_token_count);
    }
}
