//! Settings domain types and validation.
//!
//! This module contains the core settings types used across the application.
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default base URL of the local OpenAI-compatible model server.
pub const DEFAULT_MODEL_URL: &str = "http://127.0.0.1:8080";

/// Default per-request timeout for model calls, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default instructions for assistant replies.
pub const DEFAULT_REPLY_INSTRUCTIONS: &str = "You are a helpful assistant. \
    Answer clearly and concisely, and keep the conversation history in mind.";

/// Default instructions for conversation summaries.
pub const DEFAULT_SUMMARY_INSTRUCTIONS: &str = "Summarize the conversation below \
    in one short sentence of no more than ten words. Reply with the summary only.";

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the model server.
    pub model_url: Option<String>,

    /// Model name sent with completion requests.
    pub model_name: Option<String>,

    /// System instructions for replies.
    pub reply_instructions: Option<String>,

    /// System instructions for summaries.
    pub summary_instructions: Option<String>,

    /// Per-request timeout in seconds (1-600).
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            model_url: Some(DEFAULT_MODEL_URL.to_string()),
            model_name: None,
            reply_instructions: Some(DEFAULT_REPLY_INSTRUCTIONS.to_string()),
            summary_instructions: Some(DEFAULT_SUMMARY_INSTRUCTIONS.to_string()),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn effective_model_url(&self) -> &str {
        self.model_url.as_deref().unwrap_or(DEFAULT_MODEL_URL)
    }

    #[must_use]
    pub fn effective_reply_instructions(&self) -> &str {
        self.reply_instructions
            .as_deref()
            .unwrap_or(DEFAULT_REPLY_INSTRUCTIONS)
    }

    #[must_use]
    pub fn effective_summary_instructions(&self) -> &str {
        self.summary_instructions
            .as_deref()
            .unwrap_or(DEFAULT_SUMMARY_INSTRUCTIONS)
    }

    #[must_use]
    pub const fn effective_request_timeout_secs(&self) -> u64 {
        match self.request_timeout_secs {
            Some(secs) => secs,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref url) = other.model_url {
            self.model_url.clone_from(url);
        }
        if let Some(ref name) = other.model_name {
            self.model_name.clone_from(name);
        }
        if let Some(ref text) = other.reply_instructions {
            self.reply_instructions.clone_from(text);
        }
        if let Some(ref text) = other.summary_instructions {
            self.summary_instructions.clone_from(text);
        }
        if let Some(secs) = other.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub model_url: Option<Option<String>>,
    pub model_name: Option<Option<String>>,
    pub reply_instructions: Option<Option<String>>,
    pub summary_instructions: Option<Option<String>>,
    pub request_timeout_secs: Option<Option<u64>>,
}

impl SettingsUpdate {
    /// Build an update from a `key value` pair as typed on the command line.
    ///
    /// An empty value resets the key.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, SettingsError> {
        let text = (!value.is_empty()).then(|| value.to_string());
        let mut update = Self::default();
        match key {
            "model_url" => update.model_url = Some(text),
            "model_name" => update.model_name = Some(text),
            "reply_instructions" => update.reply_instructions = Some(text),
            "summary_instructions" => update.summary_instructions = Some(text),
            "request_timeout_secs" => {
                let secs = text
                    .map(|t| {
                        t.parse::<u64>()
                            .map_err(|_| SettingsError::InvalidTimeout(value.to_string()))
                    })
                    .transpose()?;
                update.request_timeout_secs = Some(secs);
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(update)
    }
}

/// Errors from settings validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Model URL must start with http:// or https://, got: {0}")]
    InvalidModelUrl(String),

    #[error("{0} must not be empty")]
    EmptyInstructions(&'static str),

    #[error("Request timeout must be between 1 and 600 seconds, got: {0}")]
    InvalidTimeout(String),

    #[error("Unknown setting: {0}")]
    UnknownKey(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref url) = settings.model_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidModelUrl(url.clone()));
        }
    }

    if let Some(ref text) = settings.reply_instructions {
        if text.trim().is_empty() {
            return Err(SettingsError::EmptyInstructions("reply_instructions"));
        }
    }

    if let Some(ref text) = settings.summary_instructions {
        if text.trim().is_empty() {
            return Err(SettingsError::EmptyInstructions("summary_instructions"));
        }
    }

    if let Some(secs) = settings.request_timeout_secs {
        if !(1..=600).contains(&secs) {
            return Err(SettingsError::InvalidTimeout(secs.to_string()));
        }
    }

    Ok(())
}
