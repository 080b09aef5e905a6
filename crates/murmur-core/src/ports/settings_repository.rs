//! Settings repository port.

use async_trait::async_trait;
use thiserror::Error;

use crate::settings::Settings;

/// Errors from settings persistence.
#[derive(Debug, Error)]
pub enum SettingsStoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for loading and saving application settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings, falling back to defaults when none are stored.
    async fn load(&self) -> Result<Settings, SettingsStoreError>;

    /// Replace the stored settings.
    async fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError>;
}
