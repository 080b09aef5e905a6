//! `SQLite` implementation of the `SettingsRepository` trait.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use murmur_core::ports::SettingsStoreError;
use murmur_core::{Settings, SettingsRepository};

/// `SQLite` implementation of the `SettingsRepository` trait.
///
/// Stores settings as a JSON blob in a key-value table for flexibility.
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    /// Create a new `SQLite` settings repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SETTINGS_KEY: &str = "app_settings";

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn load(&self) -> Result<Settings, SettingsStoreError> {
        let row = sqlx::query("SELECT value FROM settings_kv WHERE key = ?")
            .bind(SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SettingsStoreError::Storage(e.to_string()))?;

        match row {
            Some(r) => {
                let json: String = r.get("value");
                serde_json::from_str(&json)
                    .map_err(|e| SettingsStoreError::Serialization(e.to_string()))
            }
            None => Ok(Settings::with_defaults()),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<(), SettingsStoreError> {
        let json = serde_json::to_string(settings)
            .map_err(|e| SettingsStoreError::Serialization(e.to_string()))?;
        let updated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query("INSERT OR REPLACE INTO settings_kv (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(SETTINGS_KEY)
            .bind(&json)
            .bind(&updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| SettingsStoreError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup_test_database;

    #[tokio::test]
    async fn test_load_returns_defaults_when_empty() {
        let repo = SqliteSettingsRepository::new(setup_test_database().await.unwrap());

        let settings = repo.load().await.unwrap();
        assert_eq!(settings, Settings::with_defaults());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = SqliteSettingsRepository::new(setup_test_database().await.unwrap());

        let settings = Settings {
            model_url: Some("http://192.168.1.20:8080".into()),
            request_timeout_secs: Some(30),
            ..Settings::with_defaults()
        };

        repo.save(&settings).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_serialization_error() {
        let pool = setup_test_database().await.unwrap();
        sqlx::query("INSERT INTO settings_kv (key, value, updated_at) VALUES (?, '{not json', '')")
            .bind(SETTINGS_KEY)
            .execute(&pool)
            .await
            .unwrap();
        let repo = SqliteSettingsRepository::new(pool);

        assert!(matches!(
            repo.load().await,
            Err(SettingsStoreError::Serialization(_))
        ));
    }
}
