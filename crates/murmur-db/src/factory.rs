//! Composition utilities for building `Repos` with `SQLite` backends.
//!
//! This module provides factory functions for wiring up the application
//! with `SQLite` repositories. It is focused purely on construction and
//! should not contain any domain logic.

use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use murmur_core::Repos;

use crate::repositories::{SqliteConversationStore, SqliteSettingsRepository};
use crate::setup::setup_database;

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Open (or create) the database at `db_path` and build every repository.
    pub async fn open(db_path: &Path) -> anyhow::Result<Repos> {
        let pool = setup_database(db_path).await?;
        Ok(Self::build_repos(pool))
    }

    /// Build all `SQLite` repositories from a pool.
    ///
    /// This is the recommended way for adapters to obtain repositories.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteConversationStore::new(pool.clone())),
            Arc::new(SqliteSettingsRepository::new(pool)),
        )
    }

    /// Build repositories over a fresh in-memory database.
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn in_memory() -> anyhow::Result<Repos> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self::build_repos(pool))
    }
}
