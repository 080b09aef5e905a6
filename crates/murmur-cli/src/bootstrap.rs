//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - `SQLite` repositories (via murmur-db)
//! - Model server client (via murmur-runtime)
//! - Core services (via murmur-core)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use murmur_core::{
    ChatEventEmitter, ChatOrchestrator, ConversationService, LanguageModelPort, Repos, Settings,
    database_path, validate_settings,
};
use murmur_db::CoreFactory;
use murmur_runtime::LlamaServerModel;
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Database file; the platform data directory is used when unset.
    pub db_path: Option<PathBuf>,
    /// Model server URL overriding the stored setting.
    pub model_url: Option<String>,
}

impl CliConfig {
    /// Resolve the database location.
    pub fn resolve_db_path(&self) -> Result<PathBuf, CliError> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(database_path()?),
        }
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Repository set backing every store.
    pub repos: Repos,
    /// Conversation lifecycle operations.
    pub conversations: ConversationService,
    /// The language model the chat turns stream from.
    pub model: Arc<dyn LanguageModelPort>,
    /// Settings in effect for this invocation, overrides applied.
    pub settings: Settings,
}

impl CliContext {
    pub fn new(repos: Repos, model: Arc<dyn LanguageModelPort>, settings: Settings) -> Self {
        let conversations = ConversationService::new(Arc::clone(&repos.conversations));
        Self {
            repos,
            conversations,
            model,
            settings,
        }
    }

    /// An orchestrator reporting turn progress to `events`.
    pub fn orchestrator(&self, events: Arc<dyn ChatEventEmitter>) -> ChatOrchestrator {
        ChatOrchestrator::new(
            Arc::clone(&self.model),
            Arc::clone(&self.repos.conversations),
            events,
        )
    }
}

/// Bootstrap the CLI with the given configuration.
///
/// This is the composition root: it opens the database, loads settings,
/// applies the command-line override for the model URL and builds the
/// model server client.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let db_path = config.resolve_db_path()?;
    debug!(path = %db_path.display(), "Opening database");
    let repos = CoreFactory::open(&db_path)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    let mut settings = repos.settings.load().await.map_err(CliError::from)?;
    if let Some(url) = config.model_url {
        settings.model_url = Some(url);
    }
    validate_settings(&settings).map_err(CliError::from)?;

    let model = LlamaServerModel::from_settings(&settings).map_err(CliError::from)?;
    debug!(url = %model.base_url(), "Model server configured");

    Ok(CliContext::new(repos, Arc::new(model), settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_db_path_wins() {
        let config = CliConfig {
            db_path: Some(PathBuf::from("/tmp/elsewhere.db")),
            model_url: None,
        };
        assert_eq!(
            config.resolve_db_path().unwrap(),
            PathBuf::from("/tmp/elsewhere.db")
        );
    }

    #[tokio::test]
    async fn test_bootstrap_applies_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            db_path: Some(dir.path().join("murmur.db")),
            model_url: Some("http://10.1.2.3:9999".to_string()),
        };

        let ctx = bootstrap(config).await.unwrap();

        assert_eq!(ctx.settings.effective_model_url(), "http://10.1.2.3:9999");
        // The override is not written back.
        let stored = ctx.repos.settings.load().await.unwrap();
        assert_ne!(stored.model_url.as_deref(), Some("http://10.1.2.3:9999"));
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_bad_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            db_path: Some(dir.path().join("murmur.db")),
            model_url: Some("localhost:8080".to_string()),
        };

        let err = bootstrap(config).await.err().unwrap();
        assert_eq!(crate::error::exit_code_for(&err), 78);
    }
}
