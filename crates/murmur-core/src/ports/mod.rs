//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - Repositories read and write whole aggregates
//! - Model streams carry full snapshots, never deltas

use std::sync::Arc;

pub mod conversation_store;
pub mod event_emitter;
pub mod model;
pub mod settings_repository;

pub use conversation_store::{ConversationStore, StoreError};
pub use event_emitter::{ChatEventEmitter, NoopEmitter};
pub use model::{GenerationError, LanguageModelPort, ReplyPart, ReplyStream, SummaryStream};
pub use settings_repository::{SettingsRepository, SettingsStoreError};

/// Container for the repository trait objects an application is built from.
#[derive(Clone)]
pub struct Repos {
    /// Conversations and their messages.
    pub conversations: Arc<dyn ConversationStore>,
    /// Application settings.
    pub settings: Arc<dyn SettingsRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            conversations,
            settings,
        }
    }
}
