//! Conversation store port definition.
//!
//! This port defines the interface for persisting and retrieving
//! conversations together with their messages.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Conversation, ConversationId};

/// Errors that can occur in conversation store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("Conversation already exists: {0}")]
    AlreadyExists(ConversationId),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Port for conversation persistence.
///
/// A conversation is always read and written whole: `save` writes the
/// conversation row and every message it currently holds.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist a conversation that does not exist yet.
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Write the current state of an existing conversation.
    ///
    /// Never creates a conversation: fails with
    /// [`StoreError::ConversationNotFound`] once it has been deleted.
    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Delete a conversation and all of its messages.
    ///
    /// Fails with [`StoreError::ConversationNotFound`] for an unknown id.
    async fn delete(&self, id: ConversationId) -> Result<(), StoreError>;

    /// Load a conversation with its messages in chronological order.
    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError>;

    /// Load every conversation. Order is unspecified.
    async fn list(&self) -> Result<Vec<Conversation>, StoreError>;
}
