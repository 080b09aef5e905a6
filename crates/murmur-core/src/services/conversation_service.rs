//! Conversation lifecycle: create, load, list and delete.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Conversation, ConversationId, sort_by_recency};
use crate::ports::{ConversationStore, StoreError};

/// Service for managing stored conversations.
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
}

impl ConversationService {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Create and persist an empty conversation.
    pub async fn create_conversation(&self) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new();
        self.store.insert(&conversation).await?;
        debug!(conversation_id = %conversation.id, "Created conversation");
        Ok(conversation)
    }

    pub async fn delete_conversation(&self, id: ConversationId) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        debug!(conversation_id = %id, "Deleted conversation");
        Ok(())
    }

    pub async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, StoreError> {
        self.store.get(id).await
    }

    /// Like [`Self::get_conversation`], but a missing conversation is an error.
    pub async fn require_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Conversation, StoreError> {
        self.store
            .get(id)
            .await?
            .ok_or(StoreError::ConversationNotFound(id))
    }

    /// All conversations, most recently active first.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut conversations = self.store.list().await?;
        sort_by_recency(&mut conversations);
        Ok(conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::testing::MemoryStore;
    use chrono::{Duration, Utc};

    fn service() -> (ConversationService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ConversationService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_persists_empty_conversation() {
        let (service, store) = service();

        let conv = service.create_conversation().await.unwrap();

        assert_eq!(store.stored(conv.id), Some(conv.clone()));
        assert!(conv.messages.is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_last_message() {
        let (service, store) = service();
        let base = Utc::now();

        let mut old = Conversation::new();
        let mut msg = Message::user("first");
        msg.created_at = base - Duration::minutes(10);
        old.messages.push(msg);

        let mut recent = Conversation::new();
        let mut msg = Message::user("second");
        msg.created_at = base;
        recent.messages.push(msg);

        let mut empty = Conversation::new();
        empty.created_at = base - Duration::minutes(5);

        for conv in [&old, &recent, &empty] {
            store.insert(conv).await.unwrap();
        }

        let ids: Vec<_> = service
            .list_conversations()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![recent.id, empty.id, old.id]);
    }

    #[tokio::test]
    async fn test_require_missing_conversation() {
        let (service, _store) = service();
        let id = ConversationId::new();

        assert!(service.get_conversation(id).await.unwrap().is_none());
        assert!(matches!(
            service.require_conversation(id).await,
            Err(StoreError::ConversationNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_delete_and_store_errors_surface() {
        let (service, store) = service();
        let conv = service.create_conversation().await.unwrap();

        service.delete_conversation(conv.id).await.unwrap();
        assert!(store.stored(conv.id).is_none());

        store.set_failing(true);
        assert!(matches!(
            service.create_conversation().await,
            Err(StoreError::Database(_))
        ));
        assert!(service.list_conversations().await.is_err());
    }
}
