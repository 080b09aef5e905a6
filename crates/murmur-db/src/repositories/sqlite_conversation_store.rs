//! `SQLite` implementation of the `ConversationStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use murmur_core::{Conversation, ConversationId, ConversationStore, Message, StoreError};

use super::row_mappers::{
    CONVERSATION_SELECT_COLUMNS, MESSAGE_SELECT_COLUMNS, db_error, format_timestamp,
    row_to_conversation, row_to_message,
};

/// `SQLite` implementation of the `ConversationStore` trait.
///
/// A conversation is one row in `conversations` plus one row per message
/// in `messages`, ordered by `position`.
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    /// Create a new `SQLite` conversation store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace every message row of `conversation` with its current messages.
    async fn replace_messages(
        tx: &mut Transaction<'_, Sqlite>,
        conversation: &Conversation,
    ) -> Result<(), StoreError> {
        let conversation_id = conversation.id.to_string();

        sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(&conversation_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;

        for (position, message) in (0_i64..).zip(&conversation.messages) {
            sqlx::query(
                "INSERT INTO messages (id, conversation_id, position, role, content, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(message.id.to_string())
            .bind(&conversation_id)
            .bind(position)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(format_timestamp(&message.created_at))
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;
        }

        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let result =
            sqlx::query("INSERT INTO conversations (id, summary, created_at) VALUES (?, ?, ?)")
                .bind(conversation.id.to_string())
                .bind(&conversation.summary)
                .bind(format_timestamp(&conversation.created_at))
                .execute(&mut *tx)
                .await;
        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::AlreadyExists(conversation.id));
            }
            Err(e) => return Err(db_error(e)),
        }

        Self::replace_messages(&mut tx, conversation).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let result = sqlx::query("UPDATE conversations SET summary = ? WHERE id = ?")
            .bind(&conversation.summary)
            .bind(conversation.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        // Deleted rows stay deleted; only `insert` creates a conversation.
        if result.rows_affected() == 0 {
            return Err(StoreError::ConversationNotFound(conversation.id));
        }

        Self::replace_messages(&mut tx, conversation).await?;
        tx.commit().await.map_err(db_error)?;

        debug!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "Saved conversation"
        );
        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ConversationNotFound(id));
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_SELECT_COLUMNS} FROM conversations WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let messages = sqlx::query(&format!(
            "SELECT {MESSAGE_SELECT_COLUMNS} FROM messages
             WHERE conversation_id = ? ORDER BY position"
        ))
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?
        .iter()
        .map(row_to_message)
        .collect::<Result<Vec<_>, _>>()?;

        row_to_conversation(&row, messages).map(Some)
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        let message_rows = sqlx::query(&format!(
            "SELECT {MESSAGE_SELECT_COLUMNS} FROM messages ORDER BY conversation_id, position"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut messages: HashMap<String, Vec<Message>> = HashMap::new();
        for row in &message_rows {
            let conversation_id: String = row.try_get("conversation_id").map_err(db_error)?;
            messages
                .entry(conversation_id)
                .or_default()
                .push(row_to_message(row)?);
        }

        let rows = sqlx::query(&format!(
            "SELECT {CONVERSATION_SELECT_COLUMNS} FROM conversations"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(db_error)?;
                row_to_conversation(row, messages.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup_test_database;
    use murmur_core::MessageRole;

    async fn store() -> SqliteConversationStore {
        SqliteConversationStore::new(setup_test_database().await.unwrap())
    }

    fn conversation_with(contents: &[(MessageRole, &str)]) -> Conversation {
        let mut conv = Conversation::new();
        for (role, content) in contents {
            conv.messages.push(Message::new(*role, *content));
        }
        conv
    }

    #[tokio::test]
    async fn test_insert_and_get_roundtrip() {
        let store = store().await;
        let conv = conversation_with(&[
            (MessageRole::User, "hello"),
            (MessageRole::Assistant, "hi there"),
        ]);

        store.insert(&conv).await.unwrap();

        assert_eq!(store.get(conv.id).await.unwrap(), Some(conv));
    }

    #[tokio::test]
    async fn test_insert_twice_is_already_exists() {
        let store = store().await;
        let conv = Conversation::new();

        store.insert(&conv).await.unwrap();

        assert!(matches!(
            store.insert(&conv).await,
            Err(StoreError::AlreadyExists(id)) if id == conv.id
        ));
    }

    #[tokio::test]
    async fn test_save_overwrites_content_and_summary() {
        let store = store().await;
        let mut conv = conversation_with(&[(MessageRole::User, "q")]);
        store.insert(&conv).await.unwrap();

        conv.messages.push(Message::assistant_placeholder());
        conv.messages[1].content = "streamed answer".into();
        conv.summary = "A question".into();
        store.save(&conv).await.unwrap();

        let loaded = store.get(conv.id).await.unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[1].content, "streamed answer");
        assert_eq!(loaded.summary, "A question");
    }

    #[tokio::test]
    async fn test_save_unknown_is_not_found() {
        let pool = setup_test_database().await.unwrap();
        let store = SqliteConversationStore::new(pool.clone());
        let conv = conversation_with(&[(MessageRole::User, "first")]);

        assert!(matches!(
            store.save(&conv).await,
            Err(StoreError::ConversationNotFound(id)) if id == conv.id
        ));
        assert!(store.get(conv.id).await.unwrap().is_none());
        let (messages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(messages, 0);
    }

    #[tokio::test]
    async fn test_messages_keep_append_order() {
        let store = store().await;
        let contents: Vec<String> = (0..12).map(|i| format!("message {i}")).collect();
        let mut conv = Conversation::new();
        for content in &contents {
            conv.messages.push(Message::user(content.clone()));
        }

        store.insert(&Conversation { messages: Vec::new(), ..conv.clone() }).await.unwrap();
        store.save(&conv).await.unwrap();

        let loaded = store.get(conv.id).await.unwrap().unwrap();
        let loaded: Vec<_> = loaded.messages.into_iter().map(|m| m.content).collect();
        assert_eq!(loaded, contents);
    }

    #[tokio::test]
    async fn test_delete_removes_messages() {
        let pool = setup_test_database().await.unwrap();
        let store = SqliteConversationStore::new(pool.clone());
        let conv = conversation_with(&[(MessageRole::User, "bye")]);
        store.insert(&conv).await.unwrap();

        store.delete(conv.id).await.unwrap();

        assert!(store.get(conv.id).await.unwrap().is_none());
        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let store = store().await;
        let id = ConversationId::new();

        assert!(matches!(
            store.delete(id).await,
            Err(StoreError::ConversationNotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_list_attaches_each_conversations_messages() {
        let store = store().await;
        let a = conversation_with(&[(MessageRole::User, "a1"), (MessageRole::Assistant, "a2")]);
        let b = conversation_with(&[(MessageRole::User, "b1")]);
        let empty = Conversation::new();
        for conv in [&a, &b, &empty] {
            store.insert(conv).await.unwrap();
        }

        let mut listed = store.list().await.unwrap();
        listed.sort_by_key(|c| c.id);
        let mut expected = vec![a, b, empty];
        expected.sort_by_key(|c| c.id);

        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn test_corrupt_id_is_reported() {
        let pool = setup_test_database().await.unwrap();
        sqlx::query(
            "INSERT INTO conversations (id, summary, created_at)
             VALUES ('not-a-uuid', 's', '2024-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let store = SqliteConversationStore::new(pool);

        assert!(matches!(store.list().await, Err(StoreError::Corrupt(_))));
    }
}
