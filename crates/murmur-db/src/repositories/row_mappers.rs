//! Row mapping helpers for `SQLite` queries.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use murmur_core::{Conversation, Message, MessageRole, StoreError};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Shared SELECT column list for conversation queries.
pub const CONVERSATION_SELECT_COLUMNS: &str = "id, summary, created_at";

/// Shared SELECT column list for message queries.
pub const MESSAGE_SELECT_COLUMNS: &str = "id, conversation_id, role, content, created_at";

pub fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Format a timestamp so that it parses back to the identical instant.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid timestamp {raw:?}: {e}")))
}

fn parse_column<T>(row: &SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.try_get(column).map_err(db_error)?;
    raw.parse()
        .map_err(|e| StoreError::Corrupt(format!("invalid {column} {raw:?}: {e}")))
}

/// Parse a database row into a Message.
pub fn row_to_message(row: &SqliteRow) -> Result<Message, StoreError> {
    let role: String = row.try_get("role").map_err(db_error)?;
    let created_at: String = row.try_get("created_at").map_err(db_error)?;

    Ok(Message {
        id: parse_column(row, "id")?,
        role: MessageRole::parse(&role)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown role {role:?}")))?,
        content: row.try_get("content").map_err(db_error)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Parse a conversation row, attaching its already-loaded messages.
pub fn row_to_conversation(
    row: &SqliteRow,
    messages: Vec<Message>,
) -> Result<Conversation, StoreError> {
    let created_at: String = row.try_get("created_at").map_err(db_error)?;

    Ok(Conversation {
        id: parse_column(row, "id")?,
        messages,
        summary: row.try_get("summary").map_err(db_error)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
