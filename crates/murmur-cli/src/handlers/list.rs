//! List command handler.
//!
//! Prints conversations most recently active first, as a table or JSON.

use anyhow::Result;
use chrono::{DateTime, Utc};
use murmur_core::{Conversation, ConversationId};
use serde::Serialize;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_timestamp, print_separator, truncate_string};

const TABLE_WIDTH: usize = 100;

/// One row of the conversation list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRow {
    pub id: ConversationId,
    pub summary: String,
    pub last_message_at: DateTime<Utc>,
    pub message_count: usize,
}

impl From<&Conversation> for ConversationRow {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            summary: conversation.summary.clone(),
            last_message_at: conversation.last_message_timestamp(),
            message_count: conversation.messages.len(),
        }
    }
}

/// Execute the list command.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    let conversations = ctx
        .conversations
        .list_conversations()
        .await
        .map_err(CliError::from)?;
    let rows: Vec<ConversationRow> = conversations.iter().map(ConversationRow::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No conversations yet. Start one with `murmur chat`.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<16}  {:>5}  Summary",
        "ID", "Last activity", "Msgs"
    );
    print_separator(TABLE_WIDTH);
    for row in &rows {
        println!(
            "{:<36}  {:<16}  {:>5}  {}",
            row.id,
            format_timestamp(row.last_message_at),
            row.message_count,
            truncate_string(&row.summary, 34)
        );
    }
    Ok(())
}
