//! Show command handler.

use anyhow::Result;
use murmur_core::{Conversation, ConversationId};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print a conversation's summary and every message in order.
pub async fn execute(ctx: &CliContext, id: ConversationId) -> Result<()> {
    let conversation = ctx
        .conversations
        .require_conversation(id)
        .await
        .map_err(CliError::from)?;
    print!("{}", render_transcript(&conversation));
    Ok(())
}

/// Text rendering of a conversation.
pub fn render_transcript(conversation: &Conversation) -> String {
    let mut out = format!(
        "Conversation {}\nSummary: {}\n\n",
        conversation.id, conversation.summary
    );
    if conversation.messages.is_empty() {
        out.push_str("(no messages)\n");
    }
    for message in &conversation.messages {
        out.push_str(&format!("{}> {}\n", message.role, message.content));
    }
    out
}
