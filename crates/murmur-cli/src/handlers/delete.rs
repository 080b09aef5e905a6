//! Delete command handler.

use anyhow::Result;
use murmur_core::ConversationId;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Delete a conversation and all of its messages.
pub async fn execute(ctx: &CliContext, id: ConversationId) -> Result<()> {
    ctx.conversations
        .delete_conversation(id)
        .await
        .map_err(CliError::from)?;
    println!("✓ Deleted conversation {id}");
    Ok(())
}
