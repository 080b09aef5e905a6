//! New command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Create an empty conversation and print its ID.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let conversation = ctx
        .conversations
        .create_conversation()
        .await
        .map_err(CliError::from)?;
    println!("✓ Created conversation {}", conversation.id);
    Ok(())
}
