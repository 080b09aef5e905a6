//! Application services.
//!
//! Services own the conversation state machine and coordinate the ports;
//! they hold no infrastructure types.

mod chat_orchestrator;
mod conversation_service;
mod turn_registry;

use thiserror::Error;

use crate::domain::ConversationId;

pub use chat_orchestrator::{
    CANCELLED_MARKER, ChatOrchestrator, ReplyOutcome, SummaryOutcome, TurnOutcome, error_marker,
};
pub use conversation_service::ConversationService;

/// Errors that stop a chat operation before it touches the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("A turn is already running for conversation {0}")]
    TurnInProgress(ConversationId),
}
