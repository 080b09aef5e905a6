//! Chat events emitted while a turn runs.
//!
//! Adapters that render a conversation subscribe to these instead of
//! observing the conversation directly.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "message_updated", "conversationId": "…", "messageId": "…", "content": "Hel" }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{ConversationId, Message, MessageId};

/// Phases of a single turn.
///
/// `ReplyFinalized` and `SummaryFinalized` are reached on success and on
/// failure alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    UserMessageAppended,
    AwaitingReplyStream,
    StreamingReply,
    ReplyFinalized,
    AwaitingSummaryStream,
    StreamingSummary,
    SummaryFinalized,
}

/// How a streamed field ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finalization {
    Completed,
    Failed,
    Cancelled,
}

/// Notification of a change to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A turn began for this conversation.
    TurnStarted {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
    },

    /// The turn moved to a new phase.
    PhaseChanged {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
        phase: TurnPhase,
    },

    /// A message was appended (user echo or assistant placeholder).
    MessageAppended {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
        message: Message,
    },

    /// A streaming message received a new content snapshot.
    MessageUpdated {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
        #[serde(rename = "messageId")]
        message_id: MessageId,
        content: String,
    },

    /// A streaming message will not change again.
    MessageFinalized {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
        #[serde(rename = "messageId")]
        message_id: MessageId,
        content: String,
        outcome: Finalization,
    },

    /// The summary received a new snapshot.
    SummaryUpdated {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
        summary: String,
    },

    /// The summary will not change again this turn.
    SummaryFinalized {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
        summary: String,
        outcome: Finalization,
    },

    /// The turn returned control; the conversation is idle.
    TurnFinished {
        #[serde(rename = "conversationId")]
        conversation_id: ConversationId,
    },
}

impl ChatEvent {
    /// The conversation this event belongs to.
    pub const fn conversation_id(&self) -> ConversationId {
        match self {
            Self::TurnStarted { conversation_id }
            | Self::PhaseChanged {
                conversation_id, ..
            }
            | Self::MessageAppended {
                conversation_id, ..
            }
            | Self::MessageUpdated {
                conversation_id, ..
            }
            | Self::MessageFinalized {
                conversation_id, ..
            }
            | Self::SummaryUpdated {
                conversation_id, ..
            }
            | Self::SummaryFinalized {
                conversation_id, ..
            }
            | Self::TurnFinished { conversation_id } => *conversation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let id = ConversationId::new();
        let event = ChatEvent::PhaseChanged {
            conversation_id: id,
            phase: TurnPhase::StreamingReply,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["phase"], "streaming_reply");
        assert_eq!(json["conversationId"], id.to_string());
    }

    #[test]
    fn test_conversation_id_accessor() {
        let id = ConversationId::new();
        let event = ChatEvent::SummaryUpdated {
            conversation_id: id,
            summary: "s".into(),
        };
        assert_eq!(event.conversation_id(), id);
    }
}
