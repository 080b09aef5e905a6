//! Domain types for murmur.
//!
//! Pure data and pure functions; nothing here performs I/O.

pub mod availability;
pub mod chat;

pub use availability::{AvailabilityState, ReadinessSignal, UnavailableReason, classify};
pub use chat::{
    Conversation, ConversationId, Message, MessageId, MessageRole, NEW_CONVERSATION_SUMMARY,
    sort_by_recency,
};
