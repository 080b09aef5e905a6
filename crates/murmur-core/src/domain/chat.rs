//! Chat domain types.
//!
//! These types represent conversations and messages in the domain model,
//! independent of any infrastructure concerns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary given to a conversation before its first turn completes.
pub const NEW_CONVERSATION_SUMMARY: &str = "New conversation";

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identity of a conversation.
    ConversationId
);
uuid_id!(
    /// Identity of a message.
    MessageId
);

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Parse a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message.
///
/// The content of an assistant message is rewritten while its reply streams
/// and is left alone once that stream has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an empty assistant message to stream a reply into.
    #[must_use]
    pub fn assistant_placeholder() -> Self {
        Self::new(MessageRole::Assistant, String::new())
    }
}

/// A chat conversation: an append-only message log plus a rolling summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub messages: Vec<Message>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with the default summary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            summary: NEW_CONVERSATION_SUMMARY.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Timestamp used to order conversation lists.
    ///
    /// The newest message wins; an empty conversation falls back to its
    /// creation time.
    #[must_use]
    pub fn last_message_timestamp(&self) -> DateTime<Utc> {
        self.messages
            .iter()
            .map(|m| m.created_at)
            .max()
            .unwrap_or(self.created_at)
    }

    /// Look up a message by id.
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub(crate) fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort conversations most recent first by `last_message_timestamp`.
pub fn sort_by_recency(conversations: &mut [Conversation]) {
    conversations.sort_by_key(|c| std::cmp::Reverse(c.last_message_timestamp()));
}
