//! Subcommand definitions.

use clap::Subcommand;
use murmur_core::ConversationId;

use crate::config_commands::ConfigCommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the local model is ready
    Status,
    /// Start a new, empty conversation
    New,
    /// List conversations, most recently active first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print every message of a conversation
    Show {
        /// Conversation ID
        id: ConversationId,
    },
    /// Delete a conversation and its messages
    Delete {
        /// Conversation ID
        id: ConversationId,
    },
    /// Chat interactively (Ctrl+C cancels a reply, /quit exits)
    Chat {
        /// Conversation to continue; a new one is started when omitted
        id: Option<ConversationId>,
    },
    /// View or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}
