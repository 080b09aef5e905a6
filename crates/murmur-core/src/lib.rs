#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use domain::{
    AvailabilityState, Conversation, ConversationId, Message, MessageId, MessageRole,
    ReadinessSignal, UnavailableReason, classify, sort_by_recency,
};
pub use events::{ChatEvent, TurnPhase};
pub use ports::{
    ChatEventEmitter, ConversationStore, GenerationError, LanguageModelPort, NoopEmitter,
    ReplyPart, ReplyStream, Repos, SettingsRepository, SettingsStoreError, StoreError,
    SummaryStream,
};
pub use services::{
    ChatError, ChatOrchestrator, ConversationService, ReplyOutcome, SummaryOutcome, TurnOutcome,
};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};

pub use paths::{PathError, data_root, database_path};
