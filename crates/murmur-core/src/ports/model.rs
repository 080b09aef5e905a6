//! Language model port.
//!
//! This port defines everything the orchestrator needs from a model
//! runtime. Inference itself happens behind it; the core only sequences
//! calls and consumes the streams they return.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::domain::{Message, ReadinessSignal};

/// A failure reported by a model stream while it was generating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The transport to the model broke mid-stream.
    #[error("connection to the model was lost: {0}")]
    Transport(String),

    /// The model runtime reported an error.
    #[error("{0}")]
    Model(String),

    /// The stream carried data that could not be understood.
    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// One part of a streamed reply.
///
/// `content` is the full reply generated so far, not a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyPart {
    pub content: Option<String>,
}

impl ReplyPart {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// Finite, non-restartable stream of reply snapshots.
pub type ReplyStream = BoxStream<'static, Result<ReplyPart, GenerationError>>;

/// Finite, non-restartable stream of summary snapshots.
pub type SummaryStream = BoxStream<'static, Result<String, GenerationError>>;

/// Port for the language model runtime.
#[async_trait]
pub trait LanguageModelPort: Send + Sync {
    /// Report whether the model can currently serve requests.
    async fn check_availability(&self) -> ReadinessSignal;

    /// Start streaming a reply to the last message of `context`.
    ///
    /// Returns `None` when the model declines (for example because it is
    /// unavailable). That is not an error.
    async fn stream_reply(&self, context: &[Message]) -> Option<ReplyStream>;

    /// Start streaming a short summary of `context`.
    ///
    /// Returns `None` when the model declines.
    async fn stream_summary(&self, context: &[Message]) -> Option<SummaryStream>;

    /// Hint that the model will be used soon. Fire-and-forget.
    fn prewarm(&self);
}
