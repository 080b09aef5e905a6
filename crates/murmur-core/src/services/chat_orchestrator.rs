//! Chat orchestrator - sequences the two model streams of a turn.
//!
//! A turn appends the user's message, streams the assistant reply into a
//! placeholder message, then streams a regenerated conversation summary.
//! Model streams yield full snapshots, so every part replaces the field it
//! targets. All writes to the conversation happen here.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{Conversation, ConversationId, Message, MessageId};
use crate::events::{ChatEvent, Finalization, TurnPhase};
use crate::ports::{ChatEventEmitter, ConversationStore, GenerationError, LanguageModelPort};

use super::ChatError;
use super::turn_registry::TurnRegistry;

/// Appended to content whose stream was cancelled.
pub const CANCELLED_MARKER: &str = "[cancelled]";

/// Text written in place of a reply or summary whose stream failed.
#[must_use]
pub fn error_marker(error: &GenerationError) -> String {
    format!("Error: {error}")
}

fn cancelled_content(partial: &str) -> String {
    if partial.is_empty() {
        CANCELLED_MARKER.to_string()
    } else {
        format!("{partial} {CANCELLED_MARKER}")
    }
}

/// How the reply phase of a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// The model produced no stream; no assistant message was added.
    Declined,
    Completed {
        message_id: MessageId,
    },
    /// The stream failed; the message holds an error marker.
    Failed {
        message_id: MessageId,
        error: GenerationError,
    },
    /// The turn was cancelled mid-stream; the message holds the last
    /// snapshot plus a cancellation marker.
    Cancelled {
        message_id: MessageId,
    },
}

/// How the summary phase of a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Declined,
    Completed,
    /// The stream failed; the summary holds an error marker.
    Failed {
        error: GenerationError,
    },
    Cancelled,
    /// Not attempted because the reply was cancelled.
    Skipped,
}

/// Result of a full turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: ReplyOutcome,
    pub summary: SummaryOutcome,
}

enum StreamEnd {
    Completed,
    Failed(GenerationError),
    Cancelled,
}

/// Drive `stream` to its end, handing every item to `on_part`.
async fn drain<S, T>(
    mut stream: S,
    cancel: &CancellationToken,
    mut on_part: impl FnMut(T),
) -> StreamEnd
where
    S: Stream<Item = Result<T, GenerationError>> + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return StreamEnd::Cancelled,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(part)) => on_part(part),
            Some(Err(error)) => return StreamEnd::Failed(error),
            None => return StreamEnd::Completed,
        }
    }
}

/// Runs chat turns against a language model and a conversation store.
///
/// Cheap to share behind an `Arc`; different conversations may run turns
/// concurrently, the same conversation may not.
pub struct ChatOrchestrator {
    model: Arc<dyn LanguageModelPort>,
    store: Arc<dyn ConversationStore>,
    events: Arc<dyn ChatEventEmitter>,
    turns: TurnRegistry,
}

impl ChatOrchestrator {
    pub fn new(
        model: Arc<dyn LanguageModelPort>,
        store: Arc<dyn ConversationStore>,
        events: Arc<dyn ChatEventEmitter>,
    ) -> Self {
        Self {
            model,
            store,
            events,
            turns: TurnRegistry::default(),
        }
    }

    /// Ask the model to get ready for use. Best effort, returns immediately.
    pub fn prewarm(&self) {
        self.model.prewarm();
    }

    /// Whether a turn is currently running for `id`.
    pub fn is_turn_active(&self, id: ConversationId) -> bool {
        self.turns.is_active(id)
    }

    /// Run a full turn: reply, then summary.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        text: impl Into<String>,
    ) -> Result<TurnOutcome, ChatError> {
        self.run_turn_with_cancel(conversation, text, &CancellationToken::new())
            .await
    }

    /// Run a full turn that stops early when `cancel` fires.
    ///
    /// The summary phase runs after the reply phase whatever its outcome,
    /// except when the reply was cancelled.
    pub async fn run_turn_with_cancel(
        &self,
        conversation: &mut Conversation,
        text: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, ChatError> {
        let _guard = self.turns.begin(conversation.id)?;
        let conversation_id = conversation.id;
        self.events.emit(ChatEvent::TurnStarted { conversation_id });

        let reply = self.reply_phase(conversation, text.into(), cancel).await;
        let summary = if matches!(reply, ReplyOutcome::Cancelled { .. }) {
            SummaryOutcome::Skipped
        } else {
            self.summary_phase(conversation, cancel).await
        };

        self.phase(conversation_id, TurnPhase::Idle);
        self.events.emit(ChatEvent::TurnFinished { conversation_id });
        info!(%conversation_id, ?reply, ?summary, "Turn finished");

        Ok(TurnOutcome { reply, summary })
    }

    /// Append the user's message and stream the assistant reply.
    pub async fn send_user_message(
        &self,
        conversation: &mut Conversation,
        text: impl Into<String>,
    ) -> Result<ReplyOutcome, ChatError> {
        self.send_user_message_with_cancel(conversation, text, &CancellationToken::new())
            .await
    }

    pub async fn send_user_message_with_cancel(
        &self,
        conversation: &mut Conversation,
        text: impl Into<String>,
        cancel: &CancellationToken,
    ) -> Result<ReplyOutcome, ChatError> {
        let _guard = self.turns.begin(conversation.id)?;
        Ok(self.reply_phase(conversation, text.into(), cancel).await)
    }

    /// Regenerate the conversation summary.
    pub async fn refresh_summary(
        &self,
        conversation: &mut Conversation,
    ) -> Result<SummaryOutcome, ChatError> {
        let _guard = self.turns.begin(conversation.id)?;
        Ok(self
            .summary_phase(conversation, &CancellationToken::new())
            .await)
    }

    async fn reply_phase(
        &self,
        conversation: &mut Conversation,
        text: String,
        cancel: &CancellationToken,
    ) -> ReplyOutcome {
        let conversation_id = conversation.id;

        let user_message = Message::user(text);
        conversation.messages.push(user_message.clone());
        self.persist(conversation).await;
        self.events.emit(ChatEvent::MessageAppended {
            conversation_id,
            message: user_message,
        });
        self.phase(conversation_id, TurnPhase::UserMessageAppended);

        self.phase(conversation_id, TurnPhase::AwaitingReplyStream);
        let Some(stream) = self.model.stream_reply(&conversation.messages).await else {
            warn!(%conversation_id, "Model declined to stream a reply");
            self.phase(conversation_id, TurnPhase::ReplyFinalized);
            return ReplyOutcome::Declined;
        };

        let placeholder = Message::assistant_placeholder();
        let message_id = placeholder.id;
        conversation.messages.push(placeholder.clone());
        self.events.emit(ChatEvent::MessageAppended {
            conversation_id,
            message: placeholder,
        });
        self.phase(conversation_id, TurnPhase::StreamingReply);

        let end = drain(stream, cancel, |part| {
            if let Some(message) = conversation.message_mut(message_id) {
                message.content = part.content.unwrap_or_default();
                self.events.emit(ChatEvent::MessageUpdated {
                    conversation_id,
                    message_id,
                    content: message.content.clone(),
                });
            }
        })
        .await;

        let mut content = conversation
            .message(message_id)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let (outcome, finalization) = match end {
            StreamEnd::Completed => (
                ReplyOutcome::Completed { message_id },
                Finalization::Completed,
            ),
            StreamEnd::Failed(error) => {
                warn!(%conversation_id, %error, "Reply stream failed");
                content = error_marker(&error);
                (
                    ReplyOutcome::Failed { message_id, error },
                    Finalization::Failed,
                )
            }
            StreamEnd::Cancelled => {
                debug!(%conversation_id, "Reply stream cancelled");
                content = cancelled_content(&content);
                (
                    ReplyOutcome::Cancelled { message_id },
                    Finalization::Cancelled,
                )
            }
        };

        if let Some(message) = conversation.message_mut(message_id) {
            message.content.clone_from(&content);
        }
        self.persist(conversation).await;
        self.events.emit(ChatEvent::MessageFinalized {
            conversation_id,
            message_id,
            content,
            outcome: finalization,
        });
        self.phase(conversation_id, TurnPhase::ReplyFinalized);

        outcome
    }

    async fn summary_phase(
        &self,
        conversation: &mut Conversation,
        cancel: &CancellationToken,
    ) -> SummaryOutcome {
        let conversation_id = conversation.id;

        self.phase(conversation_id, TurnPhase::AwaitingSummaryStream);
        let Some(stream) = self.model.stream_summary(&conversation.messages).await else {
            warn!(%conversation_id, "Model declined to stream a summary");
            self.phase(conversation_id, TurnPhase::SummaryFinalized);
            return SummaryOutcome::Declined;
        };
        self.phase(conversation_id, TurnPhase::StreamingSummary);

        let end = drain(stream, cancel, |part| {
            conversation.summary = part;
            self.events.emit(ChatEvent::SummaryUpdated {
                conversation_id,
                summary: conversation.summary.clone(),
            });
        })
        .await;

        let (outcome, finalization) = match end {
            StreamEnd::Completed => (SummaryOutcome::Completed, Finalization::Completed),
            StreamEnd::Failed(error) => {
                warn!(%conversation_id, %error, "Summary stream failed");
                conversation.summary = error_marker(&error);
                (SummaryOutcome::Failed { error }, Finalization::Failed)
            }
            StreamEnd::Cancelled => {
                debug!(%conversation_id, "Summary stream cancelled");
                (SummaryOutcome::Cancelled, Finalization::Cancelled)
            }
        };

        self.persist(conversation).await;
        self.events.emit(ChatEvent::SummaryFinalized {
            conversation_id,
            summary: conversation.summary.clone(),
            outcome: finalization,
        });
        self.phase(conversation_id, TurnPhase::SummaryFinalized);

        outcome
    }

    fn phase(&self, conversation_id: ConversationId, phase: TurnPhase) {
        debug!(%conversation_id, ?phase, "Turn phase");
        self.events.emit(ChatEvent::PhaseChanged {
            conversation_id,
            phase,
        });
    }

    /// Best-effort save; the in-memory conversation stays authoritative.
    async fn persist(&self, conversation: &Conversation) {
        if let Err(error) = self.store.save(conversation).await {
            warn!(conversation_id = %conversation.id, %error, "Failed to persist conversation");
        }
    }
}
