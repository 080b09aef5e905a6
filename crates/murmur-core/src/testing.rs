//! In-memory fakes for every port.
//!
//! Available under `cfg(test)` and the `test-utils` feature so adapter
//! crates can drive the orchestrator without a model server.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tokio::sync::Notify;

use crate::domain::{Conversation, ConversationId, Message, ReadinessSignal};
use crate::events::{ChatEvent, TurnPhase};
use crate::ports::{
    ChatEventEmitter, ConversationStore, GenerationError, LanguageModelPort, ReplyPart,
    ReplyStream, StoreError, SummaryStream,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a scripted stream call does.
#[derive(Debug, Clone)]
pub enum Script<T> {
    /// The model declines; no stream is returned.
    Decline,
    /// A stream yielding these items, then ending.
    Parts(Vec<Result<T, GenerationError>>),
    /// Like `Parts`, but nothing is yielded until the gate is notified.
    Gated {
        gate: Arc<Notify>,
        parts: Vec<Result<T, GenerationError>>,
    },
    /// Yields these items, then stays pending forever.
    Stall(Vec<Result<T, GenerationError>>),
}

impl<T: Clone + Send + 'static> Script<T> {
    fn into_stream(self) -> Option<BoxStream<'static, Result<T, GenerationError>>> {
        match self {
            Self::Decline => None,
            Self::Parts(parts) => Some(stream::iter(parts).boxed()),
            Self::Gated { gate, parts } => Some(
                stream::once(async move { gate.notified().await })
                    .flat_map(move |()| stream::iter(parts.clone()))
                    .boxed(),
            ),
            Self::Stall(parts) => Some(stream::iter(parts).chain(stream::pending()).boxed()),
        }
    }
}

/// A model whose streams are scripted per call.
///
/// Calls beyond the script decline.
#[derive(Debug)]
pub struct ScriptedModel {
    readiness: Mutex<ReadinessSignal>,
    replies: Mutex<VecDeque<Script<ReplyPart>>>,
    summaries: Mutex<VecDeque<Script<String>>>,
    reply_contexts: Mutex<Vec<Vec<Message>>>,
    summary_contexts: Mutex<Vec<Vec<Message>>>,
    prewarms: AtomicUsize,
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readiness: Mutex::new(ReadinessSignal::Available),
            replies: Mutex::new(VecDeque::new()),
            summaries: Mutex::new(VecDeque::new()),
            reply_contexts: Mutex::new(Vec::new()),
            summary_contexts: Mutex::new(Vec::new()),
            prewarms: AtomicUsize::new(0),
        }
    }

    /// Queue the next reply call.
    #[must_use]
    pub fn with_reply(self, script: Script<ReplyPart>) -> Self {
        lock(&self.replies).push_back(script);
        self
    }

    /// Queue a reply stream of plain snapshots.
    #[must_use]
    pub fn with_reply_parts(self, parts: &[&str]) -> Self {
        let parts = parts.iter().map(|p| Ok(ReplyPart::new(*p))).collect();
        self.with_reply(Script::Parts(parts))
    }

    /// Queue the next summary call.
    #[must_use]
    pub fn with_summary(self, script: Script<String>) -> Self {
        lock(&self.summaries).push_back(script);
        self
    }

    /// Queue a summary stream of plain snapshots.
    #[must_use]
    pub fn with_summary_parts(self, parts: &[&str]) -> Self {
        let parts = parts.iter().map(|p| Ok((*p).to_string())).collect();
        self.with_summary(Script::Parts(parts))
    }

    pub fn set_readiness(&self, signal: ReadinessSignal) {
        *lock(&self.readiness) = signal;
    }

    /// Contexts passed to each `stream_reply` call, in order.
    pub fn reply_contexts(&self) -> Vec<Vec<Message>> {
        lock(&self.reply_contexts).clone()
    }

    /// Contexts passed to each `stream_summary` call, in order.
    pub fn summary_contexts(&self) -> Vec<Vec<Message>> {
        lock(&self.summary_contexts).clone()
    }

    pub fn prewarm_count(&self) -> usize {
        self.prewarms.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModelPort for ScriptedModel {
    async fn check_availability(&self) -> ReadinessSignal {
        lock(&self.readiness).clone()
    }

    async fn stream_reply(&self, context: &[Message]) -> Option<ReplyStream> {
        lock(&self.reply_contexts).push(context.to_vec());
        let script = lock(&self.replies).pop_front()?;
        script.into_stream()
    }

    async fn stream_summary(&self, context: &[Message]) -> Option<SummaryStream> {
        lock(&self.summary_contexts).push(context.to_vec());
        let script = lock(&self.summaries).pop_front()?;
        script.into_stream()
    }

    fn prewarm(&self) {
        self.prewarms.fetch_add(1, Ordering::SeqCst);
    }
}

/// Conversation store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    conversations: Mutex<HashMap<ConversationId, Conversation>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a database error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `save` calls that found their conversation.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The stored copy of a conversation.
    pub fn stored(&self, id: ConversationId) -> Option<Conversation> {
        lock(&self.conversations).get(&id).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database("disk I/O error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn insert(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.check()?;
        let mut map = lock(&self.conversations);
        if map.contains_key(&conversation.id) {
            return Err(StoreError::AlreadyExists(conversation.id));
        }
        map.insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.check()?;
        let mut map = lock(&self.conversations);
        let Some(stored) = map.get_mut(&conversation.id) else {
            return Err(StoreError::ConversationNotFound(conversation.id));
        };
        stored.clone_from(conversation);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: ConversationId) -> Result<(), StoreError> {
        self.check()?;
        lock(&self.conversations)
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::ConversationNotFound(id))
    }

    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError> {
        self.check()?;
        Ok(lock(&self.conversations).get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        self.check()?;
        Ok(lock(&self.conversations).values().cloned().collect())
    }
}

/// Emitter that records every event.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<ChatEvent>>,
}

impl RecordingEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        lock(&self.events).clone()
    }

    /// Phase transitions recorded for one conversation.
    pub fn phases(&self, id: ConversationId) -> Vec<TurnPhase> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                ChatEvent::PhaseChanged {
                    conversation_id,
                    phase,
                } if *conversation_id == id => Some(*phase),
                _ => None,
            })
            .collect()
    }
}

impl ChatEventEmitter for RecordingEmitter {
    fn emit(&self, event: ChatEvent) {
        lock(&self.events).push(event);
    }
}
