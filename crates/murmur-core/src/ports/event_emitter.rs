//! Event emitter trait for chat state notifications.
//!
//! The orchestrator publishes every change it makes to a conversation
//! through this trait. Implementations handle transport (terminal
//! rendering, test recorders).

use crate::events::ChatEvent;

/// Trait for emitting chat events.
///
/// `emit` is called on the turn's control path and must not block.
pub trait ChatEventEmitter: Send + Sync {
    /// Emit a chat event.
    fn emit(&self, event: ChatEvent);
}

/// A no-op event emitter for tests and contexts without listeners.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    /// Create a new no-op emitter.
    pub const fn new() -> Self {
        Self
    }
}

impl ChatEventEmitter for NoopEmitter {
    fn emit(&self, _event: ChatEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConversationId;
    use std::sync::Arc;

    #[test]
    fn test_noop_emitter() {
        let emitter = NoopEmitter::new();

        // Should not panic
        emitter.emit(ChatEvent::TurnStarted {
            conversation_id: ConversationId::new(),
        });
    }

    #[test]
    fn test_arc_dyn_emitter() {
        let emitter: Arc<dyn ChatEventEmitter> = Arc::new(NoopEmitter::new());
        emitter.emit(ChatEvent::TurnStarted {
            conversation_id: ConversationId::new(),
        });
    }
}
