//! Tracks which conversations currently have a turn running.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::ConversationId;

use super::ChatError;

type ActiveSet = Arc<Mutex<HashSet<ConversationId>>>;

fn lock(active: &Mutex<HashSet<ConversationId>>) -> MutexGuard<'_, HashSet<ConversationId>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry enforcing at most one active turn per conversation.
#[derive(Debug, Clone, Default)]
pub(crate) struct TurnRegistry {
    active: ActiveSet,
}

impl TurnRegistry {
    /// Claim a conversation. The claim lasts until the guard is dropped.
    pub(crate) fn begin(&self, id: ConversationId) -> Result<TurnGuard, ChatError> {
        if !lock(&self.active).insert(id) {
            return Err(ChatError::TurnInProgress(id));
        }
        Ok(TurnGuard {
            active: Arc::clone(&self.active),
            id,
        })
    }

    pub(crate) fn is_active(&self, id: ConversationId) -> bool {
        lock(&self.active).contains(&id)
    }
}

/// Releases its conversation on drop, including when a turn future is
/// abandoned mid-stream.
#[derive(Debug)]
pub(crate) struct TurnGuard {
    active: ActiveSet,
    id: ConversationId,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected_until_release() {
        let registry = TurnRegistry::default();
        let id = ConversationId::new();

        let guard = registry.begin(id).unwrap();
        assert!(registry.is_active(id));
        assert!(matches!(
            registry.begin(id),
            Err(ChatError::TurnInProgress(busy)) if busy == id
        ));

        drop(guard);
        assert!(!registry.is_active(id));
        assert!(registry.begin(id).is_ok());
    }

    #[test]
    fn test_distinct_conversations_independent() {
        let registry = TurnRegistry::default();
        let _a = registry.begin(ConversationId::new()).unwrap();
        let _b = registry.begin(ConversationId::new()).unwrap();
    }
}
