//! Per-conversation turn serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::ConversationId;

/// Hands out one async mutex per conversation so turns for the same
/// conversation never interleave their append windows. Turns for different
/// conversations proceed independently.
#[derive(Default)]
pub(crate) struct TurnLocks {
    inner: Mutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>,
}

impl TurnLocks {
    pub(crate) async fn acquire(&self, id: ConversationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("turn lock map poisoned");
            map.entry(id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn same_conversation_waits_for_the_guard() {
        let locks = Arc::new(TurnLocks::default());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_conversations_do_not_contend() {
        let locks = TurnLocks::default();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let _b = locks.acquire(Uuid::new_v4()).await;
    }
}
