//! Per-session serialization.
//!
//! Recover, run phase and persist must not interleave for one session key,
//! otherwise two workers can both see `Started` and both apply Execute.
//! Different keys never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::SessionKey;

#[derive(Debug, Default)]
pub(crate) struct SessionLocks {
    locks: Mutex<HashMap<SessionKey, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until no other transaction holds `key`.
    pub(crate) async fn acquire(&self, key: SessionKey) -> SessionGuard<'_> {
        let lock = Arc::clone(self.locks.lock().entry(key).or_default());
        let guard = lock.lock_owned().await;
        SessionGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    /// Keys with a holder or a waiter.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

pub(crate) struct SessionGuard<'a> {
    owner: &'a SessionLocks,
    key: SessionKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.locks.lock();
        drop(self.guard.take());
        // only the map's own reference left: nobody is waiting
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}
