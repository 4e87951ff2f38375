//! Per-key call serialization
//!
//! Concurrent calls for one key queue on a shared async lock so that only
//! the first one reaches the backend while the rest wait for its result.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async locks, one per key in use.
///
/// The map only keeps weak handles; a lock disappears once no caller holds
/// or waits on it.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until this caller owns `key`.
    pub(crate) async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            match locks.get(key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    locks.retain(|_, handle| handle.strong_count() > 0);
                    let lock = Arc::new(Mutex::new(()));
                    locks.insert(key.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// Number of keys with a caller holding or waiting on the lock.
    #[cfg(test)]
    pub(crate) async fn active(&self) -> usize {
        self.locks
            .lock()
            .await
            .values()
            .filter(|handle| handle.strong_count() > 0)
            .count()
    }
}
