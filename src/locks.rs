use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    // holders plus waiters
    users: usize,
}

/// One async mutex per key, created on demand and dropped once nobody holds
/// or waits on it.
#[derive(Default)]
pub struct KeyedLocks {
    inner: Mutex<HashMap<String, Slot>>,
}

/// Counts as a user of its key from the moment `lock` is called, so a wait
/// that is cancelled still deregisters.
pub struct KeyedGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyedGuard<'_> {
        let mutex = {
            let mut map = self.inner.lock();
            let slot = map.entry(key.to_string()).or_insert_with(|| Slot {
                mutex: Arc::default(),
                users: 0,
            });
            slot.users += 1;
            slot.mutex.clone()
        };
        let mut keyed = KeyedGuard { locks: self, key: key.to_string(), guard: None };
        keyed.guard = Some(mutex.lock_owned().await);
        keyed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.inner.lock();
        if let Some(slot) = map.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                map.remove(&self.key);
            }
        }
    }
}
