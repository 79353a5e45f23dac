use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Per-key async locks. Work done while holding a key's guard never overlaps
/// with other work for the same key; different keys never contend.
pub struct KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    inner: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop slots nobody is holding or waiting on
            locks.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        match Arc::clone(&slot).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(key = ?key, "Waiting for in-flight work");
                slot.lock_owned().await
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
