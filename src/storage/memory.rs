use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{NameListener, NameRepository, StorageError};
use crate::reactive::{lock, Subscription};

/// In-process repository.
///
/// Share one instance between several stores to keep their selection in
/// sync, the way browser tabs share local storage.
#[derive(Default)]
pub struct MemoryNameRepository {
    values: Mutex<HashMap<String, String>>,
    watchers: Mutex<Vec<(u64, String, NameListener)>>,
    next_id: AtomicU64,
}

impl MemoryNameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameRepository for MemoryNameRepository {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn save(&self, key: &str, name: Option<&str>) -> Result<(), StorageError> {
        let changed = {
            let mut values = lock(&self.values);
            let previous = match name {
                Some(name) => values.insert(key.to_string(), name.to_string()),
                None => values.remove(key),
            };
            previous.as_deref() != name
        };
        if !changed {
            return Ok(());
        }

        let watchers: Vec<NameListener> = lock(&self.watchers)
            .iter()
            .filter(|(_, watched, _)| watched == key)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for watcher in watchers {
            watcher(name.map(str::to_string));
        }
        Ok(())
    }

    fn watch(self: Arc<Self>, key: &str, listener: NameListener) -> Option<Subscription> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.watchers).push((id, key.to_string(), listener));

        let weak = Arc::downgrade(&self);
        Some(Subscription::new(move || {
            if let Some(repository) = weak.upgrade() {
                lock(&repository.watchers).retain(|(watcher_id, _, _)| *watcher_id != id);
            }
        }))
    }
}
