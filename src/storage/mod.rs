//! Selected-wallet persistence
//!
//! The store remembers the name of the last selected wallet under a single
//! key. Repositories provide load/save on that key and may report changes
//! made by other writers (another store sharing the same backing storage).

mod file;
mod memory;

pub use file::FileNameRepository;
pub use memory::MemoryNameRepository;

use std::sync::Arc;
use tracing::warn;

use crate::reactive::{Atom, Readable, Subscription};

/// Errors raised by a name repository
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Callback receiving the new value written by another writer
pub type NameListener = Arc<dyn Fn(Option<String>) + Send + Sync>;

/// Key-value storage for the selected wallet name
pub trait NameRepository: Send + Sync {
    /// Read the value stored under `key`
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `name` under `key`; `None` removes the entry
    fn save(&self, key: &str, name: Option<&str>) -> Result<(), StorageError>;

    /// Observe changes to `key`; `None` when the backend cannot report them
    fn watch(self: Arc<Self>, _key: &str, _listener: NameListener) -> Option<Subscription> {
        None
    }
}

/// Build the selected-name cell backed by `repository`.
///
/// The cell starts with the stored value, writes every change through, and
/// follows changes reported by the repository. The returned subscriptions
/// keep that wiring alive.
pub fn persisted_name(
    repository: &Arc<dyn NameRepository>,
    key: &str,
) -> (Atom<Option<String>>, Vec<Subscription>) {
    let initial = repository.load(key).unwrap_or_else(|e| {
        warn!("Failed to load selected wallet from '{}': {}", key, e);
        None
    });
    let name = Atom::new(initial);
    let mut subscriptions = Vec::new();

    {
        let repository = repository.clone();
        let key = key.to_string();
        let current = name.clone();
        // Queued notifications may be stale; storage always gets the latest value.
        subscriptions.push(name.listen(move |_: &Option<String>| {
            if let Err(e) = repository.save(&key, current.get().as_deref()) {
                warn!("Failed to persist selected wallet to '{}': {}", key, e);
            }
        }));
    }

    let follower = name.clone();
    if let Some(subscription) = repository
        .clone()
        .watch(key, Arc::new(move |value| follower.set(value)))
    {
        subscriptions.push(subscription);
    }

    (name, subscriptions)
}
