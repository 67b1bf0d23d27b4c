//! Adapter event emitter
//!
//! Adapters own one [`AdapterEvents`] and emit on it; the store registers
//! listeners with `on` and removes them with `off`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::ReadyState;
use crate::error::WalletError;
use crate::reactive::lock;
use crate::types::PublicKey;

/// Events emitted by a wallet adapter
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    /// The adapter connected (possibly without a store-initiated request)
    Connect(PublicKey),
    /// The adapter disconnected
    Disconnect,
    /// The adapter's availability changed
    ReadyStateChange(ReadyState),
    /// The adapter hit an error
    Error(WalletError),
}

/// Identifier returned by [`AdapterEvents::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type EventListener = Arc<dyn Fn(&AdapterEvent) + Send + Sync>;

/// Listener registry for adapter events
#[derive(Default)]
pub struct AdapterEvents {
    listeners: Mutex<Vec<(ListenerId, EventListener)>>,
    next_id: AtomicU64,
}

impl AdapterEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AdapterEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; unknown ids are ignored
    pub fn off(&self, id: ListenerId) {
        let removed = {
            let mut listeners = lock(&self.listeners);
            listeners
                .iter()
                .position(|(listener_id, _)| *listener_id == id)
                .map(|index| listeners.remove(index))
        };
        drop(removed);
    }

    /// Deliver `event` to every listener registered at this point
    pub fn emit(&self, event: AdapterEvent) {
        let listeners: Vec<EventListener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

impl std::fmt::Debug for AdapterEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
