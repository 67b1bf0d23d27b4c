//! Adapter event wiring
//!
//! Every registered adapter is watched for readiness changes. The active
//! adapter is also watched for `connect`, `disconnect` and `error` while it
//! stays active.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::debug;

use super::StoreInner;
use crate::adapter::{same_adapter, AdapterEvent, ReadyState, WalletAdapter};
use crate::error::WalletError;
use crate::reactive::{lock, Readable, Subscription};

/// Register `listener` on the adapter's emitter until the subscription drops
fn listen_to<F>(adapter: &Arc<dyn WalletAdapter>, listener: F) -> Subscription
where
    F: Fn(&AdapterEvent) + Send + Sync + 'static,
{
    let id = adapter.events().on(listener);
    let adapter = adapter.clone();
    Subscription::new(move || adapter.events().off(id))
}

impl StoreInner {
    pub(super) fn watch_readiness(self: &Arc<Self>, adapters: &[Arc<dyn WalletAdapter>]) {
        let listeners = adapters
            .iter()
            .map(|adapter| {
                let store = Arc::downgrade(self);
                let source = Arc::downgrade(adapter);
                listen_to(adapter, move |event| {
                    let AdapterEvent::ReadyStateChange(ready_state) = event else {
                        return;
                    };
                    if let (Some(inner), Some(adapter)) = (store.upgrade(), source.upgrade()) {
                        inner.handle_ready_state_change(&adapter, *ready_state);
                    }
                })
            })
            .collect();

        let previous = std::mem::replace(&mut *lock(&self.readiness_listeners), listeners);
        drop(previous);
    }

    /// Follow the active adapter's events, dropping the previous adapter's
    pub(super) fn watch_active_adapter(self: &Arc<Self>) {
        let wallet = self.wallet.get();
        let mut active = lock(&self.active_listener);
        if let (Some(wallet), Some((current, _))) = (&wallet, active.as_ref()) {
            if same_adapter(current, &wallet.adapter) {
                return;
            }
        }

        let next = wallet.map(|wallet| {
            let store = Arc::downgrade(self);
            let subscription = listen_to(&wallet.adapter, move |event| {
                let Some(inner) = store.upgrade() else { return };
                match event {
                    AdapterEvent::Connect(_) => inner.handle_connect(),
                    AdapterEvent::Disconnect => inner.handle_disconnect(),
                    AdapterEvent::Error(error) => {
                        inner.handle_adapter_error(error.clone());
                    }
                    AdapterEvent::ReadyStateChange(_) => {}
                }
            });
            (wallet.adapter, subscription)
        });

        let previous = std::mem::replace(&mut *active, next);
        drop(active);
        drop(previous);
    }

    fn handle_ready_state_change(&self, adapter: &Arc<dyn WalletAdapter>, ready_state: ReadyState) {
        let mut wallets = self.wallets.get();
        let Some(entry) = wallets
            .iter_mut()
            .find(|wallet| same_adapter(&wallet.adapter, adapter))
        else {
            return;
        };
        debug!("{} ready state is now {}", adapter.name(), ready_state);
        entry.ready_state = ready_state;
        self.wallets.set(wallets);
    }

    fn handle_connect(&self) {
        self.set_wallet(self.wallet.get());
    }

    fn handle_disconnect(&self) {
        if self.unloading.get() {
            return;
        }
        debug!("Active wallet disconnected, clearing selection");
        self.name.set(None);
    }

    fn handle_adapter_error(&self, error: WalletError) -> WalletError {
        self.adapter_errors.fetch_add(1, Ordering::SeqCst);
        self.reporter.report(error)
    }
}
