//! Selection and connection state machine

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{StoreInner, WalletStore};
use crate::adapter::WalletAdapter;
use crate::error::WalletError;
use crate::reactive::{Atom, Readable};
use crate::types::{Connection, SendOptions, Signature, Transaction};

pub(super) const IDLE: u8 = 0;

/// Operation holding the store's phase word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Operation {
    Connect,
    Disconnect,
}

impl Operation {
    fn phase(self) -> u8 {
        match self {
            Operation::Connect => 1,
            Operation::Disconnect => 2,
        }
    }
}

/// Exclusive hold on the phase word.
///
/// Only one operation holds it at a time, so `connecting` and
/// `disconnecting` are never both raised. Dropping the guard returns the
/// store to idle and lowers the flag, including when the future running the
/// operation is dropped early.
pub(super) struct OperationGuard {
    inner: Arc<StoreInner>,
    operation: Operation,
    active: bool,
}

impl OperationGuard {
    /// Take the phase word, `None` when another operation holds it
    pub(super) fn try_begin(inner: &Arc<StoreInner>, operation: Operation) -> Option<Self> {
        inner
            .phase
            .compare_exchange(IDLE, operation.phase(), Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(Self {
            inner: inner.clone(),
            operation,
            active: false,
        })
    }

    /// Raise the observable flag for this operation
    pub(super) fn activate(&mut self) {
        self.active = true;
        self.flag().set(true);
    }

    fn flag(&self) -> &Atom<bool> {
        match self.operation {
            Operation::Connect => &self.inner.connecting,
            Operation::Disconnect => &self.inner.disconnecting,
        }
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.inner.phase.store(IDLE, Ordering::SeqCst);
        if self.active {
            self.flag().set(false);
        }
    }
}

impl StoreInner {
    pub(super) fn open_url(&self, adapter: &Arc<dyn WalletAdapter>) {
        match &self.url_opener {
            Some(open) => open(adapter.url()),
            None => info!("{} is not available here, see {}", adapter.name(), adapter.url()),
        }
    }
}

impl WalletStore {
    /// Select the wallet named `name`; no-op if it is already selected
    pub fn select(&self, name: &str) {
        if self.inner.name.get().as_deref() == Some(name) {
            return;
        }
        debug!("Selecting wallet {}", name);
        self.inner.name.set(Some(name.to_string()));
    }

    /// Connect the active wallet.
    ///
    /// Returns immediately when already connected or while another connect or
    /// disconnect is in flight. Precondition failures are reported to the
    /// error sink and returned.
    pub async fn connect(&self) -> Result<(), WalletError> {
        let inner = &self.inner;
        if inner.connected.get() {
            return Ok(());
        }
        let Some(mut operation) = OperationGuard::try_begin(inner, Operation::Connect) else {
            debug!("Connect ignored: another operation is in flight");
            return Ok(());
        };

        let Some(wallet) = inner.wallet.get() else {
            drop(operation);
            return Err(inner.reporter.report(WalletError::NotSelected));
        };
        let adapter = wallet.adapter;

        if !inner.ready.get() {
            drop(operation);
            inner.name.set(None);
            inner.open_url(&adapter);
            return Err(inner.reporter.report(WalletError::NotReady));
        }

        operation.activate();
        info!("Connecting to {}", adapter.name());
        let result = adapter.connect().await;
        if let Err(e) = &result {
            warn!("Connecting to {} failed: {}", adapter.name(), e);
            inner.name.set(None);
        }
        drop(operation);
        result
    }

    /// Disconnect the active wallet and clear the selection.
    ///
    /// Without an active wallet only the selection is cleared.
    ///
    /// Returns `Ok(())` without effect while another connect or disconnect is
    /// in flight, auto-connect included. A hanging connect cannot be cancelled
    /// this way; it has to resolve (or its future be dropped) first.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        let inner = &self.inner;
        let Some(mut operation) = OperationGuard::try_begin(inner, Operation::Disconnect) else {
            debug!("Disconnect ignored: another operation is in flight");
            return Ok(());
        };

        let Some(wallet) = inner.wallet.get() else {
            drop(operation);
            inner.name.set(None);
            return Ok(());
        };
        let adapter = wallet.adapter;

        operation.activate();
        info!("Disconnecting from {}", adapter.name());
        let result = adapter.disconnect().await;
        if let Err(e) = &result {
            warn!("Disconnecting from {} failed: {}", adapter.name(), e);
        }
        inner.name.set(None);
        drop(operation);
        result
    }

    /// Sign and submit `transaction` through the active wallet
    pub async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: SendOptions,
    ) -> Result<Signature, WalletError> {
        let inner = &self.inner;
        let Some(wallet) = inner.wallet.get() else {
            return Err(inner.reporter.report(WalletError::NotSelected));
        };
        if !inner.connected.get() {
            return Err(inner.reporter.report(WalletError::NotConnected));
        }
        debug!(
            "Sending transaction through {} to {}",
            wallet.name(),
            connection.endpoint()
        );
        wallet
            .adapter
            .send_transaction(transaction, connection, options)
            .await
    }
}
