//! Auto-connect policy

use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use super::actions::{Operation, OperationGuard};
use super::StoreInner;
use crate::reactive::Readable;

impl StoreInner {
    /// Connect a newly active wallet in the background when the policy allows.
    ///
    /// A failed attempt clears the selection and is reported once: by the
    /// adapter's own `error` event if it emitted one, by this task otherwise.
    pub(super) fn auto_connect(self: &Arc<Self>) {
        let Some(wallet) = self.wallet.get() else { return };
        if !self.auto_connect.get() || !self.ready.get() || self.connected.get() {
            return;
        }
        let Some(mut operation) = OperationGuard::try_begin(self, Operation::Connect) else {
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            warn!("Auto-connect to {} skipped: no tokio runtime", wallet.name());
            return;
        };

        operation.activate();
        let adapter = wallet.adapter;
        let inner = self.clone();
        let errors_before = self.adapter_errors.load(Ordering::SeqCst);
        debug!("Auto-connecting to {}", adapter.name());

        runtime.spawn(async move {
            if let Err(error) = adapter.connect().await {
                warn!("Auto-connect to {} failed: {}", adapter.name(), error);
                inner.name.set(None);
                if inner.adapter_errors.load(Ordering::SeqCst) == errors_before {
                    inner.reporter.report(error);
                }
            }
            drop(operation);
        });
    }
}
