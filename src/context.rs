//! Shared store handle
//!
//! Applications normally build one [`WalletStore`] and pass it around. For
//! code that cannot thread it through, [`WalletContext`] is a guarded slot:
//! reading it before [`WalletContext::init`] fails with
//! [`WalletError::NotInitialized`], and initializing it again replaces the
//! store wholesale. [`init_wallet`] / [`use_wallet`] operate on a
//! process-wide context.

use std::sync::{PoisonError, RwLock};
use tracing::debug;

use crate::error::WalletError;
use crate::store::{WalletStore, WalletStoreConfig};

/// Slot holding at most one store
#[derive(Debug, Default)]
pub struct WalletContext {
    store: RwLock<Option<WalletStore>>,
}

impl WalletContext {
    pub const fn new() -> Self {
        Self {
            store: RwLock::new(None),
        }
    }

    /// Build a store from `config` and install it, replacing any previous one
    pub fn init(&self, config: WalletStoreConfig) -> WalletStore {
        let store = WalletStore::new(config);
        let previous = self
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(store.clone());
        if previous.is_some() {
            debug!("Replacing initialized wallet store");
        }
        store
    }

    /// Installed store
    pub fn get(&self) -> Result<WalletStore, WalletError> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(WalletError::NotInitialized)
    }

    /// Remove the installed store, returning it
    pub fn reset(&self) -> Option<WalletStore> {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_initialized(&self) -> bool {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

static WALLET: WalletContext = WalletContext::new();

/// Initialize the process-wide store
pub fn init_wallet(config: WalletStoreConfig) -> WalletStore {
    WALLET.init(config)
}

/// Process-wide store, `WalletError::NotInitialized` before [`init_wallet`]
pub fn use_wallet() -> Result<WalletStore, WalletError> {
    WALLET.get()
}
