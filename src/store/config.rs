//! Wallet store configuration

use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

use crate::adapter::WalletAdapter;
use crate::error::WalletError;
use crate::storage::{MemoryNameRepository, NameRepository};

/// Storage key used for the selected wallet name unless configured otherwise
pub const DEFAULT_LOCAL_STORAGE_KEY: &str = "walletName";

/// Callback receiving operational errors
pub type ErrorSink = Arc<dyn Fn(&WalletError) + Send + Sync>;

/// Callback opening a wallet's install page (a browser tab, a system handler, ...)
pub type UrlOpener = Arc<dyn Fn(&str) + Send + Sync>;

/// Error sink used when none is configured: log the error.
///
/// Store preconditions are caller mistakes and log at `warn`; adapter
/// failures log at `error`.
pub fn log_error_sink() -> ErrorSink {
    Arc::new(|err: &WalletError| {
        if err.is_precondition() {
            warn!("{}: {}", err.kind(), err);
        } else {
            error!("{}: {}", err.kind(), err);
        }
    })
}

/// Configuration for a [`WalletStore`](super::WalletStore)
pub struct WalletStoreConfig {
    /// Adapters offered to the user, in display order
    pub wallets: Vec<Arc<dyn WalletAdapter>>,
    /// Connect automatically when a ready wallet becomes active
    pub auto_connect: bool,
    /// Receives every reported error
    pub on_error: ErrorSink,
    /// Key of the persisted selected-wallet slot
    pub local_storage_key: String,
    /// Backing storage for the selected wallet name
    pub storage: Arc<dyn NameRepository>,
    /// Opens the install page of a wallet that is not ready
    pub url_opener: Option<UrlOpener>,
}

impl Default for WalletStoreConfig {
    fn default() -> Self {
        Self {
            wallets: Vec::new(),
            auto_connect: false,
            on_error: log_error_sink(),
            local_storage_key: DEFAULT_LOCAL_STORAGE_KEY.to_string(),
            storage: Arc::new(MemoryNameRepository::new()),
            url_opener: None,
        }
    }
}

impl WalletStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the adapter list
    pub fn with_wallets(mut self, wallets: Vec<Arc<dyn WalletAdapter>>) -> Self {
        self.wallets = wallets;
        self
    }

    /// Append one adapter
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletAdapter>) -> Self {
        self.wallets.push(wallet);
        self
    }

    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    /// Set the error sink
    pub fn with_on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&WalletError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(on_error);
        self
    }

    pub fn with_local_storage_key(mut self, key: &str) -> Self {
        self.local_storage_key = key.to_string();
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn NameRepository>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_url_opener<F>(mut self, opener: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.url_opener = Some(Arc::new(opener));
        self
    }
}

impl fmt::Debug for WalletStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletStoreConfig")
            .field(
                "wallets",
                &self.wallets.iter().map(|w| w.name().to_string()).collect::<Vec<_>>(),
            )
            .field("auto_connect", &self.auto_connect)
            .field("local_storage_key", &self.local_storage_key)
            .field("url_opener", &self.url_opener.is_some())
            .finish()
    }
}
