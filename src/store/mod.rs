//! Wallet Store
//!
//! Reactive container driving one active wallet adapter at a time.
//!
//! State cells (`wallets`, `selected_name`, `wallet`, `public_key`,
//! `ready_state`, `connected`, ...) are kept consistent by listeners wired at
//! construction:
//!
//! ```text
//! adapters ──► wallets ─┐
//!                       ├──► wallet ──► ready_state / public_key / connected
//! selected_name ────────┘       │
//!                               ├──► active adapter event listeners
//!                               └──► auto-connect
//! ```
//!
//! Operations (`select`, `connect`, `disconnect`, `send_transaction`) live in
//! `actions`, adapter event handling in `events`, the auto-connect policy in
//! `auto_connect` and the optional signing operations in `capabilities`.

mod actions;
mod auto_connect;
mod capabilities;
mod config;
mod events;

pub use capabilities::{SignAllTransactions, SignMessage, SignTransaction};
pub use config::{
    log_error_sink, ErrorSink, UrlOpener, WalletStoreConfig, DEFAULT_LOCAL_STORAGE_KEY,
};

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

use crate::adapter::{same_adapter, ReadyState, WalletAdapter};
use crate::error::WalletError;
use crate::reactive::{batch, lock, Atom, Computed, ReadOnly, Readable, Subscription};
use crate::storage::persisted_name;
use crate::types::PublicKey;

/// A registered adapter with its last observed readiness
#[derive(Debug, Clone)]
pub struct Wallet {
    pub adapter: Arc<dyn WalletAdapter>,
    pub ready_state: ReadyState,
}

impl Wallet {
    fn from_adapter(adapter: &Arc<dyn WalletAdapter>) -> Self {
        Self {
            adapter: adapter.clone(),
            ready_state: adapter.ready_state(),
        }
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }
}

// Same adapter instance, same readiness.
impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        same_adapter(&self.adapter, &other.adapter) && self.ready_state == other.ready_state
    }
}

/// Hands errors to the configured sink, except during teardown
#[derive(Clone)]
pub(crate) struct ErrorReporter {
    sink: ErrorSink,
    unloading: Atom<bool>,
}

impl ErrorReporter {
    /// Report `error` and give it back, so the same value can be returned
    pub(crate) fn report(&self, error: WalletError) -> WalletError {
        if !self.unloading.get() {
            (self.sink)(&error);
        }
        error
    }
}

pub(crate) struct StoreInner {
    adapters: Atom<Vec<Arc<dyn WalletAdapter>>>,
    wallets: Atom<Vec<Wallet>>,
    auto_connect: Atom<bool>,
    name: Atom<Option<String>>,
    wallet: Atom<Option<Wallet>>,
    public_key: Atom<Option<PublicKey>>,
    ready_state: Atom<ReadyState>,
    ready: Computed<bool>,
    connected: Atom<bool>,
    connecting: Atom<bool>,
    disconnecting: Atom<bool>,
    unloading: Atom<bool>,
    sign_transaction: Computed<Option<SignTransaction>>,
    sign_all_transactions: Computed<Option<SignAllTransactions>>,
    sign_message: Computed<Option<SignMessage>>,
    phase: AtomicU8,
    adapter_errors: AtomicU64,
    reporter: ErrorReporter,
    url_opener: Option<UrlOpener>,
    subscriptions: Mutex<Vec<Subscription>>,
    readiness_listeners: Mutex<Vec<Subscription>>,
    active_listener: Mutex<Option<(Arc<dyn WalletAdapter>, Subscription)>>,
}

impl StoreInner {
    fn wire(self: &Arc<Self>) {
        let subscriptions = vec![
            self.adapters
                .subscribe(self.handler(|inner, adapters: &Vec<Arc<dyn WalletAdapter>>| {
                    inner.register_adapters(adapters)
                })),
            self.name.subscribe(self.handler(|inner, _: &Option<String>| inner.resolve_wallet())),
            self.wallets.subscribe(self.handler(|inner, _: &Vec<Wallet>| inner.resolve_wallet())),
            self.wallet
                .subscribe(self.handler(|inner, _: &Option<Wallet>| inner.watch_active_adapter())),
            self.wallet
                .subscribe(self.handler(|inner, _: &Option<Wallet>| inner.auto_connect())),
        ];
        lock(&self.subscriptions).extend(subscriptions);
    }

    /// Cell listener holding the store weakly
    fn handler<T, F>(self: &Arc<Self>, f: F) -> impl Fn(&T) + Send + Sync + 'static
    where
        T: 'static,
        F: Fn(&Arc<StoreInner>, &T) + Send + Sync + 'static,
    {
        let store: Weak<StoreInner> = Arc::downgrade(self);
        move |value: &T| {
            if let Some(inner) = store.upgrade() {
                f(&inner, value)
            }
        }
    }

    fn register_adapters(self: &Arc<Self>, adapters: &[Arc<dyn WalletAdapter>]) {
        self.watch_readiness(adapters);
        self.wallets
            .set(adapters.iter().map(Wallet::from_adapter).collect());
    }

    fn resolve_wallet(&self) {
        let name = self.name.get();
        let wallet = name.and_then(|name| {
            self.wallets
                .get()
                .into_iter()
                .find(|wallet| wallet.name() == name)
        });
        self.set_wallet(wallet);
    }

    /// Make `wallet` active and refresh the cells derived from it
    fn set_wallet(&self, wallet: Option<Wallet>) {
        let ready_state = wallet
            .as_ref()
            .map_or(ReadyState::NotDetected, |wallet| wallet.ready_state);
        let public_key = wallet.as_ref().and_then(|wallet| wallet.adapter.public_key());
        let connected = wallet
            .as_ref()
            .is_some_and(|wallet| wallet.adapter.connected());

        batch(|| {
            self.wallet.set(wallet);
            self.ready_state.set(ready_state);
            self.public_key.set(public_key);
            self.connected.set(connected);
        });
    }
}

/// Reactive wallet store.
///
/// Cheap to clone; clones share the same state. Dropping the last clone
/// detaches every listener the store registered on its adapters.
#[derive(Clone)]
pub struct WalletStore {
    inner: Arc<StoreInner>,
}

impl WalletStore {
    pub fn new(config: WalletStoreConfig) -> Self {
        let WalletStoreConfig {
            wallets,
            auto_connect,
            on_error,
            local_storage_key,
            storage,
            url_opener,
        } = config;

        let (name, storage_subscriptions) = persisted_name(&storage, &local_storage_key);
        let wallet = Atom::new(None);
        let ready_state = Atom::new(ReadyState::Unsupported);
        let connected = Atom::new(false);
        let unloading = Atom::new(false);
        let reporter = ErrorReporter {
            sink: on_error,
            unloading: unloading.clone(),
        };

        let adapter_count = wallets.len();
        let inner = Arc::new(StoreInner {
            adapters: Atom::new(wallets),
            wallets: Atom::new(Vec::new()),
            auto_connect: Atom::new(auto_connect),
            ready: ready_state.map(ReadyState::is_ready),
            sign_transaction: capabilities::sign_transaction(&wallet, &connected, &reporter),
            sign_all_transactions: capabilities::sign_all_transactions(
                &wallet, &connected, &reporter,
            ),
            sign_message: capabilities::sign_message(&wallet, &connected, &reporter),
            name,
            wallet,
            public_key: Atom::new(None),
            ready_state,
            connected,
            connecting: Atom::new(false),
            disconnecting: Atom::new(false),
            unloading,
            phase: AtomicU8::new(actions::IDLE),
            adapter_errors: AtomicU64::new(0),
            reporter,
            url_opener,
            subscriptions: Mutex::new(storage_subscriptions),
            readiness_listeners: Mutex::new(Vec::new()),
            active_listener: Mutex::new(None),
        });
        inner.wire();

        debug!(
            "Wallet store created: {} adapters, key '{}', auto-connect {}",
            adapter_count, local_storage_key, auto_connect
        );
        Self { inner }
    }

    // =========================================================================
    // Cells
    // =========================================================================

    /// Registered wallets, in registry order
    pub fn wallets(&self) -> ReadOnly<Vec<Wallet>> {
        self.inner.wallets.read_only()
    }

    pub fn auto_connect(&self) -> ReadOnly<bool> {
        self.inner.auto_connect.read_only()
    }

    /// Persisted name of the selected wallet
    pub fn selected_name(&self) -> ReadOnly<Option<String>> {
        self.inner.name.read_only()
    }

    /// Active wallet: the registered wallet named by the selection
    pub fn wallet(&self) -> ReadOnly<Option<Wallet>> {
        self.inner.wallet.read_only()
    }

    pub fn public_key(&self) -> ReadOnly<Option<PublicKey>> {
        self.inner.public_key.read_only()
    }

    /// Readiness of the active wallet, `NotDetected` without one
    pub fn ready_state(&self) -> ReadOnly<ReadyState> {
        self.inner.ready_state.read_only()
    }

    pub fn ready(&self) -> Computed<bool> {
        self.inner.ready.clone()
    }

    pub fn connected(&self) -> ReadOnly<bool> {
        self.inner.connected.read_only()
    }

    pub fn connecting(&self) -> ReadOnly<bool> {
        self.inner.connecting.read_only()
    }

    pub fn disconnecting(&self) -> ReadOnly<bool> {
        self.inner.disconnecting.read_only()
    }

    /// Present when the active adapter can sign transactions
    pub fn sign_transaction(&self) -> Computed<Option<SignTransaction>> {
        self.inner.sign_transaction.clone()
    }

    pub fn sign_all_transactions(&self) -> Computed<Option<SignAllTransactions>> {
        self.inner.sign_all_transactions.clone()
    }

    /// Present when the active adapter can sign arbitrary messages
    pub fn sign_message(&self) -> Computed<Option<SignMessage>> {
        self.inner.sign_message.clone()
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Replace the adapter registry as a whole
    pub fn set_adapters(&self, adapters: Vec<Arc<dyn WalletAdapter>>) {
        debug!("Registering {} adapters", adapters.len());
        self.inner.adapters.set(adapters);
    }

    /// Toggle auto-connect for future active wallet changes
    pub fn set_auto_connect(&self, enabled: bool) {
        self.inner.auto_connect.set(enabled);
    }

    /// Flag a teardown in progress.
    ///
    /// While set, adapter `disconnect` and `error` events leave the selection
    /// alone and nothing is reported to the error sink.
    pub fn set_unloading(&self, unloading: bool) {
        self.inner.unloading.set(unloading);
    }
}

impl fmt::Debug for WalletStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletStore")
            .field("wallets", &self.inner.wallets.get().len())
            .field("selected", &self.inner.name.get())
            .field("ready_state", &self.inner.ready_state.get())
            .field("public_key", &self.inner.public_key.get())
            .field("connected", &self.inner.connected.get())
            .field("connecting", &self.inner.connecting.get())
            .field("disconnecting", &self.inner.disconnecting.get())
            .finish()
    }
}
