//! Scriptable adapter for unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::{AdapterEvent, AdapterEvents, MessageSigner, ReadyState, TransactionSigner, WalletAdapter};
use crate::error::WalletError;
use crate::types::{Connection, PublicKey, SendOptions, Signature, Transaction};

pub(crate) struct MockAdapter {
    name: String,
    url: String,
    key: PublicKey,
    ready_state: Mutex<ReadyState>,
    connected: AtomicBool,
    events: AdapterEvents,
    signer: bool,
    message_signer: bool,
    fail_connect: AtomicBool,
    fail_disconnect: AtomicBool,
    emit_errors: AtomicBool,
    hold_connect: AtomicBool,
    release: Notify,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    send_calls: AtomicUsize,
}

pub(crate) struct MockAdapterBuilder {
    name: String,
    ready_state: ReadyState,
    signer: bool,
    message_signer: bool,
    fail_connect: bool,
    emit_errors: bool,
    hold_connect: bool,
}

impl MockAdapter {
    pub fn new(name: &str) -> MockAdapterBuilder {
        MockAdapterBuilder {
            name: name.to_string(),
            ready_state: ReadyState::Installed,
            signer: false,
            message_signer: false,
            fail_connect: false,
            emit_errors: true,
            hold_connect: false,
        }
    }

    pub fn key(&self) -> PublicKey {
        self.key
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    /// Let the pending (or next) held connect complete
    pub fn release(&self) {
        self.hold_connect.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    /// Change readiness and emit `readyStateChange`
    pub fn set_ready_state(&self, ready_state: ReadyState) {
        *self.ready_state.lock().unwrap() = ready_state;
        self.events.emit(AdapterEvent::ReadyStateChange(ready_state));
    }

    /// Connection approved outside the store (e.g. a trusted site)
    pub fn connect_externally(&self) {
        self.connected.store(true, Ordering::SeqCst);
        self.events.emit(AdapterEvent::Connect(self.key));
    }

    /// Connection dropped by the wallet itself
    pub fn disconnect_externally(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.events.emit(AdapterEvent::Disconnect);
    }

    pub fn emit_error(&self, error: WalletError) {
        self.events.emit(AdapterEvent::Error(error));
    }

    fn fail(&self, error: WalletError) -> Result<(), WalletError> {
        if self.emit_errors.load(Ordering::SeqCst) {
            self.events.emit(AdapterEvent::Error(error.clone()));
        }
        Err(error)
    }
}

impl MockAdapterBuilder {
    pub fn ready_state(mut self, ready_state: ReadyState) -> Self {
        self.ready_state = ready_state;
        self
    }

    pub fn with_signer(mut self) -> Self {
        self.signer = true;
        self
    }

    pub fn with_message_signer(mut self) -> Self {
        self.message_signer = true;
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Fail without emitting an `error` event
    pub fn silent_errors(mut self) -> Self {
        self.emit_errors = false;
        self
    }

    /// Keep `connect` pending until `release` is called
    pub fn held(mut self) -> Self {
        self.hold_connect = true;
        self
    }

    pub fn build(self) -> Arc<MockAdapter> {
        let seed = self.name.bytes().fold(7u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b));
        Arc::new(MockAdapter {
            url: format!("https://wallets.example/{}", self.name.to_lowercase()),
            name: self.name,
            key: PublicKey::new([seed; 32]),
            ready_state: Mutex::new(self.ready_state),
            connected: AtomicBool::new(false),
            events: AdapterEvents::new(),
            signer: self.signer,
            message_signer: self.message_signer,
            fail_connect: AtomicBool::new(self.fail_connect),
            fail_disconnect: AtomicBool::new(false),
            emit_errors: AtomicBool::new(self.emit_errors),
            hold_connect: AtomicBool::new(self.hold_connect),
            release: Notify::new(),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl WalletAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready_state.lock().unwrap()
    }

    fn public_key(&self) -> Option<PublicKey> {
        self.connected.load(Ordering::SeqCst).then_some(self.key)
    }

    fn events(&self) -> &AdapterEvents {
        &self.events
    }

    async fn connect(&self) -> Result<(), WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_connect.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail_connect.load(Ordering::SeqCst) {
            return self.fail(WalletError::Connection("User rejected the request".into()));
        }
        self.connect_externally();
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return self.fail(WalletError::Disconnection("Wallet unreachable".into()));
        }
        self.disconnect_externally();
        Ok(())
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        connection: &dyn Connection,
        options: SendOptions,
    ) -> Result<Signature, WalletError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        transaction.add_signature(self.key, Signature::new([1u8; 64]));
        connection.send_raw_transaction(&transaction, &options).await
    }

    fn as_signer(self: Arc<Self>) -> Option<Arc<dyn TransactionSigner>> {
        if self.signer {
            Some(self)
        } else {
            None
        }
    }

    fn as_message_signer(self: Arc<Self>) -> Option<Arc<dyn MessageSigner>> {
        if self.message_signer {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl TransactionSigner for MockAdapter {
    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        transaction.add_signature(self.key, Signature::new([2u8; 64]));
        Ok(transaction)
    }
}

#[async_trait]
impl MessageSigner for MockAdapter {
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        let mut bytes = [0u8; 64];
        for (slot, byte) in bytes.iter_mut().zip(message) {
            *slot = *byte;
        }
        Ok(Signature::new(bytes))
    }
}

/// Connection that records what it was asked to submit
#[derive(Default)]
pub(crate) struct RecordingConnection {
    pub sent: Mutex<Vec<(Transaction, SendOptions)>>,
}

#[async_trait]
impl Connection for RecordingConnection {
    fn endpoint(&self) -> &str {
        "http://localhost:8899"
    }

    async fn send_raw_transaction(
        &self,
        transaction: &Transaction,
        options: &SendOptions,
    ) -> Result<Signature, WalletError> {
        self.sent
            .lock()
            .unwrap()
            .push((transaction.clone(), options.clone()));
        transaction
            .signatures()
            .first()
            .map(|(_, signature)| *signature)
            .ok_or_else(|| WalletError::SendTransaction("Transaction is not signed".into()))
    }
}
