//! Keypair Wallet Adapter
//!
//! In-process adapter backed by an ed25519 keypair. It is always loadable,
//! needs no user approval and signs locally, which makes it useful for
//! development, scripted flows and tests. Keys live in memory only.

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::{AdapterEvent, AdapterEvents, MessageSigner, ReadyState, TransactionSigner, WalletAdapter};
use crate::error::WalletError;
use crate::types::{Connection, PublicKey, SendOptions, Signature, Transaction};

/// Information page shown when the wallet is not available
pub const KEYPAIR_ADAPTER_URL: &str =
    "https://github.com/anza-xyz/wallet-adapter/tree/master/packages/wallets/unsafe-burner";

/// Wallet adapter signing with a local keypair
pub struct KeypairAdapter {
    name: String,
    url: String,
    keypair: SigningKey,
    connected: AtomicBool,
    events: AdapterEvents,
}

impl KeypairAdapter {
    /// Create an adapter from a signing key
    pub fn new(name: &str, keypair: SigningKey) -> Self {
        Self {
            name: name.to_string(),
            url: KEYPAIR_ADAPTER_URL.to_string(),
            keypair,
            connected: AtomicBool::new(false),
            events: AdapterEvents::new(),
        }
    }

    /// Create an adapter with a fresh random keypair
    pub fn generate(name: &str) -> Self {
        Self::new(name, SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Create an adapter from a keypair (64 bytes: 32 secret + 32 public)
    pub fn from_keypair_bytes(name: &str, bytes: &[u8]) -> Result<Self, WalletError> {
        let bytes: &[u8; 64] = bytes.try_into().map_err(|_| {
            WalletError::Other(format!("Expected 64 keypair bytes, got {}", bytes.len()))
        })?;
        let keypair = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| WalletError::Other(format!("Invalid keypair: {}", e)))?;
        Ok(Self::new(name, keypair))
    }

    /// Create an adapter from a base58 encoded keypair
    pub fn from_base58(name: &str, keypair: &str) -> Result<Self, WalletError> {
        let bytes = bs58::decode(keypair)
            .into_vec()
            .map_err(|e| WalletError::Other(format!("Invalid base58: {}", e)))?;
        Self::from_keypair_bytes(name, &bytes)
    }

    /// Set the information URL
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Public key of the keypair, whether or not the adapter is connected
    pub fn keypair_public_key(&self) -> PublicKey {
        PublicKey::new(self.keypair.verifying_key().to_bytes())
    }

    fn sign_bytes(&self, message: &[u8]) -> Signature {
        Signature::new(self.keypair.sign(message).to_bytes())
    }

    fn ensure_connected(&self, error: WalletError) -> Result<(), WalletError> {
        if self.connected.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.events.emit(AdapterEvent::Error(error.clone()));
        Err(error)
    }
}

impl std::fmt::Debug for KeypairAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairAdapter")
            .field("name", &self.name)
            .field("pubkey", &self.keypair_public_key().to_string())
            .field("connected", &self.connected.load(Ordering::SeqCst))
            .finish()
    }
}

#[async_trait]
impl WalletAdapter for KeypairAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::Loadable
    }

    fn public_key(&self) -> Option<PublicKey> {
        self.connected
            .load(Ordering::SeqCst)
            .then(|| self.keypair_public_key())
    }

    fn events(&self) -> &AdapterEvents {
        &self.events
    }

    async fn connect(&self) -> Result<(), WalletError> {
        if self.connected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let public_key = self.keypair_public_key();
        debug!("Keypair adapter {} connected as {}", self.name, public_key);
        self.events.emit(AdapterEvent::Connect(public_key));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!("Keypair adapter {} disconnected", self.name);
            self.events.emit(AdapterEvent::Disconnect);
        }
        Ok(())
    }

    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: SendOptions,
    ) -> Result<Signature, WalletError> {
        let signed = self.sign_transaction(transaction).await?;
        match connection.send_raw_transaction(&signed, &options).await {
            Ok(signature) => Ok(signature),
            Err(error) => {
                let error = match error {
                    WalletError::SendTransaction(_) => error,
                    other => WalletError::SendTransaction(other.to_string()),
                };
                self.events.emit(AdapterEvent::Error(error.clone()));
                Err(error)
            }
        }
    }

    fn as_signer(self: Arc<Self>) -> Option<Arc<dyn TransactionSigner>> {
        Some(self)
    }

    fn as_message_signer(self: Arc<Self>) -> Option<Arc<dyn MessageSigner>> {
        Some(self)
    }
}

#[async_trait]
impl TransactionSigner for KeypairAdapter {
    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        self.ensure_connected(WalletError::SignTransaction("Wallet not connected".into()))?;
        let signature = self.sign_bytes(transaction.message());
        transaction.add_signature(self.keypair_public_key(), signature);
        Ok(transaction)
    }
}

#[async_trait]
impl MessageSigner for KeypairAdapter {
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        self.ensure_connected(WalletError::SignMessage("Wallet not connected".into()))?;
        Ok(self.sign_bytes(message))
    }
}
