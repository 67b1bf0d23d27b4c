//! Wallet Adapters
//!
//! This module defines the interface the store consumes from wallet adapters.
//! An adapter represents one connectable signing agent (a browser extension,
//! a hardware device, an in-process keypair, ...). All adapters implement the
//! `WalletAdapter` trait, providing:
//! - Identity and availability (name, install URL, ready state)
//! - Connection lifecycle (connect, disconnect, public key)
//! - Transaction submission through a caller supplied [`Connection`]
//! - Optional signing capabilities, exposed through `as_signer` / `as_message_signer`
//! - Events (`connect`, `disconnect`, `readyStateChange`, `error`) via [`AdapterEvents`]

mod events;
#[cfg(feature = "keypair")]
pub mod keypair;
#[cfg(test)]
pub(crate) mod mock;

pub use events::{AdapterEvent, AdapterEvents, ListenerId};
#[cfg(feature = "keypair")]
pub use keypair::KeypairAdapter;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::WalletError;
use crate::types::{Connection, PublicKey, SendOptions, Signature, Transaction};

/// Availability of a wallet in the current environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// The wallet cannot run in this environment
    Unsupported,
    /// The wallet is supported but was not found
    NotDetected,
    /// The wallet is installed and can be connected to
    Installed,
    /// The wallet is not installed but can be loaded on demand
    Loadable,
}

impl ReadyState {
    /// Installed or loadable wallets can be connected
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadyState::Installed | ReadyState::Loadable)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyState::Unsupported => write!(f, "Unsupported"),
            ReadyState::NotDetected => write!(f, "NotDetected"),
            ReadyState::Installed => write!(f, "Installed"),
            ReadyState::Loadable => write!(f, "Loadable"),
        }
    }
}

/// Base trait for all wallet adapters
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Unique wallet name, used as the persisted selection
    fn name(&self) -> &str;

    /// Install or information page for the wallet
    fn url(&self) -> &str;

    /// Current availability
    fn ready_state(&self) -> ReadyState;

    /// Public key of the connected account
    fn public_key(&self) -> Option<PublicKey>;

    /// Whether the adapter holds a live connection
    fn connected(&self) -> bool {
        self.public_key().is_some()
    }

    /// Event emitter of this adapter
    fn events(&self) -> &AdapterEvents;

    // =========================================================================
    // Connection
    // =========================================================================

    async fn connect(&self) -> Result<(), WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Sign (if needed) and submit a transaction through `connection`
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn Connection,
        options: SendOptions,
    ) -> Result<Signature, WalletError>;

    // =========================================================================
    // Optional capabilities
    // =========================================================================

    /// Transaction signing capability, if the wallet has one
    fn as_signer(self: Arc<Self>) -> Option<Arc<dyn TransactionSigner>> {
        None
    }

    /// Message signing capability, if the wallet has one
    fn as_message_signer(self: Arc<Self>) -> Option<Arc<dyn MessageSigner>> {
        None
    }
}

/// Adapters that can sign transactions without submitting them
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError>;

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, WalletError> {
        let mut signed = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            signed.push(self.sign_transaction(transaction).await?);
        }
        Ok(signed)
    }
}

/// Adapters that can sign arbitrary messages
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;
}

// Adapters are compared by identity: two handles are equal when they point
// at the same adapter instance.
impl PartialEq for dyn WalletAdapter {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self as *const Self, other as *const Self)
    }
}

impl fmt::Debug for dyn WalletAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletAdapter")
            .field("name", &self.name())
            .field("ready_state", &self.ready_state())
            .field("connected", &self.connected())
            .finish()
    }
}

/// Identity comparison of adapter handles
pub fn same_adapter(a: &Arc<dyn WalletAdapter>, b: &Arc<dyn WalletAdapter>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::mock::MockAdapter;
    use super::*;

    #[test]
    fn test_ready_state_readiness() {
        assert!(ReadyState::Installed.is_ready());
        assert!(ReadyState::Loadable.is_ready());
        assert!(!ReadyState::NotDetected.is_ready());
        assert!(!ReadyState::Unsupported.is_ready());
    }

    #[test]
    fn test_adapter_identity() {
        let a: Arc<dyn WalletAdapter> = MockAdapter::new("A").build();
        let b: Arc<dyn WalletAdapter> = MockAdapter::new("A").build();

        assert!(same_adapter(&a, &a.clone()));
        assert!(!same_adapter(&a, &b));
        assert!(*a == *a.clone());
        assert!(*a != *b);
    }

    #[test]
    fn test_capabilities_are_optional() {
        let plain: Arc<dyn WalletAdapter> = MockAdapter::new("plain").build();
        let signer: Arc<dyn WalletAdapter> = MockAdapter::new("signer")
            .with_signer()
            .with_message_signer()
            .build();

        assert!(plain.clone().as_signer().is_none());
        assert!(plain.as_message_signer().is_none());
        assert!(signer.clone().as_signer().is_some());
        assert!(signer.as_message_signer().is_some());
    }

    #[tokio::test]
    async fn test_default_sign_all_signs_each() {
        let adapter = MockAdapter::new("signer").with_signer().build();
        let signer = adapter.clone().as_signer().unwrap();
        let signed = signer
            .sign_all_transactions(vec![Transaction::new(b"a".to_vec()), Transaction::new(b"b".to_vec())])
            .await
            .unwrap();

        assert_eq!(signed.len(), 2);
        assert!(signed.iter().all(|tx| tx.is_signed_by(&adapter.key())));
    }
}
