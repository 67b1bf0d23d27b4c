//! Optional signing operations of the active wallet
//!
//! Each cell holds `Some` only while the active adapter offers the matching
//! capability. The handle remembers whether the store was connected when it
//! was derived and refuses to sign otherwise.

use std::fmt;
use std::sync::Arc;

use super::{ErrorReporter, Wallet};
use crate::adapter::{MessageSigner, TransactionSigner};
use crate::error::WalletError;
use crate::reactive::{Atom, Computed, Readable};
use crate::types::{Signature, Transaction};

/// Signs one transaction with the active wallet
#[derive(Clone)]
pub struct SignTransaction {
    signer: Arc<dyn TransactionSigner>,
    connected: bool,
    reporter: ErrorReporter,
}

impl SignTransaction {
    pub async fn call(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
        if !self.connected {
            return Err(self.reporter.report(WalletError::NotConnected));
        }
        self.signer.sign_transaction(transaction).await
    }
}

/// Signs a batch of transactions with the active wallet
#[derive(Clone)]
pub struct SignAllTransactions {
    signer: Arc<dyn TransactionSigner>,
    connected: bool,
    reporter: ErrorReporter,
}

impl SignAllTransactions {
    pub async fn call(&self, transactions: Vec<Transaction>) -> Result<Vec<Transaction>, WalletError> {
        if !self.connected {
            return Err(self.reporter.report(WalletError::NotConnected));
        }
        self.signer.sign_all_transactions(transactions).await
    }
}

/// Signs an arbitrary message with the active wallet
#[derive(Clone)]
pub struct SignMessage {
    signer: Arc<dyn MessageSigner>,
    connected: bool,
    reporter: ErrorReporter,
}

impl SignMessage {
    pub async fn call(&self, message: &[u8]) -> Result<Signature, WalletError> {
        if !self.connected {
            return Err(self.reporter.report(WalletError::NotConnected));
        }
        self.signer.sign_message(message).await
    }
}

macro_rules! capability_traits {
    ($($name:ident),*) => {
        $(
            impl PartialEq for $name {
                fn eq(&self, other: &Self) -> bool {
                    std::ptr::addr_eq(Arc::as_ptr(&self.signer), Arc::as_ptr(&other.signer))
                        && self.connected == other.connected
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($name))
                        .field("connected", &self.connected)
                        .finish()
                }
            }
        )*
    };
}

capability_traits!(SignTransaction, SignAllTransactions, SignMessage);

pub(super) fn sign_transaction(
    wallet: &Atom<Option<Wallet>>,
    connected: &Atom<bool>,
    reporter: &ErrorReporter,
) -> Computed<Option<SignTransaction>> {
    let (active, live, reporter) = (wallet.clone(), connected.clone(), reporter.clone());
    Computed::new(&[wallet, connected], move || {
        let signer = active.get()?.adapter.as_signer()?;
        Some(SignTransaction {
            signer,
            connected: live.get(),
            reporter: reporter.clone(),
        })
    })
}

pub(super) fn sign_all_transactions(
    wallet: &Atom<Option<Wallet>>,
    connected: &Atom<bool>,
    reporter: &ErrorReporter,
) -> Computed<Option<SignAllTransactions>> {
    let (active, live, reporter) = (wallet.clone(), connected.clone(), reporter.clone());
    Computed::new(&[wallet, connected], move || {
        let signer = active.get()?.adapter.as_signer()?;
        Some(SignAllTransactions {
            signer,
            connected: live.get(),
            reporter: reporter.clone(),
        })
    })
}

pub(super) fn sign_message(
    wallet: &Atom<Option<Wallet>>,
    connected: &Atom<bool>,
    reporter: &ErrorReporter,
) -> Computed<Option<SignMessage>> {
    let (active, live, reporter) = (wallet.clone(), connected.clone(), reporter.clone());
    Computed::new(&[wallet, connected], move || {
        let signer = active.get()?.adapter.as_message_signer()?;
        Some(SignMessage {
            signer,
            connected: live.get(),
            reporter: reporter.clone(),
        })
    })
}
