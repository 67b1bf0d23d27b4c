//! wallet-store - Reactive wallet adapter store
//!
//! Keeps track of which wallet the user selected, drives its connection
//! lifecycle and exposes its signing capabilities as observable cells.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wallet_store::prelude::*;
//!
//! # async fn run(adapter: Arc<dyn WalletAdapter>) -> Result<(), WalletError> {
//! let store = WalletStore::new(
//!     WalletStoreConfig::new()
//!         .with_wallet(adapter)
//!         .with_auto_connect(true),
//! );
//! store.select("Phantom");
//! store.connect().await?;
//! println!("connected as {:?}", store.public_key().get());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod context;
pub mod error;
pub mod reactive;
pub mod storage;
pub mod store;
pub mod types;

pub use adapter::{ReadyState, WalletAdapter};
pub use context::{init_wallet, use_wallet, WalletContext};
pub use error::WalletError;
pub use store::{Wallet, WalletStore, WalletStoreConfig};

/// Common imports
pub mod prelude {
    pub use crate::adapter::{
        AdapterEvent, MessageSigner, ReadyState, TransactionSigner, WalletAdapter,
    };
    pub use crate::error::WalletError;
    pub use crate::reactive::Readable;
    pub use crate::store::{Wallet, WalletStore, WalletStoreConfig};
    pub use crate::types::{Connection, PublicKey, SendOptions, Signature, Transaction};
}
