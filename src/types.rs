//! Common types for wallet adapters
//!
//! Value types exchanged between the store, adapters and the RPC layer.
//! Keys and signatures use the Solana encodings (32/64 raw bytes, base58 text).

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// Account public key (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| WalletError::PublicKey(format!("Invalid base58: {}", e)))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            WalletError::PublicKey(format!("Expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ed25519 signature (64 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// A transaction as seen by the wallet layer: the serialized message that
/// signers sign, plus the signatures collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    message: Vec<u8>,
    signatures: Vec<(PublicKey, Signature)>,
}

impl Transaction {
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            message: message.into(),
            signatures: Vec::new(),
        }
    }

    /// Serialized message bytes
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn signatures(&self) -> &[(PublicKey, Signature)] {
        &self.signatures
    }

    /// Add or replace the signature for `signer`
    pub fn add_signature(&mut self, signer: PublicKey, signature: Signature) {
        match self.signatures.iter_mut().find(|(key, _)| *key == signer) {
            Some(entry) => entry.1 = signature,
            None => self.signatures.push((signer, signature)),
        }
    }

    pub fn signature_of(&self, signer: &PublicKey) -> Option<&Signature> {
        self.signatures
            .iter()
            .find(|(key, _)| key == signer)
            .map(|(_, signature)| signature)
    }

    pub fn is_signed_by(&self, signer: &PublicKey) -> bool {
        self.signature_of(signer).is_some()
    }
}

/// Commitment level for RPC requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commitment::Processed => write!(f, "processed"),
            Commitment::Confirmed => write!(f, "confirmed"),
            Commitment::Finalized => write!(f, "finalized"),
        }
    }
}

/// Options forwarded to the RPC node when submitting a transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    /// Skip the preflight simulation
    pub skip_preflight: bool,
    /// Commitment used for the preflight simulation
    pub preflight_commitment: Option<Commitment>,
    /// Maximum number of times the node retries sending
    pub max_retries: Option<u32>,
    /// Minimum slot the request can be evaluated at
    pub min_context_slot: Option<u64>,
}

/// RPC transport used to submit signed transactions.
///
/// The store never talks to the network itself; adapters receive the
/// connection in `send_transaction` and decide how to use it.
#[async_trait]
pub trait Connection: Send + Sync {
    /// RPC endpoint URL
    fn endpoint(&self) -> &str;

    /// Submit a fully signed transaction, returning its first signature
    async fn send_raw_transaction(
        &self,
        transaction: &Transaction,
        options: &SendOptions,
    ) -> Result<Signature, WalletError>;
}
