//! Wallet Error Types
//!
//! Unified error handling for the wallet store and the adapters it drives.

/// Errors raised by the store or passed through from a wallet adapter.
///
/// The type is `Clone` so that a single error value can be handed to the
/// error sink and returned to the caller at the same time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// An operation needs an active wallet but none is selected
    #[error("Wallet not selected")]
    NotSelected,

    /// The active adapter is neither installed nor loadable
    #[error("Wallet not ready")]
    NotReady,

    /// An operation needs a live connection
    #[error("Wallet not connected")]
    NotConnected,

    /// The shared store was accessed before `init_wallet`
    #[error("Wallet not initialized: call init_wallet before use_wallet")]
    NotInitialized,

    // =========================================================================
    // Adapter-originated errors (passed through unchanged)
    // =========================================================================
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Disconnection error: {0}")]
    Disconnection(String),

    #[error("Wallet window closed")]
    WindowClosed,

    #[error("Public key error: {0}")]
    PublicKey(String),

    #[error("Sign transaction error: {0}")]
    SignTransaction(String),

    #[error("Sign message error: {0}")]
    SignMessage(String),

    #[error("Send transaction error: {0}")]
    SendTransaction(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Wallet error: {0}")]
    Other(String),
}

impl WalletError {
    /// Stable error name, matching the names used by wallet adapter UIs
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::NotSelected => "WalletNotSelectedError",
            WalletError::NotReady => "WalletNotReadyError",
            WalletError::NotConnected => "WalletNotConnectedError",
            WalletError::NotInitialized => "WalletNotInitializedError",
            WalletError::Connection(_) => "WalletConnectionError",
            WalletError::Disconnection(_) => "WalletDisconnectionError",
            WalletError::WindowClosed => "WalletWindowClosedError",
            WalletError::PublicKey(_) => "WalletPublicKeyError",
            WalletError::SignTransaction(_) => "WalletSignTransactionError",
            WalletError::SignMessage(_) => "WalletSignMessageError",
            WalletError::SendTransaction(_) => "WalletSendTransactionError",
            WalletError::Timeout(_) => "WalletTimeoutError",
            WalletError::Other(_) => "WalletError",
        }
    }

    /// Whether the error was raised by the store itself rather than an adapter
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            WalletError::NotSelected
                | WalletError::NotReady
                | WalletError::NotConnected
                | WalletError::NotInitialized
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(WalletError::NotSelected.kind(), "WalletNotSelectedError");
        assert_eq!(WalletError::NotReady.kind(), "WalletNotReadyError");
        assert_eq!(WalletError::NotConnected.kind(), "WalletNotConnectedError");
        assert_eq!(WalletError::NotInitialized.kind(), "WalletNotInitializedError");
        assert_eq!(
            WalletError::Connection("rejected".into()).kind(),
            "WalletConnectionError"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(WalletError::NotConnected.to_string(), "Wallet not connected");
        assert_eq!(
            WalletError::SignMessage("user declined".into()).to_string(),
            "Sign message error: user declined"
        );
    }

    #[test]
    fn test_precondition_split() {
        assert!(WalletError::NotReady.is_precondition());
        assert!(!WalletError::WindowClosed.is_precondition());
    }
}
