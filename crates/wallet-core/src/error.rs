use std::fmt;

use chain_eth::ChainId;
use thiserror::Error;

use crate::connector::ConnectorError;

/// Wallet intents that can be refused or fail inside the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletAction {
    Connect,
    Disconnect,
    SwitchChain,
}

impl fmt::Display for WalletAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletAction::Connect => write!(f, "Connection"),
            WalletAction::Disconnect => write!(f, "Disconnect"),
            WalletAction::SwitchChain => write!(f, "Network switch"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{0} request rejected by user")]
    UserRejected(WalletAction),

    #[error("No wallet available")]
    WalletUnavailable,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(ChainId),

    #[error("Wallet provider error: {0}")]
    Provider(String),
}

impl WalletError {
    /// Maps a connector failure for `action` onto the session error taxonomy.
    pub fn from_connector(action: WalletAction, err: ConnectorError) -> Self {
        match err {
            ConnectorError::UserRejected => WalletError::UserRejected(action),
            ConnectorError::Unavailable => WalletError::WalletUnavailable,
            ConnectorError::Provider(msg) => WalletError::Provider(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_user_rejected() {
        let err = WalletError::UserRejected(WalletAction::SwitchChain);
        assert_eq!(err.to_string(), "Network switch request rejected by user");
    }

    #[test]
    fn display_unsupported_chain() {
        assert_eq!(WalletError::UnsupportedChain(1).to_string(), "Unsupported chain: 1");
    }

    #[test]
    fn connector_errors_map_by_kind() {
        assert!(matches!(
            WalletError::from_connector(WalletAction::Connect, ConnectorError::UserRejected),
            WalletError::UserRejected(WalletAction::Connect)
        ));
        assert!(matches!(
            WalletError::from_connector(WalletAction::Connect, ConnectorError::Unavailable),
            WalletError::WalletUnavailable
        ));
        assert!(matches!(
            WalletError::from_connector(
                WalletAction::SwitchChain,
                ConnectorError::Provider("rpc down".into())
            ),
            WalletError::Provider(msg) if msg == "rpc down"
        ));
    }

    #[test]
    fn display_disconnect_action() {
        let err = WalletError::from_connector(
            WalletAction::Disconnect,
            ConnectorError::UserRejected,
        );
        assert_eq!(err.to_string(), "Disconnect request rejected by user");
    }
}
