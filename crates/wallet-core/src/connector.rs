//! Capability set the session expects from a browser-wallet connector.

use async_trait::async_trait;
use chain_eth::ChainId;
use thiserror::Error;
use tokio::sync::broadcast;

/// Failures reported by the wallet itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectorError {
    #[error("user rejected the request")]
    UserRejected,

    #[error("no wallet provider available")]
    Unavailable,

    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Change signals pushed by the connector.
///
/// Events carry no payload: the session re-reads the live state whenever
/// one arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorEvent {
    AccountsChanged,
    ChainChanged,
    Disconnected,
}

/// Account and chain as the wallet reports them right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveState {
    pub account: Option<String>,
    pub chain_id: Option<ChainId>,
}

#[async_trait]
pub trait WalletConnector: Send + Sync + 'static {
    /// Opens the wallet's connection flow and waits for the user.
    async fn connect(&self) -> Result<(), ConnectorError>;

    async fn disconnect(&self) -> Result<(), ConnectorError>;

    /// Active account, if the wallet has exposed one.
    fn account(&self) -> Option<String>;

    fn chain_id(&self) -> Option<ChainId>;

    /// Prompts the user to move the wallet to `chain_id`.
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ConnectorError>;

    fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent>;

    /// Account and chain read together.
    ///
    /// Connectors that can change both concurrently should override this
    /// with a single consistent read.
    fn live_state(&self) -> LiveState {
        LiveState {
            account: self.account(),
            chain_id: self.chain_id(),
        }
    }
}
