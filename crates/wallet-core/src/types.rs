use chain_eth::{AccountAddress, ChainId};
use serde::Serialize;

/// Whether a wallet account is attached to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected { address: AccountAddress },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn address(&self) -> Option<&AccountAddress> {
        match self {
            ConnectionState::Connected { address } => Some(address),
            ConnectionState::Disconnected => None,
        }
    }
}

/// Point-in-time view of the wallet session.
///
/// `chain_id` is `None` whenever the session is disconnected. `version`
/// increases by one for every published change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub connection: ConnectionState,
    pub chain_id: Option<ChainId>,
    pub version: u64,
}

impl SessionSnapshot {
    /// Compares connection and chain, ignoring the version counter.
    pub fn same_state(&self, connection: &ConnectionState, chain_id: Option<ChainId>) -> bool {
        self.connection == *connection && self.chain_id == chain_id
    }
}

/// The three observable states of the compliance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Disconnected,
    ConnectedCompliant,
    ConnectedNonCompliant,
}
