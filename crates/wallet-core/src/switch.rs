use std::sync::Arc;

use chain_eth::ChainId;
use tracing::{debug, info};

use crate::connector::WalletConnector;
use crate::error::WalletError;
use crate::gate::evaluate;
use crate::session::WalletSession;
use crate::types::GateState;

/// What a "fix network" request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The wallet was already on a supported chain; nothing was requested.
    AlreadyCompliant,
    /// The wallet is now on the requested chain.
    Switched { chain_id: ChainId },
    /// The request was approved, but a later wallet change won. The gate
    /// reflects that later state.
    Superseded { chain_id: Option<ChainId> },
}

/// Moves a non-compliant wallet to the policy's default chain.
///
/// One attempt per call; a rejection leaves the gate as it was and the user
/// can simply try again.
pub struct NetworkSwitchController<C> {
    session: Arc<WalletSession<C>>,
}

impl<C> Clone for NetworkSwitchController<C> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<C: WalletConnector> NetworkSwitchController<C> {
    pub fn new(session: Arc<WalletSession<C>>) -> Self {
        Self { session }
    }

    pub async fn fix_network(&self) -> Result<SwitchOutcome, WalletError> {
        let policy = self.session.policy();
        let status = evaluate(&self.session.snapshot(), policy);

        match status.state {
            GateState::Disconnected => {
                debug!("fix network requested without a wallet");
                Err(WalletError::NotConnected)
            }
            GateState::ConnectedCompliant => Ok(SwitchOutcome::AlreadyCompliant),
            GateState::ConnectedNonCompliant => {
                let target = policy.default_chain();
                info!(from = ?status.chain_id, target_chain = target, "fixing network");
                self.session.switch_chain(target).await?;

                let after = self.session.snapshot();
                if after.connection.is_connected() && after.chain_id == Some(target) {
                    Ok(SwitchOutcome::Switched { chain_id: target })
                } else {
                    Ok(SwitchOutcome::Superseded {
                        chain_id: after.chain_id,
                    })
                }
            }
        }
    }
}
