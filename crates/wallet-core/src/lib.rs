//! Wallet connection and network-compliance gate.
//!
//! A [`WalletSession`](session::WalletSession) mirrors a browser wallet
//! through the [`WalletConnector`](connector::WalletConnector) capability
//! set. The [`FeatureGate`](gate::FeatureGate) turns each published snapshot
//! into a single enablement answer for protocol actions, and the
//! [`NetworkSwitchController`](switch::NetworkSwitchController) moves a wallet
//! on an unsupported chain back to the policy's default network.

pub mod compliance;
pub mod connector;
pub mod error;
pub mod gate;
pub mod mock;
pub mod notification;
pub mod policy;
pub mod session;
pub mod switch;
pub mod types;

use std::sync::Arc;

pub use compliance::{compliance, ComplianceResult, UNKNOWN_NETWORK_LABEL};
pub use connector::{ConnectorError, ConnectorEvent, LiveState, WalletConnector};
pub use error::{WalletAction, WalletError};
pub use gate::{evaluate, Feature, FeatureGate, GateStatus, NetworkBanner};
pub use notification::{Notification, NotificationLevel};
pub use policy::{NetworkPolicy, PolicyError, SupportedNetwork};
pub use session::WalletSession;
pub use switch::{NetworkSwitchController, SwitchOutcome};
pub use types::{ConnectionState, GateState, SessionSnapshot};

/// A session wired to its gate and switch controller.
pub struct WalletGate<C> {
    pub session: Arc<WalletSession<C>>,
    pub gate: FeatureGate,
    pub switcher: NetworkSwitchController<C>,
}

impl<C: WalletConnector> WalletGate<C> {
    pub fn new(connector: Arc<C>, policy: NetworkPolicy) -> Self {
        let session = Arc::new(WalletSession::new(connector, Arc::new(policy)));
        Self {
            gate: FeatureGate::for_session(&session),
            switcher: NetworkSwitchController::new(session.clone()),
            session,
        }
    }

    /// Starts the session's connector event loop on the current runtime.
    pub fn spawn_event_loop(
        &self,
        shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let session = self.session.clone();
        tokio::spawn(async move { session.run(shutdown_rx).await })
    }
}
