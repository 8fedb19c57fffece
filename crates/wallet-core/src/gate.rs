//! Feature gate: the one place that decides whether protocol actions are
//! enabled.
//!
//! A [`FeatureGate`] watches the session's snapshot channel and evaluates
//! against whatever value is current when asked. Buttons, forms and banners
//! all read from it instead of repeating the connection and chain checks.

use std::sync::Arc;

use chain_eth::{get_chain, AccountAddress, ChainId};
use serde::Serialize;
use tokio::sync::watch;

use crate::compliance::{compliance, ComplianceResult};
use crate::connector::WalletConnector;
use crate::policy::NetworkPolicy;
use crate::session::WalletSession;
use crate::types::{GateState, SessionSnapshot};

/// Protocol actions that require a connected wallet on a supported chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Deploy,
    CreateCoin,
    MintNft,
    Trade,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Deploy,
        Feature::CreateCoin,
        Feature::MintNft,
        Feature::Trade,
    ];

    pub fn verb(self) -> &'static str {
        match self {
            Feature::Deploy => "Deploy",
            Feature::CreateCoin => "Create Coin",
            Feature::MintNft => "Mint",
            Feature::Trade => "Trade",
        }
    }
}

/// Network status banner shown while a wallet is connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkBanner {
    pub ready: bool,
    pub title: String,
    pub detail: String,
}

/// Gate output derived from one session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    pub state: GateState,
    pub address: Option<AccountAddress>,
    pub chain_id: Option<ChainId>,
    pub version: u64,
    compliance: Option<ComplianceResult>,
}

/// Derives the gate status for `snapshot` under `policy`.
pub fn evaluate(snapshot: &SessionSnapshot, policy: &NetworkPolicy) -> GateStatus {
    let Some(address) = snapshot.connection.address() else {
        return GateStatus {
            state: GateState::Disconnected,
            address: None,
            chain_id: None,
            version: snapshot.version,
            compliance: None,
        };
    };

    let result = match snapshot.chain_id {
        Some(chain_id) => compliance(chain_id, policy),
        None => ComplianceResult::unknown(),
    };
    let state = if result.is_supported {
        GateState::ConnectedCompliant
    } else {
        GateState::ConnectedNonCompliant
    };

    GateStatus {
        state,
        address: Some(address.clone()),
        chain_id: snapshot.chain_id,
        version: snapshot.version,
        compliance: Some(result),
    }
}

impl GateStatus {
    pub fn can_use_protocol_features(&self) -> bool {
        self.state == GateState::ConnectedCompliant
    }

    /// Every feature shares the same condition today.
    pub fn is_enabled(&self, _feature: Feature) -> bool {
        self.can_use_protocol_features()
    }

    /// Compliance of the active chain. `None` while disconnected, where
    /// there is no network to report.
    pub fn compliance(&self) -> Option<&ComplianceResult> {
        self.compliance.as_ref()
    }

    /// Block explorer page for the connected account on its current chain.
    /// `None` while disconnected or on a chain the catalog does not know.
    pub fn account_explorer_url(&self) -> Option<String> {
        let address = self.address.as_ref()?;
        let chain = get_chain(self.chain_id?)?;
        Some(chain.address_url(address.as_str()))
    }

    /// Button caption for `feature`.
    pub fn action_label(&self, feature: Feature, policy: &NetworkPolicy) -> String {
        match (&self.state, &self.compliance) {
            (GateState::ConnectedCompliant, Some(result)) => {
                format!("{} on {}", feature.verb(), result.display_name)
            }
            (GateState::ConnectedNonCompliant, _) | (GateState::ConnectedCompliant, None) => {
                format!("Switch to {} Network", policy.default_network().name)
            }
            (GateState::Disconnected, _) => format!("Connect Wallet to {}", feature.verb()),
        }
    }

    pub fn banner(&self, policy: &NetworkPolicy) -> Option<NetworkBanner> {
        let result = self.compliance.as_ref()?;
        let banner = if result.is_supported {
            NetworkBanner {
                ready: true,
                title: "Ready".to_string(),
                detail: format!("Connected to {}", result.display_name),
            }
        } else {
            NetworkBanner {
                ready: false,
                title: "Wrong Network".to_string(),
                detail: format!(
                    "Connected to {}. Switch to {}",
                    result.display_name,
                    policy.supported_names().join(" or ")
                ),
            }
        };
        Some(banner)
    }
}

/// Push-based view of the session used by every gated surface.
#[derive(Clone)]
pub struct FeatureGate {
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    policy: Arc<NetworkPolicy>,
}

impl FeatureGate {
    pub fn new(snapshot_rx: watch::Receiver<SessionSnapshot>, policy: Arc<NetworkPolicy>) -> Self {
        Self {
            snapshot_rx,
            policy,
        }
    }

    pub fn for_session<C: WalletConnector>(session: &WalletSession<C>) -> Self {
        Self::new(session.subscribe(), session.policy().clone())
    }

    pub fn policy(&self) -> &NetworkPolicy {
        &self.policy
    }

    /// Status for the snapshot that is current right now.
    pub fn status(&self) -> GateStatus {
        evaluate(&self.snapshot_rx.borrow(), &self.policy)
    }

    pub fn can_use_protocol_features(&self) -> bool {
        self.status().can_use_protocol_features()
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.status().is_enabled(feature)
    }

    pub fn action_label(&self, feature: Feature) -> String {
        self.status().action_label(feature, &self.policy)
    }

    pub fn banner(&self) -> Option<NetworkBanner> {
        self.status().banner(&self.policy)
    }

    pub fn account_explorer_url(&self) -> Option<String> {
        self.status().account_explorer_url()
    }

    /// Waits for the next published snapshot and returns the recomputed
    /// status. Returns `None` once the session is gone.
    pub async fn changed(&mut self) -> Option<GateStatus> {
        self.snapshot_rx.changed().await.ok()?;
        let status = evaluate(&self.snapshot_rx.borrow_and_update(), &self.policy);
        Some(status)
    }
}
