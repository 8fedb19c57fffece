use chain_eth::chains::{self, ChainId};
use serde::Serialize;

use crate::policy::NetworkPolicy;

/// Label for chains that are neither supported nor in the known-chain catalog.
pub const UNKNOWN_NETWORK_LABEL: &str = "Unknown Network";

/// Whether a chain satisfies the policy, and what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceResult {
    pub is_supported: bool,
    pub display_name: String,
}

impl ComplianceResult {
    /// Result for a connected wallet that has not reported a chain.
    pub fn unknown() -> Self {
        Self {
            is_supported: false,
            display_name: UNKNOWN_NETWORK_LABEL.to_string(),
        }
    }
}

/// Checks `chain_id` against `policy`.
///
/// Supported chains take their name from the policy table. Unsupported
/// chains keep their real name when the catalog knows them, so the user can
/// see which network the wallet is actually on.
pub fn compliance(chain_id: ChainId, policy: &NetworkPolicy) -> ComplianceResult {
    if let Some(network) = policy.network(chain_id) {
        return ComplianceResult {
            is_supported: true,
            display_name: network.name.clone(),
        };
    }

    ComplianceResult {
        is_supported: false,
        display_name: chains::get_chain(chain_id)
            .map(|c| c.name)
            .unwrap_or(UNKNOWN_NETWORK_LABEL)
            .to_string(),
    }
}
