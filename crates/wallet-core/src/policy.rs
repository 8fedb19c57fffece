//! Network policy: which chains the application accepts for protocol
//! actions, what each is called, and where switch requests point.

use std::path::{Path, PathBuf};

use chain_eth::chains::{self, ChainId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy must list at least one supported network")]
    Empty,

    #[error("chain {0} is listed more than once")]
    DuplicateChain(ChainId),

    #[error("default chain {0} is not in the supported set")]
    DefaultNotSupported(ChainId),

    #[error("no display name for chain {chain_id}")]
    MissingName {
        chain_id: ChainId,
        #[source]
        source: chain_eth::EthError,
    },

    #[error("failed to read policy file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A chain accepted by the policy together with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportedNetwork {
    pub chain_id: ChainId,
    pub name: String,
}

impl SupportedNetwork {
    pub fn new(chain_id: ChainId, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
        }
    }
}

/// Static set of supported chains plus the preferred switch target.
///
/// Always valid once constructed: non-empty, no duplicate chain ids, and
/// the default chain is one of the supported networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPolicy {
    networks: Vec<SupportedNetwork>,
    default_index: usize,
}

impl NetworkPolicy {
    pub fn new(
        networks: Vec<SupportedNetwork>,
        default_chain: ChainId,
    ) -> Result<Self, PolicyError> {
        if networks.is_empty() {
            return Err(PolicyError::Empty);
        }

        for (i, network) in networks.iter().enumerate() {
            if networks[..i].iter().any(|n| n.chain_id == network.chain_id) {
                return Err(PolicyError::DuplicateChain(network.chain_id));
            }
        }

        let default_index = networks
            .iter()
            .position(|n| n.chain_id == default_chain)
            .ok_or(PolicyError::DefaultNotSupported(default_chain))?;

        Ok(Self {
            networks,
            default_index,
        })
    }

    /// Base mainnet and Base Sepolia, switching to Base by default.
    pub fn base() -> Self {
        Self {
            networks: vec![
                SupportedNetwork::new(chains::BASE.chain_id, chains::BASE.name),
                SupportedNetwork::new(chains::BASE_SEPOLIA.chain_id, chains::BASE_SEPOLIA.name),
            ],
            default_index: 0,
        }
    }

    /// Parses a TOML policy document.
    ///
    /// Entries without a `name` borrow the name from the known-chain catalog.
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = toml::from_str(s)?;
        file.into_policy()
    }

    /// Reads and parses a TOML policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn networks(&self) -> &[SupportedNetwork] {
        &self.networks
    }

    pub fn default_network(&self) -> &SupportedNetwork {
        &self.networks[self.default_index]
    }

    pub fn default_chain(&self) -> ChainId {
        self.default_network().chain_id
    }

    pub fn is_supported(&self, chain_id: ChainId) -> bool {
        self.network(chain_id).is_some()
    }

    pub fn network(&self, chain_id: ChainId) -> Option<&SupportedNetwork> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    /// Names of every supported network, in policy order.
    pub fn supported_names(&self) -> Vec<&str> {
        self.networks.iter().map(|n| n.name.as_str()).collect()
    }
}

impl Default for NetworkPolicy {
    fn default() -> Self {
        Self::base()
    }
}

#[derive(Debug, Deserialize)]
struct PolicyFile {
    default_chain: ChainId,
    networks: Vec<NetworkEntry>,
}

#[derive(Debug, Deserialize)]
struct NetworkEntry {
    chain_id: ChainId,
    name: Option<String>,
}

impl PolicyFile {
    fn into_policy(self) -> Result<NetworkPolicy, PolicyError> {
        let networks = self
            .networks
            .into_iter()
            .map(|entry| -> Result<SupportedNetwork, PolicyError> {
                let name = match entry.name {
                    Some(name) => name,
                    None => chains::get_chain(entry.chain_id)
                        .map(|c| c.name.to_string())
                        .ok_or(PolicyError::MissingName {
                            chain_id: entry.chain_id,
                            source: chain_eth::EthError::UnknownChain(entry.chain_id),
                        })?,
                };
                Ok(SupportedNetwork::new(entry.chain_id, name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        NetworkPolicy::new(networks, self.default_chain)
    }
}
