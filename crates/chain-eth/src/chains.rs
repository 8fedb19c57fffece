use serde::Serialize;

/// Chain identifier as reported by an EVM wallet (`eth_chainId`).
pub type ChainId = u64;

/// Definition of an EVM-compatible blockchain network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvmChain {
    pub chain_id: ChainId,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

impl EvmChain {
    /// Block explorer page for an account on this chain.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{address}", self.explorer_url)
    }
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://etherscan.io",
    is_testnet: false,
};

/// Optimism (chain ID 10).
pub const OPTIMISM: EvmChain = EvmChain {
    chain_id: 10,
    name: "Optimism",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://optimistic.etherscan.io",
    is_testnet: false,
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: EvmChain = EvmChain {
    chain_id: 137,
    name: "Polygon",
    symbol: "MATIC",
    decimals: 18,
    explorer_url: "https://polygonscan.com",
    is_testnet: false,
};

/// Zora Network (chain ID 7777777).
pub const ZORA: EvmChain = EvmChain {
    chain_id: 7777777,
    name: "Zora",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://explorer.zora.energy",
    is_testnet: false,
};

/// Base (chain ID 8453).
pub const BASE: EvmChain = EvmChain {
    chain_id: 8453,
    name: "Base",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://basescan.org",
    is_testnet: false,
};

/// Arbitrum One (chain ID 42161).
pub const ARBITRUM: EvmChain = EvmChain {
    chain_id: 42161,
    name: "Arbitrum One",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://arbiscan.io",
    is_testnet: false,
};

/// Base Sepolia Testnet (chain ID 84532).
pub const BASE_SEPOLIA: EvmChain = EvmChain {
    chain_id: 84532,
    name: "Base Sepolia",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://sepolia.basescan.org",
    is_testnet: true,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    decimals: 18,
    explorer_url: "https://sepolia.etherscan.io",
    is_testnet: true,
};

/// Every chain this crate can name. Membership here says nothing about
/// whether an application accepts the chain.
const KNOWN_CHAINS: &[&EvmChain] = &[
    &ETHEREUM,
    &OPTIMISM,
    &POLYGON,
    &ZORA,
    &BASE,
    &ARBITRUM,
    &BASE_SEPOLIA,
    &SEPOLIA,
];

/// Returns the chain definition for a given chain ID, or `None` if unknown.
pub fn get_chain(chain_id: ChainId) -> Option<&'static EvmChain> {
    KNOWN_CHAINS
        .iter()
        .find(|c| c.chain_id == chain_id)
        .copied()
}
