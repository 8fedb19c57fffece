//! Ethereum/EVM chain support for the wallet gate.
//!
//! This crate provides:
//! - A catalog of well-known EVM networks with explorer links
//! - EIP-55 checksummed account addresses with compact display forms

pub mod address;
pub mod chains;
pub mod error;

pub use address::AccountAddress;
pub use chains::{get_chain, ChainId, EvmChain};
pub use error::EthError;
