use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Number of characters kept at the front of a shortened address ("0x" + 4).
const SHORT_PREFIX_LEN: usize = 6;

/// Number of characters kept at the end of a shortened address.
const SHORT_SUFFIX_LEN: usize = 4;

/// An EVM account address, always held in EIP-55 checksummed form.
///
/// Wallet connectors report addresses in whatever casing they like; parsing
/// through this type normalizes them so two reports of the same account
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Parses and checksums an address string.
    ///
    /// All-lowercase and all-uppercase inputs are accepted as-is. Mixed-case
    /// inputs must carry a valid EIP-55 checksum.
    pub fn parse(address: &str) -> Result<Self, EthError> {
        let hex_part = strip_hex_prefix(address)?;
        check_hex_body(hex_part)?;

        let checksummed = apply_checksum(hex_part);
        let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
        let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

        if !is_all_lower && !is_all_upper && checksummed[2..] != *hex_part {
            return Err(EthError::InvalidAddress("EIP-55 checksum mismatch".into()));
        }

        Ok(Self(checksummed))
    }

    /// The checksummed `0x`-prefixed address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for compact display, e.g. `0x5aAe...eAed`.
    pub fn short(&self) -> String {
        let len = self.0.len();
        format!(
            "{}...{}",
            &self.0[..SHORT_PREFIX_LEN],
            &self.0[len - SHORT_SUFFIX_LEN..]
        )
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountAddress {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = EthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountAddress> for String {
    fn from(address: AccountAddress) -> Self {
        address.0
    }
}

fn strip_hex_prefix(address: &str) -> Result<&str, EthError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}

fn check_hex_body(hex_part: &str) -> Result<(), EthError> {
    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    Ok(())
}

/// Expects a validated 40-character hex body.
fn apply_checksum(hex_part: &str) -> String {
    let lower = hex_part.to_ascii_lowercase();
    let hash = hex::encode(Keccak256::digest(lower.as_bytes()));

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");

    for (c, nibble) in lower.chars().zip(hash.chars()) {
        // Letters whose hash nibble is >= 8 are uppercased.
        if c.is_ascii_alphabetic() && nibble.to_digit(16).unwrap_or(0) >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}

#[cfg(test)]
mod tests {
    use super::*;

    const VITALIK_STYLE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let lower = format!("0x{}", expected[2..].to_lowercase());
            let result = AccountAddress::parse(&lower).unwrap();
            assert_eq!(result.as_str(), *expected, "checksum mismatch for {}", expected);
        }
    }

    #[test]
    fn parse_lowercase_normalizes_to_checksum() {
        let addr = AccountAddress::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(addr.as_str(), VITALIK_STYLE);
    }

    #[test]
    fn parse_uppercase_normalizes_to_checksum() {
        let addr = AccountAddress::parse("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(addr.as_str(), VITALIK_STYLE);
    }

    #[test]
    fn same_account_in_different_casing_is_equal() {
        let a = AccountAddress::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let b = AccountAddress::parse(VITALIK_STYLE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_bad_checksum_errors() {
        let addr = "0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(
            AccountAddress::parse(addr),
            Err(EthError::InvalidAddress(_))
        ));
    }

    #[test]
    fn parse_short_address_errors() {
        assert!(AccountAddress::parse("0x5aAeb6053F").is_err());
    }

    #[test]
    fn parse_no_prefix_errors() {
        assert!(AccountAddress::parse("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn parse_non_hex_chars_errors() {
        assert!(AccountAddress::parse("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn short_form_keeps_prefix_and_suffix() {
        let addr: AccountAddress = VITALIK_STYLE.parse().unwrap();
        assert_eq!(addr.short(), "0x5aAe...eAed");
    }

    #[test]
    fn display_is_checksummed() {
        let addr = AccountAddress::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(addr.to_string(), "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");
    }

    #[test]
    fn serde_roundtrip_through_string() {
        let addr: AccountAddress = VITALIK_STYLE.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{VITALIK_STYLE}\""));

        let lower = format!("\"{}\"", VITALIK_STYLE.to_lowercase());
        let back: AccountAddress = serde_json::from_str(&lower).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<AccountAddress, _> = serde_json::from_str("\"0xdeadbeef\"");
        assert!(result.is_err());
    }
}
