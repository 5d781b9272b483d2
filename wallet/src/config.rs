//! # Scheme Configuration & Constants
//!
//! Every magic number in the wallet scheme lives here. If you're hardcoding
//! a version byte or a checksum width somewhere else, you're doing it wrong.
//!
//! These values define what an address *is*. Two wallets that disagree on
//! any of them will happily produce addresses the other one rejects, so
//! changing them after addresses are in circulation is not an option.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Address Scheme
// ---------------------------------------------------------------------------

/// Version byte prepended to every address payload. Base58 of a payload
/// starting with `0x90` lands on a leading `g`, which makes our addresses
/// easy to tell apart from Bitcoin's `1...` and `3...`.
pub const ADDRESS_VERSION: u8 = 0x90;

/// Checksum width in bytes.
///
/// One byte catches roughly 255 out of 256 random corruptions. Bitcoin uses
/// four and catches all but one in four billion. The one-byte width is what
/// deployed addresses use, so it stays the default; schemes that can afford
/// longer addresses should configure a wider checksum via [`AddressConfig`].
pub const DEFAULT_CHECKSUM_LEN: usize = 1;

/// Upper bound for the checksum width: the checksum is a prefix of a
/// hash160, so it can't be longer than one.
pub const MAX_CHECKSUM_LEN: usize = HASH160_LEN;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1, the same curve as Bitcoin and Ethereum.
pub const SIGNING_CURVE: &str = "secp256k1";

/// RIPEMD-160 digest length. The address body is always exactly this long.
pub const HASH160_LEN: usize = 20;

/// SHA-256 digest length, which is also the size of the prehash we sign.
pub const SHA256_LEN: usize = 32;

/// Private key (scalar) length in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// SEC1 compressed public key: one parity byte plus the 32-byte x-coordinate.
pub const COMPRESSED_PUBLIC_KEY_LEN: usize = 33;

/// SEC1 uncompressed public key: `0x04 || x || y`.
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;

/// Compact recoverable signature: `recovery_id || r || s`.
pub const COMPACT_SIGNATURE_LEN: usize = 65;

/// Highest valid recovery id. Ids 2 and 3 only happen when `r` overflowed
/// the curve order, which is astronomically rare but still legal.
pub const MAX_RECOVERY_ID: u8 = 3;

// ---------------------------------------------------------------------------
// Card Numbers
// ---------------------------------------------------------------------------

/// Smallest 16-digit number. Every card number is at least this.
pub const CARD_NUMBER_BASE: u64 = 1_000_000_000_000_000;

/// Size of the 16-digit range: `9_999_999_999_999_999 - CARD_NUMBER_BASE + 1`.
pub const CARD_NUMBER_SPAN: u64 = 9_000_000_000_000_000;

/// Largest 16-digit number.
pub const CARD_NUMBER_MAX: u64 = CARD_NUMBER_BASE + CARD_NUMBER_SPAN - 1;

/// Number of leading SHA-256 hex characters read as the card number seed.
pub const CARD_NUMBER_HEX_DIGITS: usize = 16;

// ---------------------------------------------------------------------------
// AddressConfig
// ---------------------------------------------------------------------------

/// Errors from building an [`AddressConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("checksum length must be between 1 and {max} bytes, got {got}")]
    ChecksumLength { max: usize, got: usize },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// The parameters that make an address scheme.
///
/// Built once and handed to every component that needs it. It is `Copy` and
/// has no interior mutability, so sharing one across threads is free.
///
/// The fields are private: every way of obtaining a config (`new`,
/// `from_json`, serde, `Default`) enforces `1 <= checksum_len <= 20`, so a
/// codec can never be built with the checksum switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PartialConfig")]
pub struct AddressConfig {
    /// First byte of every payload.
    version: u8,
    /// Number of checksum bytes appended to the payload.
    checksum_len: usize,
}

/// Wire form of [`AddressConfig`]. Missing fields take the scheme defaults.
#[derive(Deserialize)]
struct PartialConfig {
    version: Option<u8>,
    checksum_len: Option<usize>,
}

impl TryFrom<PartialConfig> for AddressConfig {
    type Error = ConfigError;

    fn try_from(partial: PartialConfig) -> Result<Self, Self::Error> {
        Self::new(
            partial.version.unwrap_or(ADDRESS_VERSION),
            partial.checksum_len.unwrap_or(DEFAULT_CHECKSUM_LEN),
        )
    }
}

impl AddressConfig {
    /// Build a config, rejecting checksum widths outside `1..=20`.
    pub fn new(version: u8, checksum_len: usize) -> Result<Self, ConfigError> {
        if checksum_len == 0 || checksum_len > MAX_CHECKSUM_LEN {
            return Err(ConfigError::ChecksumLength {
                max: MAX_CHECKSUM_LEN,
                got: checksum_len,
            });
        }
        Ok(Self {
            version,
            checksum_len,
        })
    }

    /// Parse a config from JSON, e.g. `{"version": 144, "checksum_len": 4}`.
    /// Missing fields fall back to the scheme defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let partial: PartialConfig = serde_json::from_str(json)?;
        Self::try_from(partial)
    }

    /// First byte of every payload.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Number of checksum bytes appended to the payload.
    pub fn checksum_len(&self) -> usize {
        self.checksum_len
    }

    /// Total decoded payload length: version + hash160 + checksum.
    pub fn payload_len(&self) -> usize {
        1 + HASH160_LEN + self.checksum_len
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            version: ADDRESS_VERSION,
            checksum_len: DEFAULT_CHECKSUM_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_scheme_constants() {
        let config = AddressConfig::default();
        assert_eq!(config.version(), 0x90);
        assert_eq!(config.checksum_len(), 1);
        assert_eq!(config.payload_len(), 22);
    }

    #[test]
    fn rejects_zero_checksum() {
        assert!(matches!(
            AddressConfig::new(ADDRESS_VERSION, 0),
            Err(ConfigError::ChecksumLength { got: 0, .. })
        ));
    }

    #[test]
    fn rejects_checksum_longer_than_hash160() {
        assert!(AddressConfig::new(ADDRESS_VERSION, 21).is_err());
        assert!(AddressConfig::new(ADDRESS_VERSION, 20).is_ok());
    }

    #[test]
    fn from_json_fills_defaults() {
        let config = AddressConfig::from_json(r#"{"checksum_len": 4}"#).unwrap();
        assert_eq!(config.version(), ADDRESS_VERSION);
        assert_eq!(config.checksum_len(), 4);
    }

    #[test]
    fn from_json_rejects_bad_width() {
        assert!(AddressConfig::from_json(r#"{"checksum_len": 0}"#).is_err());
        assert!(matches!(
            AddressConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn serde_cannot_switch_off_the_checksum() {
        assert!(serde_json::from_str::<AddressConfig>(r#"{"version": 144, "checksum_len": 0}"#).is_err());
        assert!(serde_json::from_str::<AddressConfig>(r#"{"checksum_len": 21}"#).is_err());

        let config: AddressConfig = serde_json::from_str(r#"{"checksum_len": 4}"#).unwrap();
        assert_eq!(config, AddressConfig::new(ADDRESS_VERSION, 4).unwrap());
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<AddressConfig>(&json).unwrap(), config);
    }

    #[test]
    fn card_number_bounds_are_sixteen_digits() {
        assert_eq!(CARD_NUMBER_BASE.to_string().len(), 16);
        assert_eq!(CARD_NUMBER_MAX, 9_999_999_999_999_999);
        assert_eq!(CARD_NUMBER_MAX.to_string().len(), 16);
    }
}
