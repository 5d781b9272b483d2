//! # Addresses
//!
//! An address is the human-facing name of a wallet. It is derived from the
//! compressed public key:
//!
//! ```text
//! public_key (33 bytes)
//!     -> RIPEMD160(SHA256(public_key))          -> hash160 (20 bytes)
//!     -> 0x90 || hash160                        -> versioned (21 bytes)
//!     -> versioned || checksum(versioned)       -> payload (21 + checksum_len)
//!     -> Base58(payload)                        -> gD2YP6Q7g4g4STVoe2xwq...
//! ```
//!
//! `checksum(x)` is the first `checksum_len` bytes of
//! `short_hash(short_hash(x))`. With the default one-byte checksum, about 1
//! in 256 corrupted addresses still validates; see
//! [`DEFAULT_CHECKSUM_LEN`](crate::config::DEFAULT_CHECKSUM_LEN).
//!
//! ## Validation vs. parsing
//!
//! [`AddressCodec::validate`] answers one question: does the stored checksum
//! match the recomputed one? It does not look at the version byte or the
//! body length. [`AddressCodec::decode`] is the strict variant and also
//! requires the configured version and a 20-byte body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{AddressConfig, HASH160_LEN};
use crate::crypto::hash::{checksum, short_hash};
use crate::crypto::keys::PublicKey;
use crate::crypto::signatures::{self, Signature};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an address string was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Empty input or characters outside the Base58 alphabet.
    #[error("base58 decode error: {0}")]
    Decode(String),

    /// Too few bytes to hold a version byte and a checksum.
    #[error("address payload too short: need at least {min} bytes, got {got}")]
    TooShort { min: usize, got: usize },

    #[error("address checksum mismatch")]
    ChecksumMismatch,

    #[error("unexpected address version: expected 0x{expected:02x}, got 0x{got:02x}")]
    WrongVersion { expected: u8, got: u8 },

    #[error("invalid address body length: expected {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A decoded address: `version || hash160 || checksum`.
///
/// # Examples
///
/// ```
/// use cardwallet::crypto::KeyPair;
/// use cardwallet::identity::Address;
///
/// let kp = KeyPair::generate();
/// let address = Address::from_public_key(&kp.public_key());
/// let text = address.to_string();
///
/// let parsed: Address = text.parse().unwrap();
/// assert_eq!(parsed, address);
/// assert!(parsed.matches_public_key(&kp.public_key()));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    version: u8,
    hash160: [u8; HASH160_LEN],
    checksum: Vec<u8>,
}

impl Address {
    /// Derive the address of a public key under the default scheme.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::from_public_key_with(public_key, &AddressConfig::default())
    }

    /// Derive the address of a public key under `config`.
    pub fn from_public_key_with(public_key: &PublicKey, config: &AddressConfig) -> Self {
        Self::from_hash160(short_hash(public_key.as_bytes()), config)
    }

    /// Build an address around an existing hash160.
    pub fn from_hash160(hash160: [u8; HASH160_LEN], config: &AddressConfig) -> Self {
        let mut versioned = Vec::with_capacity(1 + HASH160_LEN);
        versioned.push(config.version());
        versioned.extend_from_slice(&hash160);
        Self {
            version: config.version(),
            hash160,
            checksum: checksum(&versioned, config.checksum_len()),
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash160(&self) -> &[u8; HASH160_LEN] {
        &self.hash160
    }

    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    /// The raw payload `version || hash160 || checksum`.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(1 + HASH160_LEN + self.checksum.len());
        payload.push(self.version);
        payload.extend_from_slice(&self.hash160);
        payload.extend_from_slice(&self.checksum);
        payload
    }

    /// Base58 text form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_payload()).into_string()
    }

    /// `true` if `public_key` hashes to this address's body.
    pub fn matches_public_key(&self, public_key: &PublicKey) -> bool {
        short_hash(public_key.as_bytes()) == self.hash160
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Strict parse under the default scheme.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressCodec::default().decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AddressCodec
// ---------------------------------------------------------------------------

/// Encodes and checks addresses under one [`AddressConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressCodec {
    config: AddressConfig,
}

impl AddressCodec {
    pub fn new(config: AddressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AddressConfig {
        &self.config
    }

    /// Encode a public key (raw SEC1 bytes, normally compressed) as an
    /// address string.
    ///
    /// The bytes are hashed as given; compressed and uncompressed encodings
    /// of the same point give different addresses.
    pub fn encode(&self, public_key_bytes: &[u8]) -> String {
        Address::from_hash160(short_hash(public_key_bytes), &self.config).to_base58()
    }

    /// Encode a [`PublicKey`] via its compressed form.
    pub fn encode_public_key(&self, public_key: &PublicKey) -> String {
        self.encode(public_key.as_bytes())
    }

    /// `true` if the address decodes and its checksum matches.
    ///
    /// Never errors: malformed input is just `false`. Use [`check`](Self::check)
    /// to find out why.
    pub fn validate(&self, address: &str) -> bool {
        match self.check(address) {
            Ok(_) => true,
            Err(reason) => {
                debug!(%reason, "address rejected");
                false
            }
        }
    }

    /// Decode and verify the checksum, returning the raw payload.
    ///
    /// Splits the payload as `version = payload[0]`,
    /// `body = payload[1..len - checksum_len]`, `stored = payload[len -
    /// checksum_len..]` and compares `checksum(version || body)` to
    /// `stored`. Neither the version nor the body length is checked here.
    pub fn check(&self, address: &str) -> Result<Vec<u8>, AddressError> {
        if address.is_empty() {
            return Err(AddressError::Decode("empty address".into()));
        }
        let payload = bs58::decode(address)
            .into_vec()
            .map_err(|e| AddressError::Decode(e.to_string()))?;

        let checksum_len = self.config.checksum_len();
        let min = 1 + checksum_len;
        if payload.len() < min {
            return Err(AddressError::TooShort {
                min,
                got: payload.len(),
            });
        }

        let (versioned, stored) = payload.split_at(payload.len() - checksum_len);
        if checksum(versioned, checksum_len) != stored {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(payload)
    }

    /// Strict decode: checksum, configured version, and a 20-byte body.
    pub fn decode(&self, address: &str) -> Result<Address, AddressError> {
        let payload = self.check(address)?;

        let version = payload[0];
        if version != self.config.version() {
            return Err(AddressError::WrongVersion {
                expected: self.config.version(),
                got: version,
            });
        }

        let (versioned, stored) = payload.split_at(payload.len() - self.config.checksum_len());
        let body = &versioned[1..];
        if body.len() != HASH160_LEN {
            return Err(AddressError::WrongLength {
                expected: HASH160_LEN,
                got: body.len(),
            });
        }

        // `check` already verified `stored`; no need to hash again.
        let mut hash160 = [0u8; HASH160_LEN];
        hash160.copy_from_slice(body);
        Ok(Address {
            version,
            hash160,
            checksum: stored.to_vec(),
        })
    }

    /// `true` if `signature` over `message` was made by the key behind
    /// `address`.
    ///
    /// Recovers the signer, checks the signature against it, and compares
    /// the recovered key's hash160 with the address body. Needs a recovery
    /// id; any failure is `false`.
    pub fn verify_signer(&self, message: &[u8], signature: &Signature, address: &str) -> bool {
        let Ok(expected) = self.decode(address) else {
            return false;
        };
        let signer = match signatures::recover(message, signature) {
            Ok(pk) => pk,
            Err(e) => {
                debug!(error = %e, "could not recover signer");
                return false;
            }
        };
        signatures::verify(&signer, message, signature) && expected.matches_public_key(&signer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
