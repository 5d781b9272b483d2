//! # Key Management
//!
//! secp256k1 keypair generation, import and serialization.
//!
//! Every wallet is backed by exactly one keypair. This module handles
//! creating it, loading it back from hex, and exporting the public half in
//! the SEC1 compressed form that addresses are derived from.
//!
//! ## Security considerations
//!
//! - Fresh keys come from `OsRng`. A candidate scalar that is zero or not
//!   below the curve order is thrown away and redrawn, never reduced: reducing
//!   would bias the distribution.
//! - Key bytes are never logged, and `Debug` on [`KeyPair`] only prints the
//!   public key.
//! - Signing keys are zeroized on drop by `k256`.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::zeroize::Zeroize;
use k256::FieldBytes;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::signatures::{self, Signature, SignatureError};
use crate::config::{COMPRESSED_PUBLIC_KEY_LEN, PRIVATE_KEY_LEN, UNCOMPRESSED_PUBLIC_KEY_LEN};

/// Errors that can occur during key operations.
///
/// The reasons are fixed strings on purpose: an error message is exactly
/// where key material would leak if we formatted the input into it.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid private key: {0}")]
    InvalidKey(&'static str),

    #[error("invalid public key: not a valid secp256k1 point")]
    InvalidPublicKey,
}

/// A secp256k1 keypair.
///
/// Deliberately not `Serialize`: exporting a private key should take an
/// explicit call to [`private_key_hex`](Self::private_key_hex), not happen
/// because a keypair ended up inside a JSON response.
///
/// # Examples
///
/// ```
/// use cardwallet::crypto::KeyPair;
///
/// let kp = KeyPair::generate();
/// let sig = kp.sign(b"pay 10 to alice").unwrap();
/// assert!(kp.public_key().verify(b"pay 10 to alice", &sig));
/// ```
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

/// The public half of a keypair, stored in SEC1 compressed form.
///
/// Only constructed from bytes that decode to a point on the curve, so a
/// `PublicKey` in hand is always usable for verification.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; COMPRESSED_PUBLIC_KEY_LEN],
}

impl KeyPair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a keypair from a caller-supplied CSPRNG.
    ///
    /// Draws 32 bytes at a time until they form a scalar in `[1, n)`. The
    /// rejection probability is about 2^-128 per draw, so in practice this
    /// loops once.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut candidate = [0u8; PRIVATE_KEY_LEN];
        loop {
            rng.fill_bytes(&mut candidate);
            let parsed = SigningKey::from_bytes(FieldBytes::from_slice(&candidate));
            candidate.zeroize();
            match parsed {
                Ok(signing_key) => return Self { signing_key },
                Err(_) => trace!("scalar out of range, drawing again"),
            }
        }
    }

    /// Reconstruct a keypair from a 32-byte big-endian scalar.
    ///
    /// Fails if the slice is not 32 bytes, or the scalar is zero or not
    /// below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(KeyError::InvalidKey("expected 32 bytes"));
        }
        let signing_key = SigningKey::from_bytes(FieldBytes::from_slice(bytes))
            .map_err(|_| KeyError::InvalidKey("scalar is zero or not below the curve order"))?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded scalar.
    ///
    /// Accepts an optional `0x` prefix and either letter case. Inputs shorter
    /// than 64 digits are read as numbers and left-padded, so `"01"` is
    /// private key one.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let digits = hex_str.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);

        if digits.is_empty() {
            return Err(KeyError::InvalidKey("empty hex string"));
        }
        if digits.len() > PRIVATE_KEY_LEN * 2 {
            return Err(KeyError::InvalidKey("longer than 32 bytes"));
        }

        let mut padded = format!("{:0>width$}", digits, width = PRIVATE_KEY_LEN * 2);
        let decoded = hex::decode(&padded);
        padded.zeroize();
        let mut bytes = decoded.map_err(|_| KeyError::InvalidKey("not valid hex"))?;
        let keypair = Self::from_bytes(&bytes);
        bytes.zeroize();
        keypair
    }

    /// Returns the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Compressed public key as lowercase hex. 66 characters.
    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }

    /// Exports the raw 32-byte private scalar.
    ///
    /// **Handle with care.** Anyone holding these bytes owns the wallet.
    pub fn private_key_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        let mut out = [0u8; PRIVATE_KEY_LEN];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// Exports the private scalar as 64 lowercase hex characters.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign a message. See [`signatures::sign`].
    pub fn sign(&self, message: &[u8]) -> Result<Signature, SignatureError> {
        signatures::sign(self, message)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for KeyPair {
    /// Keypairs compare by public key, so secret bytes never go through a
    /// variable-time comparison.
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for KeyPair {}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Parse a SEC1 public key, compressed (33 bytes) or uncompressed
    /// (65 bytes). The point must be on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LEN && bytes.len() != UNCOMPRESSED_PUBLIC_KEY_LEN {
            return Err(KeyError::InvalidPublicKey);
        }
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self::from_verifying_key(&verifying_key))
    }

    /// Parse a hex-encoded SEC1 public key.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidPublicKey)?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_verifying_key(verifying_key: &VerifyingKey) -> Self {
        let point = verifying_key.to_encoded_point(true);
        let mut bytes = [0u8; COMPRESSED_PUBLIC_KEY_LEN];
        bytes.copy_from_slice(point.as_bytes());
        Self { bytes }
    }

    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, KeyError> {
        VerifyingKey::from_sec1_bytes(&self.bytes).map_err(|_| KeyError::InvalidPublicKey)
    }

    /// The 33-byte compressed encoding. This is what addresses hash.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LEN] {
        self.bytes
    }

    /// The 65-byte uncompressed encoding `0x04 || x || y`.
    pub fn to_uncompressed(&self) -> Result<[u8; UNCOMPRESSED_PUBLIC_KEY_LEN], KeyError> {
        let point = self.verifying_key()?.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_PUBLIC_KEY_LEN];
        out.copy_from_slice(point.as_bytes());
        Ok(out)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Verify a signature over `message`. Never errors; anything malformed
    /// is just `false`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        signatures::verify(self, message, signature)
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.bytes)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            PublicKey::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
