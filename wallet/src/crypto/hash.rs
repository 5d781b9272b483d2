//! # Hashing Utilities
//!
//! The hash pipeline behind every address. Two primitives, composed two ways:
//!
//! - **short hash** (a.k.a. hash160) — `RIPEMD160(SHA256(x))`. SHA-256 does
//!   the heavy lifting on collision resistance; RIPEMD-160 shortens the
//!   32-byte digest to the 20 bytes that end up in an address.
//!
//! - **checksum** — `short_hash(short_hash(x))`, truncated to the configured
//!   width. Appended to the address payload so typos are caught before
//!   anyone sends money to them.
//!
//! ## Raw bytes only
//!
//! Every stage hashes raw binary. There is no hex or UTF-8 detour between
//! SHA-256 and RIPEMD-160: an address must depend on the key material, not on
//! whichever text encoding a caller happened to pick.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::config::{HASH160_LEN, SHA256_LEN};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use cardwallet::crypto::sha256;
///
/// let hash = sha256(b"cardwallet");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; SHA256_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; HASH160_LEN] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; HASH160_LEN];
    output.copy_from_slice(&result);
    output
}

/// Compute the short hash: `RIPEMD160(SHA256(data))`.
///
/// Always 20 bytes, whatever the input length. This is the body of every
/// address.
///
/// # Example
///
/// ```
/// use cardwallet::crypto::short_hash;
///
/// assert_eq!(short_hash(b"").len(), 20);
/// assert_eq!(short_hash(&[0u8; 4096]).len(), 20);
/// ```
pub fn short_hash(data: &[u8]) -> [u8; HASH160_LEN] {
    ripemd160(&sha256(data))
}

/// Compute the address checksum: the first `len` bytes of
/// `short_hash(short_hash(data))`.
///
/// Double-hashing keeps the checksum from being a simple function of the
/// first stage's internal state. `len` is clamped to the hash160 width;
/// [`AddressConfig`](crate::config::AddressConfig) rejects anything wider
/// before it gets here.
pub fn checksum(data: &[u8], len: usize) -> Vec<u8> {
    let digest = short_hash(&short_hash(data));
    digest[..len.min(HASH160_LEN)].to_vec()
}

/// Hash a message into the 32-byte digest that ECDSA signs.
///
/// Signing always goes through this so that `sign`, `verify` and `recover`
/// agree on what was signed.
pub fn message_digest(message: &[u8]) -> [u8; SHA256_LEN] {
    sha256(message)
}
