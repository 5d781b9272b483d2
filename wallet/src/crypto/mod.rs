//! # Cryptographic Primitives
//!
//! Everything key- and hash-shaped lives here:
//!
//! - **hash** — SHA-256, RIPEMD-160, the short hash and the address checksum.
//! - **keys** — secp256k1 keypairs and public keys.
//! - **signatures** — RFC6979 ECDSA with low-s normalization and recovery.
//!
//! These are thin wrappers over `k256`, `sha2` and `ripemd`. The curve math
//! is theirs; what lives here is how we compose it.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{checksum, message_digest, ripemd160, sha256, short_hash};
pub use keys::{KeyError, KeyPair, PublicKey};
pub use signatures::{
    recover, recover_digest, sign, sign_digest, verify, verify_digest, Signature, SignatureError,
};
