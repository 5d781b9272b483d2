//! # Digital Signatures
//!
//! secp256k1 ECDSA: signing, verification and public key recovery.
//!
//! ## What gets signed
//!
//! Messages are hashed with SHA-256 ([`message_digest`]) and the digest is
//! signed. `sign`, `verify` and `recover` all hash the same way, and the
//! `*_digest` variants exist for callers that already hold a digest.
//!
//! ## Canonical form
//!
//! Nonces are derived with RFC6979, so the same key and message always give
//! the same signature. Every signature we produce is low-s, and `verify`
//! rejects high-s signatures outright: a transaction id that depends on the
//! signature bytes can't be malleated by flipping `s`.
//!
//! ## Recovery
//!
//! Each signature carries a recovery id (0..=3) naming which candidate point
//! produced it. With it, [`recover`] rebuilds the signer's public key from
//! the message and signature alone. Failure is an `Err`, never a
//! placeholder key.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};
use k256::FieldBytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use super::hash::message_digest;
use super::keys::{KeyPair, PublicKey};
use crate::config::{COMPACT_SIGNATURE_LEN, MAX_RECOVERY_ID, SHA256_LEN};

/// Errors during signature operations.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// `r`/`s` out of range, wrong length, or a recovery id above 3.
    #[error("malformed signature: {0}")]
    Format(String),

    /// No recovery id, or the recovered point is not a valid public key.
    #[error("public key recovery failed: {0}")]
    Recovery(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// An ECDSA signature `(r, s)` plus an optional recovery id.
///
/// Serializes to JSON as `{"r": "<hex>", "s": "<hex>", "recovery_id": 1}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignatureRepr", into = "SignatureRepr")]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: Option<u8>,
}

#[derive(Serialize, Deserialize)]
struct SignatureRepr {
    r: String,
    s: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recovery_id: Option<u8>,
}

impl Signature {
    /// Assemble a signature from its parts. Nothing is range-checked here;
    /// [`verify`] and [`recover`] do that when the signature is used.
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: Option<u8>) -> Self {
        Self { r, s, recovery_id }
    }

    /// Big-endian `r`.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Big-endian `s`.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    pub fn recovery_id(&self) -> Option<u8> {
        self.recovery_id
    }

    /// The same `(r, s)` with the recovery id dropped.
    pub fn without_recovery_id(&self) -> Self {
        Self {
            recovery_id: None,
            ..self.clone()
        }
    }

    /// `true` if `s` is in the lower half of the curve order. Malformed
    /// signatures are not low-s.
    pub fn is_low_s(&self) -> bool {
        match self.to_k256() {
            Ok(sig) => sig.normalize_s().is_none(),
            Err(_) => false,
        }
    }

    /// 65-byte compact form: `recovery_id || r || s`.
    pub fn to_compact(&self) -> Result<[u8; COMPACT_SIGNATURE_LEN], SignatureError> {
        let recovery_id = self
            .recovery_id
            .ok_or_else(|| SignatureError::Format("compact form needs a recovery id".into()))?;
        let mut out = [0u8; COMPACT_SIGNATURE_LEN];
        out[0] = recovery_id;
        out[1..33].copy_from_slice(&self.r);
        out[33..].copy_from_slice(&self.s);
        Ok(out)
    }

    /// Parse the 65-byte compact form.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != COMPACT_SIGNATURE_LEN {
            return Err(SignatureError::Format(format!(
                "compact signature must be {} bytes, got {}",
                COMPACT_SIGNATURE_LEN,
                bytes.len()
            )));
        }
        if bytes[0] > MAX_RECOVERY_ID {
            return Err(SignatureError::Format(format!(
                "recovery id {} out of range",
                bytes[0]
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[1..33]);
        s.copy_from_slice(&bytes[33..]);
        Ok(Self {
            r,
            s,
            recovery_id: Some(bytes[0]),
        })
    }

    /// Hex of the compact form. 130 characters.
    pub fn to_hex(&self) -> Result<String, SignatureError> {
        Ok(hex::encode(self.to_compact()?))
    }

    /// Parse the hex of a compact signature.
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| SignatureError::Format(format!("bad hex: {e}")))?;
        Self::from_compact(&bytes)
    }

    /// Convert to a `k256` signature, rejecting zero or out-of-range scalars.
    fn to_k256(&self) -> Result<ecdsa::Signature, SignatureError> {
        ecdsa::Signature::from_scalars(FieldBytes::from(self.r), FieldBytes::from(self.s))
            .map_err(|_| SignatureError::Format("r or s is zero or not below the curve order".into()))
    }
}

impl TryFrom<SignatureRepr> for Signature {
    type Error = SignatureError;

    fn try_from(repr: SignatureRepr) -> Result<Self, Self::Error> {
        let r = decode_scalar(&repr.r, "r")?;
        let s = decode_scalar(&repr.s, "s")?;
        if matches!(repr.recovery_id, Some(id) if id > MAX_RECOVERY_ID) {
            return Err(SignatureError::Format("recovery id out of range".into()));
        }
        Ok(Self {
            r,
            s,
            recovery_id: repr.recovery_id,
        })
    }
}

impl From<Signature> for SignatureRepr {
    fn from(sig: Signature) -> Self {
        Self {
            r: hex::encode(sig.r),
            s: hex::encode(sig.s),
            recovery_id: sig.recovery_id,
        }
    }
}

fn decode_scalar(hex_str: &str, name: &str) -> Result<[u8; 32], SignatureError> {
    let bytes =
        hex::decode(hex_str).map_err(|e| SignatureError::Format(format!("{name}: bad hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(SignatureError::Format(format!(
            "{name}: expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature(r={}.., s={}.., recovery_id={:?})",
            &hex::encode(self.r)[..8],
            &hex::encode(self.s)[..8],
            self.recovery_id
        )
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Sign `message` with `keypair`.
///
/// Hashes the message with SHA-256 and signs the digest. Deterministic:
/// signing the same message with the same key twice gives identical bytes.
///
/// # Example
///
/// ```
/// use cardwallet::crypto::{recover, sign, verify, KeyPair};
///
/// let kp = KeyPair::generate();
/// let sig = sign(&kp, b"I own this wallet").unwrap();
/// assert!(verify(&kp.public_key(), b"I own this wallet", &sig));
/// assert_eq!(recover(b"I own this wallet", &sig).unwrap(), kp.public_key());
/// ```
pub fn sign(keypair: &KeyPair, message: &[u8]) -> Result<Signature, SignatureError> {
    sign_digest(keypair, &message_digest(message))
}

/// Sign a precomputed 32-byte digest.
pub fn sign_digest(
    keypair: &KeyPair,
    digest: &[u8; SHA256_LEN],
) -> Result<Signature, SignatureError> {
    let (mut sig, mut recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest)
        .map_err(|e| SignatureError::Signing(e.to_string()))?;

    // k256 already hands back low-s; normalizing again is a no-op then, and
    // flipping s flips the parity of R, hence the recovery id.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let (r_bytes, s_bytes) = sig.split_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&r_bytes);
    s.copy_from_slice(&s_bytes);

    Ok(Signature {
        r,
        s,
        recovery_id: Some(recovery_id.to_byte()),
    })
}

/// Verify a signature over `message`.
///
/// Returns `false` for anything that isn't a valid low-s signature by
/// `public_key`: wrong key, wrong message, zero or out-of-range scalars,
/// high-s. The recovery id is not consulted.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    verify_digest(public_key, &message_digest(message), signature)
}

/// Verify a signature over a precomputed digest.
pub fn verify_digest(
    public_key: &PublicKey,
    digest: &[u8; SHA256_LEN],
    signature: &Signature,
) -> bool {
    let Ok(sig) = signature.to_k256() else {
        return false;
    };
    if sig.normalize_s().is_some() {
        return false;
    }
    let Ok(verifying_key) = public_key.verifying_key() else {
        return false;
    };
    verifying_key.verify_prehash(digest, &sig).is_ok()
}

/// Recover the signer's public key from a message and signature.
pub fn recover(message: &[u8], signature: &Signature) -> Result<PublicKey, SignatureError> {
    recover_digest(&message_digest(message), signature)
}

/// Recover the signer's public key from a precomputed digest.
pub fn recover_digest(
    digest: &[u8; SHA256_LEN],
    signature: &Signature,
) -> Result<PublicKey, SignatureError> {
    let id = signature
        .recovery_id
        .ok_or_else(|| SignatureError::Recovery("signature carries no recovery id".into()))?;
    let recovery_id = RecoveryId::from_byte(id)
        .ok_or_else(|| SignatureError::Format(format!("recovery id {id} out of range")))?;
    let sig = signature.to_k256()?;

    let verifying_key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| {
            debug!(recovery_id = id, error = %e, "public key recovery failed");
            SignatureError::Recovery("reconstructed point is not a valid public key".into())
        })?;

    Ok(PublicKey::from_verifying_key(&verifying_key))
}
