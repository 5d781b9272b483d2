//! # Library Surface
//!
//! The string-in, string-out operations most callers need, under the
//! default address scheme (`version = 0x90`, one checksum byte). Keys travel
//! as hex, addresses as Base58, messages as UTF-8 text.
//!
//! Predicates (`validate_address`, `verify`, `verify_with_address`) never
//! error: they are meant for untrusted input and answer yes or no.
//! Everything else returns a typed [`WalletError`].
//!
//! Callers with a non-default scheme should hold a
//! [`WalletFactory`] / [`AddressCodec`] built from their own
//! [`AddressConfig`](crate::config::AddressConfig) instead.

use crate::crypto::keys::{KeyPair, PublicKey};
use crate::crypto::signatures::{self, Signature};
use crate::identity::address::AddressCodec;
use crate::identity::card_number::derive_number;
use crate::wallet::{Wallet, WalletError, WalletFactory};

/// Generate a fresh wallet.
pub fn create_wallet() -> Wallet {
    WalletFactory::default().create_wallet()
}

/// Rebuild the wallet for a hex private key.
pub fn import_from_private_key(private_key_hex: &str) -> Result<Wallet, WalletError> {
    WalletFactory::default().import_from_private_key(private_key_hex)
}

/// `true` if `address` decodes and its checksum matches.
pub fn validate_address(address: &str) -> bool {
    AddressCodec::default().validate(address)
}

/// Sign the UTF-8 bytes of `data` with a hex private key.
pub fn sign(data: &str, private_key_hex: &str) -> Result<Signature, WalletError> {
    let keypair = KeyPair::from_hex(private_key_hex)?;
    Ok(signatures::sign(&keypair, data.as_bytes())?)
}

/// `true` if `signature` over `data` verifies under the hex public key.
/// A malformed key is `false`, not an error.
pub fn verify(data: &str, signature: &Signature, public_key_hex: &str) -> bool {
    match PublicKey::from_hex(public_key_hex) {
        Ok(public_key) => signatures::verify(&public_key, data.as_bytes(), signature),
        Err(_) => false,
    }
}

/// Recover the signer of `data`, as hex of the compressed public key.
pub fn recover(data: &str, signature: &Signature) -> Result<String, WalletError> {
    let public_key = signatures::recover(data.as_bytes(), signature)?;
    Ok(public_key.to_hex())
}

/// `true` if `signature` over `data` was made by the owner of `address`.
pub fn verify_with_address(data: &str, signature: &Signature, address: &str) -> bool {
    AddressCodec::default().verify_signer(data.as_bytes(), signature, address)
}

/// 16-digit card number for `input`.
pub fn card_number(input: &str) -> u64 {
    derive_number(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::SignatureError;

    #[test]
    fn created_wallet_validates() {
        let wallet = create_wallet();
        assert!(validate_address(wallet.address()));
        assert_eq!(card_number(wallet.address()), wallet.number());
    }

    #[test]
    fn sign_verify_recover_by_hex() {
        let wallet = import_from_private_key("01").unwrap();
        let sig = sign("hello world", wallet.private_key()).unwrap();
        assert!(verify("hello world", &sig, wallet.public_key()));
        assert!(!verify("hello world!", &sig, wallet.public_key()));
        assert_eq!(recover("hello world", &sig).unwrap(), wallet.public_key());
        assert!(verify_with_address("hello world", &sig, wallet.address()));
    }

    #[test]
    fn golden_signature_for_key_one() {
        let sig = sign("hello world", "01").unwrap();
        assert_eq!(
            hex::encode(sig.r()),
            "50abcc1d060f40ca0049124dadc0977ecca7a0ed05a32a1dae0a5178cf8ca288"
        );
        assert_eq!(
            hex::encode(sig.s()),
            "27f4d877497750ce5079f48a1beb4aa590110f165de67cd2c439fd2a3d91927e"
        );
        assert_eq!(sig.recovery_id(), Some(1));
    }

    #[test]
    fn verify_with_malformed_key_is_false() {
        let sig = sign("m", "01").unwrap();
        assert!(!verify("m", &sig, "not hex"));
        assert!(!verify("m", &sig, "02"));
    }

    #[test]
    fn sign_with_bad_key_is_an_error() {
        assert!(matches!(sign("m", "xyz"), Err(WalletError::Key(_))));
    }

    #[test]
    fn recover_without_id_is_recovery_error() {
        let sig = sign("m", "01").unwrap().without_recovery_id();
        assert!(matches!(
            recover("m", &sig),
            Err(WalletError::Signature(SignatureError::Recovery(_)))
        ));
    }

    #[test]
    fn invalid_addresses() {
        assert!(!validate_address(""));
        assert!(!validate_address("not-base58-!!!"));
        assert!(validate_address("gD2YP6Q7g4g4STVoe2xwqPGnKYeDmw"));
    }
}
