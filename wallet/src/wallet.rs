//! # Wallets
//!
//! A [`Wallet`] is the complete identity handed back to callers: both keys
//! as hex, the address, and the card number. [`WalletFactory`] builds them,
//! either from a fresh keypair or from an existing private key.
//!
//! ```text
//! KeyPair -> compressed public key -> address -> card number -> Wallet
//! ```
//!
//! A wallet is plain data. It owns no handles and has no lifecycle; it is
//! built in one go and never mutated, so every field always describes the
//! same key.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{AddressConfig, HASH160_LEN};
use crate::crypto::keys::{KeyError, KeyPair};
use crate::crypto::signatures::{Signature, SignatureError};
use crate::identity::address::{AddressCodec, AddressError};
use crate::identity::card_number::{derive_number, format_card_number};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong at the library surface.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Address(#[from] AddressError),
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// A wallet identity.
///
/// `Serialize` includes the private key. Whoever serializes a wallet is
/// responsible for where the bytes go; `Debug` redacts it.
///
/// Deserializing re-derives the public key from the private key, checks that
/// the address is a valid address of that public key, and re-derives the
/// card number from the address. A wallet whose fields disagree is rejected.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WalletRepr")]
pub struct Wallet {
    /// Compressed public key, lowercase hex.
    public_key: String,
    /// Private scalar, 64 lowercase hex characters.
    private_key: String,
    /// Base58 address of `public_key`.
    address: String,
    /// Card number of `address`.
    number: u64,
}

impl Wallet {
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Card number grouped for display: `7822 2752 7196 5257`.
    pub fn formatted_number(&self) -> String {
        format_card_number(self.number)
    }

    /// Rebuild the keypair from the stored private key.
    pub fn keypair(&self) -> Result<KeyPair, KeyError> {
        KeyPair::from_hex(&self.private_key)
    }

    /// Sign `message` with this wallet's key.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, WalletError> {
        Ok(self.keypair()?.sign(message)?)
    }
}

#[derive(Deserialize)]
struct WalletRepr {
    public_key: String,
    private_key: String,
    address: String,
    number: u64,
}

impl TryFrom<WalletRepr> for Wallet {
    type Error = String;

    fn try_from(repr: WalletRepr) -> Result<Self, Self::Error> {
        let keypair = KeyPair::from_hex(&repr.private_key).map_err(|e| e.to_string())?;
        if !keypair.public_key_hex().eq_ignore_ascii_case(&repr.public_key) {
            return Err("public key does not belong to the private key".into());
        }
        address_of(&repr.address, &keypair)?;
        if derive_number(&repr.address) != repr.number {
            return Err("card number does not match the address".into());
        }
        Ok(Self {
            public_key: keypair.public_key_hex(),
            private_key: keypair.private_key_hex(),
            address: repr.address,
            number: repr.number,
        })
    }
}

/// Check that `address` belongs to `keypair`.
///
/// The scheme is read off the address itself: version from the first byte,
/// checksum width from whatever follows the 20-byte body. The body must be
/// the key's hash160 and the checksum must verify under that width.
fn address_of(address: &str, keypair: &KeyPair) -> Result<(), String> {
    let payload = bs58::decode(address)
        .into_vec()
        .map_err(|e| format!("invalid address: {e}"))?;
    if payload.len() <= 1 + HASH160_LEN {
        return Err(format!("invalid address: payload of {} bytes", payload.len()));
    }
    let config = AddressConfig::new(payload[0], payload.len() - 1 - HASH160_LEN)
        .map_err(|e| format!("invalid address: {e}"))?;
    let decoded = AddressCodec::new(config)
        .decode(address)
        .map_err(|e| format!("invalid address: {e}"))?;
    if !decoded.matches_public_key(&keypair.public_key()) {
        return Err("address does not belong to the public key".into());
    }
    Ok(())
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("address", &self.address)
            .field("number", &self.number)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// WalletFactory
// ---------------------------------------------------------------------------

/// Builds [`Wallet`]s under one address scheme.
///
/// # Examples
///
/// ```
/// use cardwallet::wallet::WalletFactory;
///
/// let factory = WalletFactory::default();
/// let wallet = factory.import_from_private_key("01").unwrap();
/// assert_eq!(wallet.address(), "gD2YP6Q7g4g4STVoe2xwqPGnKYeDmw");
/// assert_eq!(wallet.number(), 7_822_275_271_965_257);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletFactory {
    codec: AddressCodec,
}

impl WalletFactory {
    /// A factory issuing addresses under `config`. Configs are validated
    /// when built, so this cannot fail.
    pub fn new(config: AddressConfig) -> Self {
        Self {
            codec: AddressCodec::new(config),
        }
    }

    pub fn codec(&self) -> &AddressCodec {
        &self.codec
    }

    /// Generate a brand-new wallet.
    pub fn create_wallet(&self) -> Wallet {
        self.from_keypair(&KeyPair::generate())
    }

    /// Rebuild the wallet for an existing hex private key.
    pub fn import_from_private_key(&self, private_key_hex: &str) -> Result<Wallet, WalletError> {
        let keypair = KeyPair::from_hex(private_key_hex)?;
        Ok(self.from_keypair(&keypair))
    }

    /// Assemble the wallet for a keypair.
    pub fn from_keypair(&self, keypair: &KeyPair) -> Wallet {
        let public_key = keypair.public_key();
        let address = self.codec.encode_public_key(&public_key);
        let number = derive_number(&address);
        debug!(%address, number, "wallet assembled");

        Wallet {
            public_key: public_key.to_hex(),
            private_key: keypair.private_key_hex(),
            address,
            number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CARD_NUMBER_BASE, CARD_NUMBER_MAX};
    use crate::crypto::keys::PublicKey;

    #[test]
    fn created_wallet_is_consistent() {
        let factory = WalletFactory::default();
        let wallet = factory.create_wallet();

        let pk = PublicKey::from_hex(wallet.public_key()).unwrap();
        assert_eq!(factory.codec().encode_public_key(&pk), wallet.address());
        assert_eq!(derive_number(wallet.address()), wallet.number());
        assert_eq!(wallet.keypair().unwrap().public_key(), pk);
        assert!(factory.codec().validate(wallet.address()));
        assert!((CARD_NUMBER_BASE..=CARD_NUMBER_MAX).contains(&wallet.number()));
    }

    #[test]
    fn key_one_golden_wallet() {
        let wallet = WalletFactory::default()
            .import_from_private_key("0x01")
            .unwrap();
        assert_eq!(
            wallet.public_key(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            wallet.private_key(),
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(wallet.address(), "gD2YP6Q7g4g4STVoe2xwqPGnKYeDmw");
        assert_eq!(wallet.number(), 7_822_275_271_965_257);
    }

    #[test]
    fn import_is_deterministic() {
        let factory = WalletFactory::default();
        let a = factory.import_from_private_key("deadbeef").unwrap();
        let b = factory.import_from_private_key("DEADBEEF").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.address(), "g9ZPg1DHwViYoXMeWZowdrcMJ7CQM7");
        assert_eq!(a.number(), 7_873_850_952_208_639);
    }

    #[test]
    fn import_rejects_bad_keys() {
        let factory = WalletFactory::default();
        assert!(matches!(
            factory.import_from_private_key("zz"),
            Err(WalletError::Key(KeyError::InvalidKey(_)))
        ));
        assert!(factory.import_from_private_key("0").is_err());
    }

    #[test]
    fn scheme_config_changes_address() {
        let wide = WalletFactory::new(AddressConfig::new(0x90, 4).unwrap());
        let wallet = wide.import_from_private_key("01").unwrap();
        assert_eq!(wallet.address(), "218M8Lnp6c3avujGTkC5DeucGkkYPRbqEjC");
    }

    #[test]
    fn factory_config_always_has_a_checksum() {
        assert!(AddressConfig::new(0x90, 0).is_err());
        let factory = WalletFactory::new(AddressConfig::new(0x90, 1).unwrap());
        let wallet = factory.create_wallet();
        assert_eq!(factory.codec().config().checksum_len(), 1);
        assert!(factory.codec().validate(wallet.address()));
        assert!(!factory.codec().validate("2"));
    }

    #[test]
    fn wallet_signs_as_its_key() {
        let wallet = WalletFactory::default().create_wallet();
        let sig = wallet.sign(b"hello").unwrap();
        let pk = PublicKey::from_hex(wallet.public_key()).unwrap();
        assert!(pk.verify(b"hello", &sig));
    }

    #[test]
    fn debug_redacts_private_key() {
        let wallet = WalletFactory::default().create_wallet();
        let debug_str = format!("{:?}", wallet);
        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains(wallet.private_key()));
    }

    #[test]
    fn wallet_serde_roundtrip() {
        let wallet = WalletFactory::default().import_from_private_key("01").unwrap();
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["address"], "gD2YP6Q7g4g4STVoe2xwqPGnKYeDmw");
        assert_eq!(json["number"], 7_822_275_271_965_257u64);
        let back: Wallet = serde_json::from_value(json).unwrap();
        assert_eq!(back, wallet);
    }

    #[test]
    fn wallet_deserialize_rejects_mismatched_fields() {
        let wallet = WalletFactory::default().import_from_private_key("01").unwrap();
        let other = WalletFactory::default().import_from_private_key("02").unwrap();

        let mut json = serde_json::to_value(&wallet).unwrap();
        json["public_key"] = other.public_key().into();
        assert!(serde_json::from_value::<Wallet>(json).is_err());

        let mut json = serde_json::to_value(&wallet).unwrap();
        json["number"] = other.number().into();
        assert!(serde_json::from_value::<Wallet>(json).is_err());

        // Address and number agree with each other, but not with the key.
        let mut json = serde_json::to_value(&wallet).unwrap();
        json["address"] = other.address().into();
        json["number"] = other.number().into();
        assert!(serde_json::from_value::<Wallet>(json).is_err());

        let mut json = serde_json::to_value(&wallet).unwrap();
        json["address"] = "not an address".into();
        json["number"] = derive_number("not an address").into();
        assert!(serde_json::from_value::<Wallet>(json).is_err());
    }

    #[test]
    fn wallet_deserialize_accepts_other_schemes() {
        let wide = WalletFactory::new(AddressConfig::new(0x90, 4).unwrap());
        let wallet = wide.import_from_private_key("01").unwrap();
        let json = serde_json::to_value(&wallet).unwrap();
        let back: Wallet = serde_json::from_value(json).unwrap();
        assert_eq!(back, wallet);

        // Key 2's four-byte address under key 1's private key.
        let other = wide.import_from_private_key("02").unwrap();
        let mut json = serde_json::to_value(&wallet).unwrap();
        json["address"] = other.address().into();
        json["number"] = other.number().into();
        assert!(serde_json::from_value::<Wallet>(json).is_err());
    }

    #[test]
    fn formatted_number() {
        let wallet = WalletFactory::default().import_from_private_key("01").unwrap();
        assert_eq!(wallet.formatted_number(), "7822 2752 7196 5257");
    }
}
