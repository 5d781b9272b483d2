// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # cardwallet — Core Library
//!
//! Wallet identities on secp256k1: keys, Base58 addresses, 16-digit card
//! numbers, and message signatures that prove who owns an address.
//!
//! ## Architecture
//!
//! - **config** — Scheme constants and [`AddressConfig`](config::AddressConfig).
//! - **crypto** — Hash pipeline, keypairs, ECDSA sign/verify/recover.
//! - **identity** — Addresses and card numbers.
//! - **wallet** — [`Wallet`] values and the [`WalletFactory`] that builds them.
//! - **api** — The string-based surface, re-exported here.
//!
//! ## Design Philosophy
//!
//! 1. Bit-exact and deterministic. Two implementations that agree on the
//!    scheme constants must agree on every address, number and signature.
//! 2. Predicates say yes or no; everything else returns a typed error.
//!    No sentinel values.
//! 3. No global mutable state. Every call is safe from any thread.
//! 4. The library logs through `tracing` and never installs a subscriber.
//!    Key material is never logged.
//!
//! ## Quick start
//!
//! ```
//! let wallet = cardwallet::create_wallet();
//! assert!(cardwallet::validate_address(wallet.address()));
//!
//! let sig = cardwallet::sign("I own this", wallet.private_key()).unwrap();
//! assert!(cardwallet::verify("I own this", &sig, wallet.public_key()));
//! assert_eq!(cardwallet::recover("I own this", &sig).unwrap(), wallet.public_key());
//! ```

pub mod api;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod wallet;

pub use api::{
    card_number, create_wallet, import_from_private_key, recover, sign, validate_address, verify,
    verify_with_address,
};
pub use crypto::{KeyPair, PublicKey, Signature};
pub use identity::{Address, AddressCodec};
pub use wallet::{Wallet, WalletError, WalletFactory};
