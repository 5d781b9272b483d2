//! # Identity Module
//!
//! How a wallet is named. Two names, both derived from the public key and
//! nothing else:
//!
//! 1. **Address** — Base58 of `version || hash160 || checksum`. This is what
//!    users copy, paste and share.
//! 2. **Card number** — 16 digits derived from the address, for places
//!    where only digits fit.

pub mod address;
pub mod card_number;

pub use address::{Address, AddressCodec, AddressError};
pub use card_number::{derive_number, format_card_number};
