//! # Card Numbers
//!
//! A 16-digit number derived from an address, for places where a Base58
//! string won't fit: printed cards, phone keypads, legacy payment forms.
//!
//! ```text
//! n = first 16 hex digits of SHA256(input), as a u64
//! number = 1_000_000_000_000_000 + n mod 9_000_000_000_000_000
//! ```
//!
//! The first 16 hex digits are the first 8 digest bytes read big-endian,
//! which is how it is computed here. Collisions are possible and
//! acceptable: a card number is a lookup key, not a credential.

use crate::config::{CARD_NUMBER_BASE, CARD_NUMBER_SPAN};
use crate::crypto::hash::sha256;

/// Derive the 16-digit card number for `input` (normally an address).
///
/// # Example
///
/// ```
/// use cardwallet::identity::derive_number;
///
/// let n = derive_number("gD2YP6Q7g4g4STVoe2xwqPGnKYeDmw");
/// assert_eq!(n, 7_822_275_271_965_257);
/// ```
pub fn derive_number(input: &str) -> u64 {
    let digest = sha256(input.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    CARD_NUMBER_BASE + u64::from_be_bytes(seed) % CARD_NUMBER_SPAN
}

/// Format a card number in groups of four: `7822 2752 7196 5257`.
pub fn format_card_number(number: u64) -> String {
    let digits = number.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CARD_NUMBER_MAX;

    #[test]
    fn known_vectors() {
        assert_eq!(derive_number(""), 9_829_232_824_261_652);
        assert_eq!(derive_number("hello"), 8_736_544_897_475_342);
    }

    #[test]
    fn matches_hex_prefix_reading() {
        let input = "g6Egec2TvZKUQfEJUx3bcoDR5WbwHn";
        let hex_digest = hex::encode(sha256(input.as_bytes()));
        let n = u64::from_str_radix(&hex_digest[..16], 16).unwrap();
        assert_eq!(derive_number(input), CARD_NUMBER_BASE + n % CARD_NUMBER_SPAN);
        assert_eq!(derive_number(input), 3_904_711_150_777_648);
    }

    #[test]
    fn deterministic() {
        assert_eq!(derive_number("same"), derive_number("same"));
        assert_ne!(derive_number("same"), derive_number("Same"));
    }

    #[test]
    fn always_sixteen_digits() {
        for i in 0..500 {
            let n = derive_number(&format!("input-{i}"));
            assert!((CARD_NUMBER_BASE..=CARD_NUMBER_MAX).contains(&n));
            assert_eq!(n.to_string().len(), 16);
        }
    }

    #[test]
    fn formatting_groups_by_four() {
        assert_eq!(format_card_number(7_822_275_271_965_257), "7822 2752 7196 5257");
        assert_eq!(format_card_number(1234), "1234");
    }
}
