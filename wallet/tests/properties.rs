use proptest::prelude::*;

use cardwallet::config::{AddressConfig, CARD_NUMBER_BASE, CARD_NUMBER_MAX};
use cardwallet::crypto::{recover, sign, verify, KeyPair};
use cardwallet::identity::{derive_number, Address, AddressCodec};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encoded_address_always_validates(seed in prop::array::uniform32(any::<u8>())) {
        // Not every 32-byte array is a valid scalar (zero, or >= curve order).
        if let Ok(kp) = KeyPair::from_bytes(&seed) {
            let codec = AddressCodec::default();
            let address = codec.encode_public_key(&kp.public_key());
            prop_assert!(codec.validate(&address));
            let decoded = codec.decode(&address).unwrap();
            prop_assert!(decoded.matches_public_key(&kp.public_key()));
        }
    }

    #[test]
    fn four_byte_checksum_catches_single_byte_corruption(
        seed in prop::array::uniform32(any::<u8>()),
        index in 0usize..21,
        flip in 1u8..=255,
    ) {
        // With four checksum bytes a miss is a 2^-32 event; treat any as a bug.
        if let Ok(kp) = KeyPair::from_bytes(&seed) {
            let config = AddressConfig::new(0x90, 4).unwrap();
            let codec = AddressCodec::new(config);
            let mut payload = Address::from_public_key_with(&kp.public_key(), &config).to_payload();
            payload[index] ^= flip;
            prop_assert!(!codec.validate(&bs58::encode(&payload).into_string()));
        }
    }

    #[test]
    fn sign_verify_recover(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        if let Ok(kp) = KeyPair::from_bytes(&seed) {
            let sig = sign(&kp, &msg).unwrap();
            prop_assert!(sig.is_low_s());
            prop_assert!(verify(&kp.public_key(), &msg, &sig));
            prop_assert_eq!(recover(&msg, &sig).unwrap(), kp.public_key());
            prop_assert_eq!(sign(&kp, &msg).unwrap(), sig);
        }
    }

    #[test]
    fn card_number_is_sixteen_digits(input in ".*") {
        let n = derive_number(&input);
        prop_assert!((CARD_NUMBER_BASE..=CARD_NUMBER_MAX).contains(&n));
        prop_assert_eq!(n.to_string().len(), 16);
    }

    #[test]
    fn validate_never_panics(input in ".{0,64}") {
        let _ = cardwallet::validate_address(&input);
    }
}
