//! Canonical token id derivation.
//!
//! ```text
//! id = tag (1 byte) || low31(blake3(domain || period_be || plant || discriminator))
//! ```
//!
//! # Invariants
//! 1. **Determinism**: identical inputs give identical ids on every node
//! 2. **Kind recoverability**: byte 0 is the kind tag and nothing else
//! 3. **Separation**: families of different kinds never share an id, since
//!    the tag differs even when the hashed part coincides
//!
//! The discriminator is the zero nonce for plain forwards and certificates
//! and the criteria hash for property forwards.

use lib_types::{Address, BalancePeriod, TokenId};

use crate::kind::TokenKind;

/// Versioned domain separator
const TOKEN_ID_DOMAIN: &[u8] = b"ENERGY_TOKEN_ID_V1";

/// Discriminator of plain forwards and certificates
pub const ZERO_DISCRIMINATOR: [u8; 32] = [0u8; 32];

pub fn get_token_id(
    kind: TokenKind,
    period: BalancePeriod,
    plant: &Address,
    discriminator: &[u8; 32],
) -> TokenId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(TOKEN_ID_DOMAIN);
    hasher.update(&period.to_be_bytes());
    hasher.update(plant.as_bytes());
    hasher.update(discriminator);
    let hash = hasher.finalize();

    let mut id = [0u8; 32];
    id[0] = kind.tag();
    id[1..].copy_from_slice(&hash.as_bytes()[1..]);
    TokenId::new(id)
}

/// Id of a plain forward family
pub fn get_forward_token_id(kind: TokenKind, period: BalancePeriod, plant: &Address) -> TokenId {
    get_token_id(kind, period, plant, &ZERO_DISCRIMINATOR)
}

/// Id of the certificates backed by `plant`'s documented generation in `period`
pub fn get_certificate_token_id(period: BalancePeriod, plant: &Address) -> TokenId {
    get_token_id(TokenKind::Certificate, period, plant, &ZERO_DISCRIMINATOR)
}

pub fn get_property_token_id(
    period: BalancePeriod,
    plant: &Address,
    criteria_hash: &[u8; 32],
) -> TokenId {
    get_token_id(TokenKind::PropertyForward, period, plant, criteria_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::token_kind_of;

    fn plant() -> Address {
        Address::new([7u8; 32])
    }

    #[test]
    fn test_deterministic() {
        let a = get_forward_token_id(TokenKind::AbsoluteForward, 1579860001, &plant());
        let b = get_forward_token_id(TokenKind::AbsoluteForward, 1579860001, &plant());
        assert_eq!(a, b);
    }

    #[test]
    fn test_kind_is_tag() {
        for kind in TokenKind::ALL {
            let id = get_forward_token_id(kind, 1579860001, &plant());
            assert_eq!(id.tag(), kind.tag());
            assert_eq!(token_kind_of(&id).unwrap(), kind);
        }
    }

    #[test]
    fn test_kinds_share_the_hashed_part() {
        let forward = get_forward_token_id(TokenKind::AbsoluteForward, 1579860001, &plant());
        let certificate = get_certificate_token_id(1579860001, &plant());
        assert_ne!(forward, certificate);
        assert_eq!(forward.as_bytes()[1..], certificate.as_bytes()[1..]);
    }

    #[test]
    fn test_every_dimension_matters() {
        let base = get_forward_token_id(TokenKind::AbsoluteForward, 1579860001, &plant());
        assert_ne!(
            base,
            get_forward_token_id(TokenKind::AbsoluteForward, 1579860901, &plant())
        );
        assert_ne!(
            base,
            get_forward_token_id(TokenKind::AbsoluteForward, 1579860001, &Address::new([8u8; 32]))
        );
        assert_ne!(
            get_property_token_id(1579860001, &plant(), &[1u8; 32]),
            get_property_token_id(1579860001, &plant(), &[2u8; 32])
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_tag_survives_any_input(
                ordinal in 0u8..5,
                period in any::<u64>(),
                plant in any::<[u8; 32]>(),
                discriminator in any::<[u8; 32]>(),
            ) {
                let kind = TokenKind::from_ordinal(ordinal).unwrap();
                let id = get_token_id(kind, period, &Address::new(plant), &discriminator);
                prop_assert_eq!(token_kind_of(&id).unwrap(), kind);
            }

            #[test]
            fn prop_periods_do_not_collide(a in any::<u64>(), b in any::<u64>()) {
                prop_assume!(a != b);
                prop_assert_ne!(
                    get_certificate_token_id(a, &plant()),
                    get_certificate_token_id(b, &plant())
                );
            }
        }
    }
}
