//! Ledger primitives
//!
//! Rule: No String identifiers in ledger state. Ever.
//!
//! Identities and tokens are both 32 raw bytes. They render as full
//! lowercase hex (`Display`), as an 8-byte prefix in logs (`Debug`), and
//! parse from hex with an optional `0x`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token and energy amounts in ledger units
pub type Amount = u128;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Start timestamp of a settlement window
pub type BalancePeriod = u64;

/// Shared surface of the 32-byte newtypes
macro_rules! impl_bytes32 {
    ($name:ident) => {
        impl $name {
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub const fn zero() -> Self {
                Self([0u8; 32])
            }

            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(&self.0[..8]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(s), &mut bytes)?;
                Ok(Self(bytes))
            }
        }
    };
}

/// Identity of a plant, authority, distributor or signing key
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl_bytes32!(Address);

/// Token identifier
///
/// Byte 0 carries the token kind tag; the remaining 31 bytes identify the
/// token family. The encoding lives in `lib-tokens`.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
pub struct TokenId(pub [u8; 32]);

impl_bytes32!(TokenId);

impl TokenId {
    pub const fn tag(&self) -> u8 {
        self.0[0]
    }
}
