//! Token Kinds
//!
//! The first byte of every [`TokenId`] is a kind tag:
//!
//! | Kind                    | Tag  |
//! |-------------------------|------|
//! | AbsoluteForward         | 0x00 |
//! | GenerationBasedForward  | 0x02 |
//! | ConsumptionBasedForward | 0x03 |
//! | Certificate             | 0x04 |
//! | PropertyForward         | 0x08 |
//!
//! Bit 1 marks relative forwards, bit 0 consumption-based ones, bit 2
//! certificates.

use std::fmt;

use lib_claims::ClaimTopic;
use lib_types::TokenId;
use serde::{Deserialize, Serialize};

use crate::errors::{TokenError, TokenResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    AbsoluteForward,
    GenerationBasedForward,
    ConsumptionBasedForward,
    Certificate,
    PropertyForward,
}

const CLAIMS_FORWARD: &[ClaimTopic] = &[ClaimTopic::BALANCE, ClaimTopic::EXISTENCE];
const CLAIMS_CONSUMPTION_FORWARD: &[ClaimTopic] = &[
    ClaimTopic::BALANCE,
    ClaimTopic::EXISTENCE,
    ClaimTopic::CONSUMPTION_TYPE,
    ClaimTopic::MAX_POWER_CONSUMPTION,
];
const CLAIMS_CERTIFICATE: &[ClaimTopic] = &[ClaimTopic::EXISTENCE];

impl TokenKind {
    pub const ALL: [TokenKind; 5] = [
        TokenKind::AbsoluteForward,
        TokenKind::GenerationBasedForward,
        TokenKind::ConsumptionBasedForward,
        TokenKind::Certificate,
        TokenKind::PropertyForward,
    ];

    /// Tag byte stored in byte 0 of the token id
    pub const fn tag(&self) -> u8 {
        match self {
            TokenKind::AbsoluteForward => 0x00,
            TokenKind::GenerationBasedForward => 0x02,
            TokenKind::ConsumptionBasedForward => 0x03,
            TokenKind::Certificate => 0x04,
            TokenKind::PropertyForward => 0x08,
        }
    }

    pub fn from_tag(tag: u8) -> TokenResult<Self> {
        match tag {
            0x00 => Ok(TokenKind::AbsoluteForward),
            0x02 => Ok(TokenKind::GenerationBasedForward),
            0x03 => Ok(TokenKind::ConsumptionBasedForward),
            0x04 => Ok(TokenKind::Certificate),
            0x08 => Ok(TokenKind::PropertyForward),
            other => Err(TokenError::UnknownTokenKind(other)),
        }
    }

    /// Position in declaration order
    pub const fn ordinal(&self) -> u8 {
        match self {
            TokenKind::AbsoluteForward => 0,
            TokenKind::GenerationBasedForward => 1,
            TokenKind::ConsumptionBasedForward => 2,
            TokenKind::Certificate => 3,
            TokenKind::PropertyForward => 4,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Absolute, generation-based or consumption-based forward
    pub const fn is_plain_forward(&self) -> bool {
        matches!(
            self,
            TokenKind::AbsoluteForward
                | TokenKind::GenerationBasedForward
                | TokenKind::ConsumptionBasedForward
        )
    }

    pub const fn is_forward(&self) -> bool {
        !matches!(self, TokenKind::Certificate)
    }

    pub const fn is_certificate(&self) -> bool {
        matches!(self, TokenKind::Certificate)
    }

    /// Claims a receiver must hold to receive tokens of this kind
    pub fn required_claims(&self) -> &'static [ClaimTopic] {
        match self {
            TokenKind::AbsoluteForward
            | TokenKind::GenerationBasedForward
            | TokenKind::PropertyForward => CLAIMS_FORWARD,
            TokenKind::ConsumptionBasedForward => CLAIMS_CONSUMPTION_FORWARD,
            TokenKind::Certificate => CLAIMS_CERTIFICATE,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenKind::AbsoluteForward => "AbsoluteForward",
            TokenKind::GenerationBasedForward => "GenerationBasedForward",
            TokenKind::ConsumptionBasedForward => "ConsumptionBasedForward",
            TokenKind::Certificate => "Certificate",
            TokenKind::PropertyForward => "PropertyForward",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded tag of a kind
pub fn token_kind_to_number(kind: TokenKind) -> u8 {
    kind.tag()
}

/// Kind encoded by a tag
pub fn number_to_token_kind(number: u8) -> TokenResult<TokenKind> {
    TokenKind::from_tag(number)
}

/// Kind of a token id; reads byte 0 only
pub fn token_kind_of(id: &TokenId) -> TokenResult<TokenKind> {
    TokenKind::from_tag(id.tag())
}
