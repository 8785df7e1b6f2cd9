//! Ledger Events
//!
//! Emitted on family creation, approval updates, transfers, mints, burns
//! and energy documentation. Each event carries the full token id and
//! amount for off-chain reconciliation. Mints have `from` = zero, burns
//! have `to` = zero.

use std::fmt;

use lib_types::{Address, Amount, BalancePeriod, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

use crate::documentation::EnergyDirection;
use crate::kind::TokenKind;

// ============================================================================
// EVENT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A forward family was registered
    ForwardsCreated {
        token: TokenId,
        kind: TokenKind,
        period: BalancePeriod,
        plant: Address,
        distributor: Address,
    },

    /// A receiver set a reception approval
    ReceptionApproval {
        receiver: Address,
        sender: Address,
        token: TokenId,
        expiry: Timestamp,
        amount: Amount,
    },

    TransferSingle {
        operator: Address,
        from: Address,
        to: Address,
        token: TokenId,
        amount: Amount,
    },

    TransferBatch {
        operator: Address,
        from: Address,
        to: Address,
        tokens: Vec<TokenId>,
        amounts: Vec<Amount>,
    },

    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },

    /// Measured energy recorded (or corrected) for a plant and period
    EnergyDocumented {
        plant: Address,
        period: BalancePeriod,
        direction: EnergyDirection,
        value: Amount,
        authority: Address,
    },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::ForwardsCreated { token, kind, period, .. } => {
                write!(f, "ForwardsCreated({} {} period={})", kind, short(token), period)
            }
            LedgerEvent::ReceptionApproval { token, amount, expiry, .. } => {
                write!(f, "ReceptionApproval({} amount={} expiry={})", short(token), amount, expiry)
            }
            LedgerEvent::TransferSingle { token, amount, .. } => {
                write!(f, "TransferSingle({} amount={})", short(token), amount)
            }
            LedgerEvent::TransferBatch { tokens, .. } => {
                write!(f, "TransferBatch(legs={})", tokens.len())
            }
            LedgerEvent::ApprovalForAll { approved, .. } => {
                write!(f, "ApprovalForAll(approved={})", approved)
            }
            LedgerEvent::EnergyDocumented { period, direction, value, .. } => {
                write!(f, "EnergyDocumented({:?} period={} value={})", direction, period, value)
            }
        }
    }
}

fn short(token: &TokenId) -> String {
    hex::encode(&token.as_bytes()[..8])
}
