//! Reception Approvals
//!
//! A receiver grants a specific sender the right to move up to `remaining`
//! units of one token id to it, until `expiry`. Each transfer consumes
//! exactly its amount; the allowance is never unlimited.

use std::collections::HashMap;

use lib_types::{Address, Amount, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

use crate::errors::{TokenError, TokenResult};

/// Key of a reception approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalKey {
    pub receiver: Address,
    pub sender: Address,
    pub token: TokenId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionApproval {
    /// Last second the approval may be used
    pub expiry: Timestamp,
    pub remaining: Amount,
}

#[derive(Debug, Clone, Default)]
pub struct ReceptionApprovals {
    entries: HashMap<ApprovalKey, ReceptionApproval>,
}

impl ReceptionApprovals {
    /// Overwrite the approval for `key`
    pub fn set(&mut self, key: ApprovalKey, approval: ReceptionApproval) {
        self.entries.insert(key, approval);
    }

    pub fn get(&self, key: &ApprovalKey) -> Option<ReceptionApproval> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &ApprovalKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Check that the approval covers `amount` at `now` and consume it
    pub fn consume(&mut self, key: &ApprovalKey, amount: Amount, now: Timestamp) -> TokenResult<()> {
        let approval = self
            .entries
            .get_mut(key)
            .ok_or(TokenError::ReceptionNotApproved {
                receiver: key.receiver,
                sender: key.sender,
                token: key.token,
            })?;

        if now > approval.expiry {
            return Err(TokenError::ReceptionApprovalExpired {
                expiry: approval.expiry,
                now,
            });
        }
        if approval.remaining < amount {
            return Err(TokenError::InsufficientReceptionApproval {
                remaining: approval.remaining,
                need: amount,
            });
        }

        approval.remaining -= amount;
        Ok(())
    }
}
