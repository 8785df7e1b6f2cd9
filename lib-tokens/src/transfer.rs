//! Transfer Rules
//!
//! `LedgerState::transfer_leg` is the canonical way to move tokens between
//! holders; `LedgerState::admit` is the receiver-side subset shared with
//! mints.
//!
//! # Enforcement (in order)
//!
//! 1. `to` is not the zero address
//! 2. caller is `from` or an approved operator of `from`
//! 3. amount > 0
//! 4. a self-transfer needs an explicit self-approval
//! 5. `to` holds the claims required for the kind, or is an accepted distributor
//! 6. consent: a reception approval covering the amount, or the receiver hook
//! 7. plain forwards are frozen once generation is documented
//! 8. sufficient balance

use lib_claims::{AuthorizationOracle, CallContext};
use lib_types::{Address, Amount, Timestamp, TokenId};

use crate::approval::ApprovalKey;
use crate::errors::{TokenError, TokenResult};
use crate::kind::{token_kind_of, TokenKind};
use crate::ledger::LedgerState;

/// How the receiver agrees to receive tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Consent {
    /// A reception approval from the receiver, consumed by the amount
    ReceptionApproval,
    /// The receiver's hook is invoked after the leg is applied
    ReceiverHook,
}

impl LedgerState {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn transfer_leg(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        from: Address,
        to: Address,
        id: TokenId,
        amount: Amount,
        consent: Consent,
    ) -> TokenResult<()> {
        // =====================================================================
        // Check 1: Zero address
        // =====================================================================
        if to.is_zero() {
            return Err(TokenError::TransferToZeroAddress);
        }

        // =====================================================================
        // Check 2: Caller moves its own tokens or operates for `from`
        // =====================================================================
        if ctx.caller != from && !self.is_operator(&from, &ctx.caller) {
            return Err(TokenError::Unauthorized(
                "caller is neither holder nor approved operator".to_string(),
            ));
        }

        // =====================================================================
        // Check 3: Amount > 0
        // =====================================================================
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        // =====================================================================
        // Check 4: Self-transfer
        // =====================================================================
        let self_key = ApprovalKey {
            receiver: to,
            sender: from,
            token: id,
        };
        if from == to && !self.approvals.contains(&self_key) {
            return Err(TokenError::SelfTransferNotApproved(from));
        }

        // =====================================================================
        // Checks 5-6: Receiver claims and consent
        // =====================================================================
        let kind = token_kind_of(&id)?;
        self.admit(oracle, ctx.now, from, to, id, kind, amount, consent)?;

        // =====================================================================
        // Check 7: Settlement
        // =====================================================================
        if self.is_settled(&id) {
            return Err(TokenError::ForwardsSettled(id));
        }

        // =====================================================================
        // Check 8 + apply: Balance
        // =====================================================================
        self.debit(id, from, amount)?;
        self.credit(id, to, amount)
    }

    /// Receiver-side checks for `to` receiving `amount` of `id` from `sender`
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn admit(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        now: Timestamp,
        sender: Address,
        to: Address,
        id: TokenId,
        kind: TokenKind,
        amount: Amount,
        consent: Consent,
    ) -> TokenResult<()> {
        if to.is_zero() {
            return Err(TokenError::TransferToZeroAddress);
        }
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }

        let distributor = oracle.is_accepted_distributor(&to, now);
        if !distributor {
            if let Some(topic) = kind
                .required_claims()
                .iter()
                .find(|topic| !oracle.has_claim(&to, **topic, now))
            {
                return Err(TokenError::MissingClaim {
                    subject: to,
                    topic: *topic,
                });
            }
        }

        match consent {
            Consent::ReceptionApproval => {
                if distributor {
                    return Err(TokenError::ReceiverHookRequired(to));
                }
                let key = ApprovalKey {
                    receiver: to,
                    sender,
                    token: id,
                };
                self.approvals.consume(&key, amount, now)
            }
            // Only accepted distributors may consent through a hook
            Consent::ReceiverHook if distributor => Ok(()),
            Consent::ReceiverHook => Err(TokenError::Unauthorized(format!(
                "receiver {:?} is not an accepted distributor",
                to
            ))),
        }
    }
}
