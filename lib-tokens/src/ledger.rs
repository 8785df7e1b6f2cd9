//! Energy Token Ledger
//!
//! Multi-asset balance store for forwards and certificates.
//!
//! # Atomicity
//!
//! Every mutating operation runs against a staged copy of [`LedgerState`]
//! that replaces the live state only when the operation returns `Ok`.
//! Balances, approvals, families, documentation and events are therefore
//! untouched by a failed call.
//!
//! # Caller identity
//!
//! The caller always comes from the [`CallContext`], never from a parameter.
//! Claims questions go to the [`AuthorizationOracle`] passed to each call.

use std::collections::{HashMap, HashSet};

use lib_claims::{AuthorizationOracle, CallContext};
use lib_types::{Address, Amount, BalancePeriod, LedgerConfig, Timestamp, TokenId};
use tracing::debug;

use crate::approval::{ApprovalKey, ReceptionApproval, ReceptionApprovals};
use crate::documentation::{DocumentationStore, EnergyDirection, EnergyDocumentation};
use crate::errors::{TokenError, TokenResult};
use crate::events::LedgerEvent;
use crate::forwards::{ForwardFamily, TokenInfo};
use crate::kind::TokenKind;
use crate::receiver::{LedgerView, Receipt, TokenReceiver};
use crate::transfer::Consent;

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub(crate) struct LedgerState {
    pub(crate) balances: HashMap<(TokenId, Address), Amount>,
    pub(crate) supply: HashMap<TokenId, Amount>,
    pub(crate) approvals: ReceptionApprovals,
    /// (owner, operator)
    pub(crate) operators: HashSet<(Address, Address)>,
    pub(crate) families: HashMap<TokenId, ForwardFamily>,
    /// At most one plain forward family per (plant, period)
    pub(crate) plain_families: HashMap<(Address, BalancePeriod), TokenId>,
    pub(crate) tokens: HashMap<TokenId, TokenInfo>,
    pub(crate) documentation: DocumentationStore,
    pub(crate) events: Vec<LedgerEvent>,
}

impl LedgerState {
    pub(crate) fn balance(&self, id: &TokenId, holder: &Address) -> Amount {
        self.balances.get(&(*id, *holder)).copied().unwrap_or(0)
    }

    pub(crate) fn credit(&mut self, id: TokenId, holder: Address, amount: Amount) -> TokenResult<()> {
        let balance = self.balances.entry((id, holder)).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, id: TokenId, holder: Address, amount: Amount) -> TokenResult<()> {
        let have = self.balance(&id, &holder);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        // Checked above
        let remaining = have - amount;
        if remaining == 0 {
            self.balances.remove(&(id, holder));
        } else {
            self.balances.insert((id, holder), remaining);
        }
        Ok(())
    }

    /// Credit newly created units and grow the supply
    pub(crate) fn issue(&mut self, id: TokenId, to: Address, amount: Amount) -> TokenResult<()> {
        self.credit(id, to, amount)?;
        let supply = self.supply.entry(id).or_insert(0);
        *supply = supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Destroy units and shrink the supply
    pub(crate) fn retire(&mut self, id: TokenId, from: Address, amount: Amount) -> TokenResult<()> {
        self.debit(id, from, amount)?;
        let supply = self.supply.entry(id).or_insert(0);
        *supply = supply.checked_sub(amount).ok_or(TokenError::Underflow)?;
        Ok(())
    }

    pub(crate) fn is_operator(&self, owner: &Address, operator: &Address) -> bool {
        self.operators.contains(&(*owner, *operator))
    }

    /// Plain forwards stop moving once their plant's generation is documented
    pub(crate) fn is_settled(&self, id: &TokenId) -> bool {
        match self.tokens.get(id) {
            Some(info) if info.kind.is_plain_forward() => self
                .documentation
                .get(&info.plant, info.period, EnergyDirection::Generation)
                .is_some(),
            _ => false,
        }
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }
}

impl LedgerView for LedgerState {
    fn balance_of(&self, holder: &Address, id: &TokenId) -> Amount {
        self.balance(id, holder)
    }

    fn forward_family(&self, id: &TokenId) -> Option<&ForwardFamily> {
        self.families.get(id)
    }

    fn token_info(&self, id: &TokenId) -> Option<&TokenInfo> {
        self.tokens.get(id)
    }

    fn energy_documentation(
        &self,
        plant: &Address,
        period: BalancePeriod,
        direction: EnergyDirection,
    ) -> Option<&EnergyDocumentation> {
        self.documentation.get(plant, period, direction)
    }
}

// ============================================================================
// LEDGER
// ============================================================================

/// The energy token ledger
#[derive(Debug, Clone, Default)]
pub struct EnergyToken {
    config: LedgerConfig,
    state: LedgerState,
}

impl EnergyToken {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            state: LedgerState::default(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Balance period containing `timestamp` under this ledger's clock
    pub fn balance_period(&self, timestamp: Timestamp) -> BalancePeriod {
        self.config.balance_period.balance_period(timestamp)
    }

    /// Run `op` on a staged copy of the state; commit only on success
    pub(crate) fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut LedgerState, &LedgerConfig) -> TokenResult<T>,
    ) -> TokenResult<T> {
        let mut staged = self.state.clone();
        let out = op(&mut staged, &self.config)?;
        self.state = staged;
        Ok(out)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn balance_of(&self, holder: &Address, id: &TokenId) -> Amount {
        self.state.balance(id, holder)
    }

    pub fn balance_of_batch(&self, holders: &[Address], ids: &[TokenId]) -> TokenResult<Vec<Amount>> {
        if holders.len() != ids.len() {
            return Err(TokenError::LengthMismatch {
                left: holders.len(),
                right: ids.len(),
            });
        }
        Ok(holders
            .iter()
            .zip(ids)
            .map(|(holder, id)| self.state.balance(id, holder))
            .collect())
    }

    pub fn total_supply(&self, id: &TokenId) -> Amount {
        self.state.supply.get(id).copied().unwrap_or(0)
    }

    pub fn reception_approval(
        &self,
        receiver: &Address,
        sender: &Address,
        id: &TokenId,
    ) -> Option<ReceptionApproval> {
        self.state.approvals.get(&ApprovalKey {
            receiver: *receiver,
            sender: *sender,
            token: *id,
        })
    }

    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.state.is_operator(owner, operator)
    }

    pub fn forward_family(&self, id: &TokenId) -> Option<&ForwardFamily> {
        self.state.families.get(id)
    }

    pub fn token_info(&self, id: &TokenId) -> Option<&TokenInfo> {
        self.state.tokens.get(id)
    }

    pub fn energy_documentation(
        &self,
        plant: &Address,
        period: BalancePeriod,
        direction: EnergyDirection,
    ) -> Option<&EnergyDocumentation> {
        self.state.documentation.get(plant, period, direction)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.state.events
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.state.events)
    }

    // ========================================================================
    // Approvals
    // ========================================================================

    /// Allow `sender` to move up to `amount` of `id` to the caller until `expiry`.
    /// Overwrites any previous approval for the same (sender, id).
    pub fn approve_sender(
        &mut self,
        ctx: &CallContext,
        sender: Address,
        expiry: Timestamp,
        amount: Amount,
        id: TokenId,
    ) {
        let receiver = ctx.caller;
        self.state.approvals.set(
            ApprovalKey {
                receiver,
                sender,
                token: id,
            },
            ReceptionApproval {
                expiry,
                remaining: amount,
            },
        );
        self.state.emit(LedgerEvent::ReceptionApproval {
            receiver,
            sender,
            token: id,
            expiry,
            amount,
        });
        debug!("{:?} approved {} of {:?} from {:?}", receiver, amount, id, sender);
    }

    pub fn approve_batch_sender(
        &mut self,
        ctx: &CallContext,
        sender: Address,
        expiry: Timestamp,
        amounts: &[Amount],
        ids: &[TokenId],
    ) -> TokenResult<()> {
        if amounts.len() != ids.len() {
            return Err(TokenError::LengthMismatch {
                left: amounts.len(),
                right: ids.len(),
            });
        }
        for (amount, id) in amounts.iter().zip(ids) {
            self.approve_sender(ctx, sender, expiry, *amount, *id);
        }
        Ok(())
    }

    /// Let `operator` move all of the caller's tokens
    pub fn set_approval_for_all(
        &mut self,
        ctx: &CallContext,
        operator: Address,
        approved: bool,
    ) -> TokenResult<()> {
        let owner = ctx.caller;
        if operator == owner {
            return Err(TokenError::Unauthorized(
                "cannot set approval status for self".to_string(),
            ));
        }
        if approved {
            self.state.operators.insert((owner, operator));
        } else {
            self.state.operators.remove(&(owner, operator));
        }
        self.state.emit(LedgerEvent::ApprovalForAll {
            owner,
            operator,
            approved,
        });
        Ok(())
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    pub fn safe_transfer_from(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        from: Address,
        to: Address,
        id: TokenId,
        amount: Amount,
    ) -> TokenResult<()> {
        self.transact(|state, _| {
            state.transfer_leg(oracle, ctx, from, to, id, amount, Consent::ReceptionApproval)?;
            state.emit(LedgerEvent::TransferSingle {
                operator: ctx.caller,
                from,
                to,
                token: id,
                amount,
            });
            Ok(())
        })?;
        debug!("Transferred {} of {:?} from {:?} to {:?}", amount, id, from, to);
        Ok(())
    }

    /// Transfer several ids at once; any failing leg reverts the whole batch
    pub fn safe_batch_transfer_from(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        from: Address,
        to: Address,
        ids: &[TokenId],
        amounts: &[Amount],
    ) -> TokenResult<()> {
        if ids.len() != amounts.len() {
            return Err(TokenError::LengthMismatch {
                left: ids.len(),
                right: amounts.len(),
            });
        }
        self.transact(|state, _| {
            for (id, amount) in ids.iter().zip(amounts) {
                state.transfer_leg(oracle, ctx, from, to, *id, *amount, Consent::ReceptionApproval)?;
            }
            state.emit(LedgerEvent::TransferBatch {
                operator: ctx.caller,
                from,
                to,
                tokens: ids.to_vec(),
                amounts: amounts.to_vec(),
            });
            Ok(())
        })?;
        debug!("Batch transferred {} legs from {:?} to {:?}", ids.len(), from, to);
        Ok(())
    }

    /// Transfer to a component that consents through its receiver hook
    /// instead of a reception approval. The hook runs last, on the staged
    /// state; if it rejects, nothing is applied.
    #[allow(clippy::too_many_arguments)]
    pub fn safe_transfer_to_receiver(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        from: Address,
        receiver: &mut dyn TokenReceiver,
        id: TokenId,
        amount: Amount,
        data: &[u8],
    ) -> TokenResult<()> {
        let to = receiver.receiver_address();
        self.transact(|state, _| {
            state.transfer_leg(oracle, ctx, from, to, id, amount, Consent::ReceiverHook)?;
            state.emit(LedgerEvent::TransferSingle {
                operator: ctx.caller,
                from,
                to,
                token: id,
                amount,
            });
            let receipt = Receipt::new(ctx.caller, from, id, amount, data, ctx.now);
            receiver.on_token_received(&*state, &receipt)
        })?;
        debug!("Transferred {} of {:?} from {:?} to receiver {:?}", amount, id, from, to);
        Ok(())
    }

    /// Redeem certificates
    pub fn burn(
        &mut self,
        ctx: &CallContext,
        holder: Address,
        id: TokenId,
        amount: Amount,
    ) -> TokenResult<()> {
        let kind = crate::kind::token_kind_of(&id)?;
        if kind != TokenKind::Certificate {
            return Err(TokenError::InvalidTokenKind(kind));
        }
        self.transact(|state, _| {
            if ctx.caller != holder && !state.is_operator(&holder, &ctx.caller) {
                return Err(TokenError::Unauthorized(
                    "caller is neither holder nor approved operator".to_string(),
                ));
            }
            if amount == 0 {
                return Err(TokenError::ZeroAmount);
            }
            state.retire(id, holder, amount)?;
            state.emit(LedgerEvent::TransferSingle {
                operator: ctx.caller,
                from: holder,
                to: Address::zero(),
                token: id,
                amount,
            });
            Ok(())
        })?;
        debug!("Redeemed {} of {:?} held by {:?}", amount, id, holder);
        Ok(())
    }
}

impl LedgerView for EnergyToken {
    fn balance_of(&self, holder: &Address, id: &TokenId) -> Amount {
        self.state.balance_of(holder, id)
    }

    fn forward_family(&self, id: &TokenId) -> Option<&ForwardFamily> {
        self.state.forward_family(id)
    }

    fn token_info(&self, id: &TokenId) -> Option<&TokenInfo> {
        LedgerView::token_info(&self.state, id)
    }

    fn energy_documentation(
        &self,
        plant: &Address,
        period: BalancePeriod,
        direction: EnergyDirection,
    ) -> Option<&EnergyDocumentation> {
        self.state.documentation.get(plant, period, direction)
    }
}
