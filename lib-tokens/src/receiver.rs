//! Receiver hook
//!
//! Accepted distributors do not grant reception approvals. They consent to
//! incoming tokens through [`TokenReceiver::on_token_received`], which the
//! ledger calls as the last step of `safe_transfer_to_receiver`. Returning
//! an error reverts the transfer.

use lib_types::{Address, Amount, BalancePeriod, Timestamp, TokenId};

use crate::documentation::{EnergyDirection, EnergyDocumentation};
use crate::errors::TokenResult;
use crate::forwards::{ForwardFamily, TokenInfo};

/// Read-only view of the ledger
pub trait LedgerView {
    fn balance_of(&self, holder: &Address, id: &TokenId) -> Amount;

    fn forward_family(&self, id: &TokenId) -> Option<&ForwardFamily>;

    fn token_info(&self, id: &TokenId) -> Option<&TokenInfo>;

    fn energy_documentation(
        &self,
        plant: &Address,
        period: BalancePeriod,
        direction: EnergyDirection,
    ) -> Option<&EnergyDocumentation>;
}

/// Details of an incoming transfer
///
/// Only the ledger builds receipts, so a receiver can rely on every receipt
/// it sees describing units that were actually moved to it.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    operator: Address,
    from: Address,
    token: TokenId,
    amount: Amount,
    data: &'a [u8],
    now: Timestamp,
}

impl<'a> Receipt<'a> {
    pub(crate) fn new(
        operator: Address,
        from: Address,
        token: TokenId,
        amount: Amount,
        data: &'a [u8],
        now: Timestamp,
    ) -> Self {
        Self {
            operator,
            from,
            token,
            amount,
            data,
            now,
        }
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    /// Previous holder of the units
    pub fn sender(&self) -> Address {
        self.from
    }

    pub fn token(&self) -> TokenId {
        self.token
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Auxiliary data supplied by the sender
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }
}

pub trait TokenReceiver {
    /// Ledger address of the receiver
    fn receiver_address(&self) -> Address;

    /// Accept or reject tokens. `ledger` already reflects the transfer.
    fn on_token_received(&mut self, ledger: &dyn LedgerView, receipt: &Receipt<'_>) -> TokenResult<()>;
}
