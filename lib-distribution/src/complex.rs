//! Property-filtered distribution
//!
//! Certificate holders deposit certificates with the distributor through
//! the ledger's receiver hook, naming the property forward they are meant
//! for in the transfer data. The property family's plant then hands out
//! property forwards against those deposits, as long as the family's
//! criteria still hold for the plant that generated the certificates.

use std::collections::HashMap;

use lib_claims::{AuthorizationOracle, CallContext};
use lib_tokens::{
    criteria_hold, token_kind_of, EnergyToken, ForwardFamily, LedgerView, Receipt, TokenError,
    TokenKind, TokenReceiver, TokenResult,
};
use lib_types::{Address, Amount, TokenId};
use tracing::{info, warn};

use crate::errors::{DistributionError, DistributionResult};

#[derive(Debug, Clone)]
pub struct ComplexDistributor {
    address: Address,
    /// (property forward, certificate) -> deposited certificates not yet handed out
    available: HashMap<(TokenId, TokenId), Amount>,
}

impl ComplexDistributor {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            available: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn available(&self, forward: &TokenId, certificate: &TokenId) -> Amount {
        self.available
            .get(&(*forward, *certificate))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of undistributed deposits of `certificate` over all property families
    fn recorded_deposits(&self, certificate: &TokenId) -> DistributionResult<Amount> {
        self.available
            .iter()
            .filter(|((_, cert), _)| cert == certificate)
            .try_fold(0u128, |sum, (_, amount)| {
                sum.checked_add(*amount).ok_or(DistributionError::Overflow)
            })
    }

    fn registered_family<'a>(
        &self,
        ledger: &'a dyn LedgerView,
        forward: &TokenId,
    ) -> DistributionResult<&'a ForwardFamily> {
        match ledger.forward_family(forward) {
            Some(family)
                if family.kind == TokenKind::PropertyForward && family.distributor == self.address =>
            {
                Ok(family)
            }
            _ => Err(DistributionError::NotRegisteredDistributor(*forward)),
        }
    }

    /// Credit a certificate deposit to the property forward named in `data`
    fn accept_deposit(&mut self, ledger: &dyn LedgerView, receipt: &Receipt<'_>) -> DistributionResult<()> {
        if token_kind_of(&receipt.token())? != TokenKind::Certificate {
            return Err(DistributionError::InvalidDepositData(
                "only certificates can be deposited".to_string(),
            ));
        }
        let bytes: [u8; 32] = receipt.data().try_into().map_err(|_| {
            DistributionError::InvalidDepositData(format!(
                "expected a 32-byte property forward id, got {} bytes",
                receipt.data().len()
            ))
        })?;
        let forward = TokenId::new(bytes);

        let family = self.registered_family(ledger, &forward)?;
        let certificate = ledger
            .token_info(&receipt.token())
            .ok_or(TokenError::UnknownToken(receipt.token()))?;
        if certificate.period != family.period {
            return Err(DistributionError::InvalidDepositData(format!(
                "certificate period {} does not match forward period {}",
                certificate.period, family.period
            )));
        }

        let slot = self.available.entry((forward, receipt.token())).or_insert(0);
        *slot = slot.checked_add(receipt.amount()).ok_or(DistributionError::Overflow)?;
        info!(
            "Deposit of {} certificates {:?} for {:?} from {:?}",
            receipt.amount(),
            receipt.token(),
            forward,
            receipt.sender()
        );
        Ok(())
    }

    /// Hand out `amount` property forwards of `forward` to `recipient`,
    /// backed by deposited `certificate`s.
    ///
    /// The caller must be the property family's plant. The recipient needs
    /// a reception approval for this distributor on the property forward id.
    #[allow(clippy::too_many_arguments)]
    pub fn distribute(
        &mut self,
        ledger: &mut EnergyToken,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        recipient: Address,
        forward: TokenId,
        certificate: TokenId,
        amount: Amount,
    ) -> DistributionResult<()> {
        let family = self.registered_family(&*ledger, &forward)?;
        if ctx.caller != family.plant {
            return Err(DistributionError::Unauthorized(
                "only the property family's plant may distribute".to_string(),
            ));
        }

        let origin = match ledger.token_info(&certificate) {
            Some(info) if info.kind == TokenKind::Certificate => info.plant,
            _ => return Err(TokenError::UnknownToken(certificate).into()),
        };
        if !criteria_hold(&family.criteria, oracle, &origin, ctx.now) {
            return Err(DistributionError::CriteriaNotMet(origin));
        }

        let available = self.available(&forward, &certificate);
        if amount > available {
            return Err(DistributionError::InsufficientAvailable {
                available,
                requested: amount,
            });
        }

        // Deposits of this certificate across all property families must
        // still be held by the distributor
        let recorded = self.recorded_deposits(&certificate)?;
        let held = ledger.balance_of(&self.address, &certificate);
        if recorded > held {
            warn!(
                "Deposits of {:?} exceed custody: recorded {}, held {}",
                certificate, recorded, held
            );
            return Err(DistributionError::UnbackedDeposits { recorded, held });
        }

        let own = CallContext {
            caller: self.address,
            ..*ctx
        };
        ledger.mint_property_forwards(oracle, &own, forward, recipient, amount)?;

        // Checked above
        self.available.insert((forward, certificate), available - amount);
        info!(
            "Distributed {} property forwards {:?} to {:?} against {:?}",
            amount, forward, recipient, certificate
        );
        Ok(())
    }
}

impl TokenReceiver for ComplexDistributor {
    fn receiver_address(&self) -> Address {
        self.address
    }

    fn on_token_received(&mut self, ledger: &dyn LedgerView, receipt: &Receipt<'_>) -> TokenResult<()> {
        self.accept_deposit(ledger, receipt).map_err(|e| {
            warn!("Rejected deposit of {:?}: {}", receipt.token(), e);
            match e {
                DistributionError::Token(inner) => inner,
                other => TokenError::ReceiverRejected(other.to_string()),
            }
        })
    }
}
