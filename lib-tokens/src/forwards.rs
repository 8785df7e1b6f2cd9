//! Forward / Certificate Lifecycle
//!
//! Per family: `Uncreated -> Created -> (Minted)* -> Documented ->
//! (Distributed)*`. Creation happens exactly once. Plants mint plain
//! forwards until generation is documented. Certificates and property
//! forwards are minted only by the family's registered distributor.

use lib_claims::{AuthorizationOracle, CallContext, ClaimTopic};
use lib_types::{Address, Amount, BalancePeriod, LedgerConfig, TokenId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::criteria::{get_criteria_hash, Criterion};
use crate::documentation::EnergyDirection;
use crate::errors::{TokenError, TokenResult};
use crate::events::LedgerEvent;
use crate::kind::{token_kind_of, TokenKind};
use crate::ledger::{EnergyToken, LedgerState};
use crate::token_id::{get_certificate_token_id, get_token_id, ZERO_DISCRIMINATOR};
use crate::transfer::Consent;

// ============================================================================
// TYPES
// ============================================================================

/// Registered forward family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardFamily {
    pub token: TokenId,
    pub kind: TokenKind,
    pub period: BalancePeriod,
    /// Issuing plant
    pub plant: Address,
    pub distributor: Address,
    pub total_minted: Amount,
    /// Certificates minted against this family's documented generation
    pub certificates_issued: Amount,
    /// Property forwards only
    pub criteria: Vec<Criterion>,
}

impl ForwardFamily {
    /// Certificate counterpart of a plain forward family
    pub fn certificate_id(&self) -> TokenId {
        get_certificate_token_id(self.period, &self.plant)
    }
}

/// Kind, period and plant of an id issued by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub kind: TokenKind,
    pub period: BalancePeriod,
    pub plant: Address,
}

// ============================================================================
// CREATION
// ============================================================================

/// Claims a caller must hold to issue forwards
pub const ISSUER_CLAIMS: &[ClaimTopic] = &[ClaimTopic::EXISTENCE, ClaimTopic::MAX_POWER_GENERATION];

impl LedgerState {
    #[allow(clippy::too_many_arguments)]
    fn register_family(
        &mut self,
        config: &LedgerConfig,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        kind: TokenKind,
        period: BalancePeriod,
        distributor: Address,
        criteria: Vec<Criterion>,
    ) -> TokenResult<TokenId> {
        let plant = ctx.caller;
        let clock = &config.balance_period;

        if !clock.is_period_start(period) || ctx.now >= clock.period_end(period) {
            return Err(TokenError::InvalidBalancePeriod(period));
        }
        if let Some(topic) = ISSUER_CLAIMS
            .iter()
            .find(|topic| !oracle.has_claim(&plant, **topic, ctx.now))
        {
            return Err(TokenError::MissingClaim {
                subject: plant,
                topic: *topic,
            });
        }
        if !oracle.is_accepted_distributor(&distributor, ctx.now) {
            return Err(TokenError::DistributorNotAccepted(distributor));
        }

        let discriminator = if kind == TokenKind::PropertyForward {
            get_criteria_hash(&criteria)
        } else {
            ZERO_DISCRIMINATOR
        };
        let id = get_token_id(kind, period, &plant, &discriminator);

        if self.families.contains_key(&id) {
            return Err(TokenError::ForwardsAlreadyCreated(id));
        }
        if kind.is_plain_forward() {
            if let Some(existing) = self.plain_families.get(&(plant, period)) {
                return Err(TokenError::ForwardsAlreadyCreated(*existing));
            }
            self.plain_families.insert((plant, period), id);
        }

        self.families.insert(
            id,
            ForwardFamily {
                token: id,
                kind,
                period,
                plant,
                distributor,
                total_minted: 0,
                certificates_issued: 0,
                criteria,
            },
        );
        self.tokens.insert(id, TokenInfo { kind, period, plant });
        self.emit(LedgerEvent::ForwardsCreated {
            token: id,
            kind,
            period,
            plant,
            distributor,
        });
        Ok(id)
    }

    /// Family whose registered distributor is the caller
    fn distributor_family(
        &self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        id: &TokenId,
    ) -> TokenResult<ForwardFamily> {
        let family = self
            .families
            .get(id)
            .ok_or(TokenError::UnknownForwardFamily(*id))?;
        if ctx.caller != family.distributor {
            return Err(TokenError::Unauthorized(
                "caller is not the family's distributor".to_string(),
            ));
        }
        if !oracle.is_accepted_distributor(&ctx.caller, ctx.now) {
            return Err(TokenError::DistributorNotAccepted(ctx.caller));
        }
        Ok(family.clone())
    }
}

impl EnergyToken {
    /// Register a plain forward family for the caller's plant
    pub fn create_forwards(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        period: BalancePeriod,
        kind: TokenKind,
        distributor: Address,
    ) -> TokenResult<TokenId> {
        if !kind.is_plain_forward() {
            return Err(TokenError::InvalidTokenKind(kind));
        }
        let id = self.transact(|state, config| {
            state.register_family(config, oracle, ctx, kind, period, distributor, Vec::new())
        })?;
        info!(
            "Created {} family {:?} for plant {:?} period {}",
            kind, id, ctx.caller, period
        );
        Ok(id)
    }

    /// Register a property forward family gated by `criteria`
    pub fn create_property_forwards(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        period: BalancePeriod,
        distributor: Address,
        criteria: Vec<Criterion>,
    ) -> TokenResult<TokenId> {
        let count = criteria.len();
        let id = self.transact(|state, config| {
            state.register_family(
                config,
                oracle,
                ctx,
                TokenKind::PropertyForward,
                period,
                distributor,
                criteria,
            )
        })?;
        info!(
            "Created property family {:?} ({} criteria) for plant {:?} period {}",
            id, count, ctx.caller, period
        );
        Ok(id)
    }

    // ========================================================================
    // MINTING
    // ========================================================================

    /// Plant mints plain forwards of its own family
    pub fn mint(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        id: TokenId,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> TokenResult<()> {
        if recipients.len() != amounts.len() {
            return Err(TokenError::LengthMismatch {
                left: recipients.len(),
                right: amounts.len(),
            });
        }
        let kind = token_kind_of(&id)?;
        if !kind.is_plain_forward() {
            return Err(TokenError::Unauthorized(format!(
                "{} tokens are minted by distributors",
                kind
            )));
        }

        let total = self.transact(|state, _| {
            let family = state
                .families
                .get(&id)
                .ok_or(TokenError::UnknownForwardFamily(id))?
                .clone();
            if ctx.caller != family.plant {
                return Err(TokenError::Unauthorized(
                    "only the issuing plant may mint forwards".to_string(),
                ));
            }
            if state.is_settled(&id) {
                return Err(TokenError::ForwardsSettled(id));
            }

            let mut total: Amount = 0;
            for (recipient, amount) in recipients.iter().zip(amounts) {
                state.admit(
                    oracle,
                    ctx.now,
                    family.plant,
                    *recipient,
                    id,
                    kind,
                    *amount,
                    Consent::ReceptionApproval,
                )?;
                state.issue(id, *recipient, *amount)?;
                state.emit(LedgerEvent::TransferSingle {
                    operator: ctx.caller,
                    from: Address::zero(),
                    to: *recipient,
                    token: id,
                    amount: *amount,
                });
                total = total.checked_add(*amount).ok_or(TokenError::Overflow)?;
            }

            let family = state
                .families
                .get_mut(&id)
                .ok_or(TokenError::UnknownForwardFamily(id))?;
            family.total_minted = family
                .total_minted
                .checked_add(total)
                .ok_or(TokenError::Overflow)?;
            Ok(total)
        })?;

        info!("Minted {} of {:?} to {} recipients", total, id, recipients.len());
        Ok(())
    }

    /// Distributor mints certificates against a plain family's documented
    /// generation. With `enforce_reception` the recipient must hold the
    /// certificate claims and a reception approval for the distributor.
    ///
    /// Total certificates per family never exceed the documented generation.
    pub fn mint_certificates(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        forward_id: TokenId,
        recipient: Address,
        amount: Amount,
        enforce_reception: bool,
    ) -> TokenResult<TokenId> {
        let certificate = self.transact(|state, _| {
            let family = state.distributor_family(oracle, ctx, &forward_id)?;
            if !family.kind.is_plain_forward() {
                return Err(TokenError::InvalidTokenKind(family.kind));
            }

            let documented = state
                .documentation
                .get(&family.plant, family.period, EnergyDirection::Generation)
                .map(|doc| doc.value)
                .ok_or(TokenError::NoGenerationDocumented(forward_id))?;
            let issued = family
                .certificates_issued
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            if issued > documented {
                return Err(TokenError::CertificatesExceedGeneration {
                    documented,
                    requested: issued,
                });
            }

            let certificate = family.certificate_id();
            if recipient.is_zero() {
                return Err(TokenError::TransferToZeroAddress);
            }
            if amount == 0 {
                return Err(TokenError::ZeroAmount);
            }
            if enforce_reception {
                state.admit(
                    oracle,
                    ctx.now,
                    ctx.caller,
                    recipient,
                    certificate,
                    TokenKind::Certificate,
                    amount,
                    Consent::ReceptionApproval,
                )?;
            }

            state.issue(certificate, recipient, amount)?;
            state.tokens.entry(certificate).or_insert(TokenInfo {
                kind: TokenKind::Certificate,
                period: family.period,
                plant: family.plant,
            });
            if let Some(stored) = state.families.get_mut(&forward_id) {
                stored.certificates_issued = issued;
            }
            state.emit(LedgerEvent::TransferSingle {
                operator: ctx.caller,
                from: Address::zero(),
                to: recipient,
                token: certificate,
                amount,
            });
            Ok(certificate)
        })?;

        info!(
            "Minted {} certificates {:?} to {:?} for family {:?}",
            amount, certificate, recipient, forward_id
        );
        Ok(certificate)
    }

    /// Distributor mints property forwards of a family registered to it
    pub fn mint_property_forwards(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        property_id: TokenId,
        recipient: Address,
        amount: Amount,
    ) -> TokenResult<()> {
        self.transact(|state, _| {
            let family = state.distributor_family(oracle, ctx, &property_id)?;
            if family.kind != TokenKind::PropertyForward {
                return Err(TokenError::InvalidTokenKind(family.kind));
            }

            state.admit(
                oracle,
                ctx.now,
                ctx.caller,
                recipient,
                property_id,
                TokenKind::PropertyForward,
                amount,
                Consent::ReceptionApproval,
            )?;
            state.issue(property_id, recipient, amount)?;
            if let Some(stored) = state.families.get_mut(&property_id) {
                stored.total_minted = stored
                    .total_minted
                    .checked_add(amount)
                    .ok_or(TokenError::Overflow)?;
            }
            state.emit(LedgerEvent::TransferSingle {
                operator: ctx.caller,
                from: Address::zero(),
                to: recipient,
                token: property_id,
                amount,
            });
            Ok(())
        })?;

        info!(
            "Minted {} property forwards {:?} to {:?}",
            amount, property_id, recipient
        );
        Ok(())
    }
}
