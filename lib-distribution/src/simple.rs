use std::collections::{HashMap, HashSet};

use lib_claims::{AuthorizationOracle, CallContext};
use lib_tokens::{
    token_kind_of, EnergyDirection, EnergyToken, ForwardFamily, TokenError, TokenKind,
};
use lib_types::{Address, Amount, TokenId};
use tracing::{debug, info};

use crate::errors::{DistributionError, DistributionResult};

/// Certificate entitlement of a holder of `balance` forward units
///
/// With documented generation `generation` and minted supply `supply`:
/// - AbsoluteForward: `min(b, floor(b * G / S))`
/// - GenerationBasedForward: `floor(b * G / S)`
/// - ConsumptionBasedForward: `min(floor(b * G / S), consumption)`
pub fn entitlement(
    kind: TokenKind,
    balance: Amount,
    generation: Amount,
    supply: Amount,
    consumption: Option<Amount>,
) -> DistributionResult<Amount> {
    if supply == 0 {
        return Ok(0);
    }
    let share = balance
        .checked_mul(generation)
        .ok_or(DistributionError::Overflow)?
        / supply;

    match kind {
        TokenKind::AbsoluteForward => Ok(share.min(balance)),
        TokenKind::GenerationBasedForward => Ok(share),
        TokenKind::ConsumptionBasedForward => Ok(share.min(consumption.unwrap_or(0))),
        other => Err(TokenError::InvalidTokenKind(other).into()),
    }
}

/// Pro-rata certificate distributor for plain forward families
///
/// **Roles:**
/// - Converts a family's documented generation into certificates for its
///   forward holders, in proportion to their holdings
/// - Returns undistributed entitlement to the issuing plant as surplus
///
/// **Invariants:**
/// - Marginal accounting: a holder is only ever minted
///   `entitlement - credited`, so repeating a call mints nothing
/// - Bookkeeping is written only after the ledger mint succeeded
/// - All arithmetic is checked
#[derive(Debug, Clone)]
pub struct SimpleDistributor {
    /// Ledger address of this distributor
    address: Address,

    /// (forward, holder) -> certificates minted so far
    credited: HashMap<(TokenId, Address), Amount>,

    /// forward -> sum of `credited` over holders
    credited_total: HashMap<TokenId, Amount>,

    /// forward -> holders that have distributed at least once
    settled_holders: HashMap<TokenId, HashSet<Address>>,

    /// forward -> forward units held by `settled_holders`
    settled_units: HashMap<TokenId, Amount>,

    /// forward -> surplus already minted to the plant
    surplus_withdrawn: HashMap<TokenId, Amount>,
}

impl SimpleDistributor {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            credited: HashMap::new(),
            credited_total: HashMap::new(),
            settled_holders: HashMap::new(),
            settled_units: HashMap::new(),
            surplus_withdrawn: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn credited(&self, forward: &TokenId, holder: &Address) -> Amount {
        self.credited.get(&(*forward, *holder)).copied().unwrap_or(0)
    }

    pub fn surplus_withdrawn(&self, forward: &TokenId) -> Amount {
        self.surplus_withdrawn.get(forward).copied().unwrap_or(0)
    }

    /// Context for calls this distributor makes to the ledger
    fn own_context(&self, ctx: &CallContext) -> CallContext {
        CallContext {
            caller: self.address,
            ..*ctx
        }
    }

    fn registered_family(&self, ledger: &EnergyToken, forward: &TokenId) -> DistributionResult<ForwardFamily> {
        match ledger.forward_family(forward) {
            Some(family) if family.distributor == self.address && family.kind.is_plain_forward() => {
                Ok(family.clone())
            }
            _ => Err(DistributionError::NotRegisteredDistributor(*forward)),
        }
    }

    fn documented(
        ledger: &EnergyToken,
        plant: &Address,
        family: &ForwardFamily,
        direction: EnergyDirection,
    ) -> DistributionResult<Amount> {
        ledger
            .energy_documentation(plant, family.period, direction)
            .map(|doc| doc.value)
            .ok_or(DistributionError::NotDocumented {
                plant: *plant,
                period: family.period,
                direction,
            })
    }

    // ========================================================================
    // DISTRIBUTION
    // ========================================================================

    /// Mint `recipient`'s not-yet-credited certificate entitlement.
    ///
    /// Absolute and consumption-based families require the recipient's
    /// reception approval for this distributor on the certificate id.
    ///
    /// # Returns
    /// The number of certificates minted (0 when nothing new is due)
    pub fn distribute(
        &mut self,
        ledger: &mut EnergyToken,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        recipient: Address,
        forward: TokenId,
    ) -> DistributionResult<Amount> {
        let family = self.registered_family(ledger, &forward)?;
        let generation = Self::documented(ledger, &family.plant, &family, EnergyDirection::Generation)?;
        let consumption = if family.kind == TokenKind::ConsumptionBasedForward {
            Some(Self::documented(ledger, &recipient, &family, EnergyDirection::Consumption)?)
        } else {
            None
        };

        let balance = ledger.balance_of(&recipient, &forward);
        let due = entitlement(family.kind, balance, generation, family.total_minted, consumption)?;
        let already = self.credited(&forward, &recipient);
        let amount = due.saturating_sub(already);

        if amount > 0 {
            let gated = family.kind != TokenKind::GenerationBasedForward;
            ledger.mint_certificates(oracle, &self.own_context(ctx), forward, recipient, amount, gated)?;
        }

        // Ledger call succeeded; record
        let credited = already.checked_add(amount).ok_or(DistributionError::Overflow)?;
        let total = self
            .credited_total
            .get(&forward)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(DistributionError::Overflow)?;
        let first_time = !self
            .settled_holders
            .get(&forward)
            .map_or(false, |holders| holders.contains(&recipient));
        let settled = if first_time {
            self.settled_units
                .get(&forward)
                .copied()
                .unwrap_or(0)
                .checked_add(balance)
                .ok_or(DistributionError::Overflow)?
        } else {
            self.settled_units.get(&forward).copied().unwrap_or(0)
        };

        self.credited.insert((forward, recipient), credited);
        self.credited_total.insert(forward, total);
        self.settled_units.insert(forward, settled);
        self.settled_holders.entry(forward).or_default().insert(recipient);

        if amount > 0 {
            info!(
                "Distributed {} certificates of {:?} to {:?} (entitled {})",
                amount, forward, recipient, due
            );
        } else {
            debug!("Nothing new to distribute for {:?} to {:?}", forward, recipient);
        }
        Ok(amount)
    }

    // ========================================================================
    // SURPLUS
    // ========================================================================

    /// Mint undistributed entitlement to the issuing plant.
    ///
    /// - AbsoluteForward: `G - min(G, S)`, available once documented
    /// - GenerationBasedForward: never
    /// - ConsumptionBasedForward: `G - credited`, once every minted forward
    ///   unit has been through distribution
    ///
    /// Surplus withdrawn earlier is subtracted.
    pub fn withdraw_surplus_certificates(
        &mut self,
        ledger: &mut EnergyToken,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        forward: TokenId,
    ) -> DistributionResult<Amount> {
        let kind = token_kind_of(&forward)?;
        if kind == TokenKind::GenerationBasedForward {
            return Err(DistributionError::NoSurplusForKind(kind));
        }

        let family = self.registered_family(ledger, &forward)?;
        if ctx.caller != family.plant {
            return Err(DistributionError::Unauthorized(
                "only the issuing plant may withdraw surplus".to_string(),
            ));
        }
        let generation = Self::documented(ledger, &family.plant, &family, EnergyDirection::Generation)?;
        let supply = family.total_minted;

        let surplus = match family.kind {
            TokenKind::AbsoluteForward => generation - generation.min(supply),
            TokenKind::ConsumptionBasedForward => {
                let distributed = self.settled_units.get(&forward).copied().unwrap_or(0);
                if distributed < supply {
                    return Err(DistributionError::SurplusNotYetAvailable {
                        distributed,
                        minted: supply,
                    });
                }
                let credited = self.credited_total.get(&forward).copied().unwrap_or(0);
                generation.saturating_sub(credited)
            }
            other => return Err(DistributionError::NoSurplusForKind(other)),
        };

        let withdrawn = self.surplus_withdrawn(&forward);
        let amount = surplus.saturating_sub(withdrawn);
        if amount > 0 {
            ledger.mint_certificates(oracle, &self.own_context(ctx), forward, family.plant, amount, false)?;
            let total = withdrawn.checked_add(amount).ok_or(DistributionError::Overflow)?;
            self.surplus_withdrawn.insert(forward, total);
            info!("Withdrew {} surplus certificates of {:?} to {:?}", amount, forward, family.plant);
        }
        Ok(amount)
    }
}
