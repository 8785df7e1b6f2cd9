//! Energy Documentation
//!
//! Measured generation and consumption per (plant, balance period). Only the
//! metering authority named in the plant's `METERING` claim may write, and
//! only through a relayed call. Writes overwrite the previous figure.

use std::collections::HashMap;

use lib_claims::{claim_address, claim_u128, fields, AuthorizationOracle, CallContext, ClaimTopic};
use lib_types::{Address, Amount, BalancePeriod, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{TokenError, TokenResult};
use crate::events::LedgerEvent;
use crate::ledger::EnergyToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyDirection {
    Generation,
    Consumption,
}

impl EnergyDirection {
    /// Claim and field holding the plant's capacity in watts
    fn capacity_claim(&self) -> (ClaimTopic, &'static str) {
        match self {
            EnergyDirection::Generation => (ClaimTopic::MAX_POWER_GENERATION, fields::MAX_GENERATION),
            EnergyDirection::Consumption => {
                (ClaimTopic::MAX_POWER_CONSUMPTION, fields::MAX_CONSUMPTION)
            }
        }
    }
}

/// Latest authoritative figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyDocumentation {
    pub value: Amount,
    /// Metering authority that wrote the value
    pub authority: Address,
    pub documented_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentationStore {
    records: HashMap<(Address, BalancePeriod, EnergyDirection), EnergyDocumentation>,
}

impl DocumentationStore {
    pub fn get(
        &self,
        plant: &Address,
        period: BalancePeriod,
        direction: EnergyDirection,
    ) -> Option<&EnergyDocumentation> {
        self.records.get(&(*plant, period, direction))
    }

    pub fn put(
        &mut self,
        plant: Address,
        period: BalancePeriod,
        direction: EnergyDirection,
        record: EnergyDocumentation,
    ) {
        self.records.insert((plant, period, direction), record);
    }
}

impl EnergyToken {
    /// Record measured generation. Requires a forward family for (plant, period).
    pub fn add_measured_energy_generation(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        plant: Address,
        value: Amount,
        period: BalancePeriod,
    ) -> TokenResult<()> {
        self.document(oracle, ctx, plant, value, period, EnergyDirection::Generation)
    }

    pub fn add_measured_energy_consumption(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        plant: Address,
        value: Amount,
        period: BalancePeriod,
    ) -> TokenResult<()> {
        self.document(oracle, ctx, plant, value, period, EnergyDirection::Consumption)
    }

    fn document(
        &mut self,
        oracle: &dyn AuthorizationOracle,
        ctx: &CallContext,
        plant: Address,
        value: Amount,
        period: BalancePeriod,
        direction: EnergyDirection,
    ) -> TokenResult<()> {
        let now = ctx.now;

        // Authority: relayed call by the identity named in the METERING claim
        let authority = claim_address(oracle, &plant, ClaimTopic::METERING, fields::METERING_AUTHORITY, now)
            .ok_or(TokenError::MissingClaim {
                subject: plant,
                topic: ClaimTopic::METERING,
            })?;
        if !ctx.is_relayed()
            || ctx.caller != authority
            || !oracle.has_claim(&ctx.caller, ClaimTopic::IS_METERING_AUTHORITY, now)
        {
            return Err(TokenError::Unauthorized(format!(
                "{:?} is not the metering authority of {:?}",
                ctx.caller, plant
            )));
        }

        // Time window
        let clock = &self.config().balance_period;
        if !clock.is_period_start(period) || now < period {
            return Err(TokenError::InvalidBalancePeriod(period));
        }
        let closed_at = clock
            .period_end(period)
            .saturating_add(self.config().documentation_window_secs);
        if now >= closed_at {
            return Err(TokenError::DocumentationWindowClosed { period, closed_at });
        }

        // Capacity cap
        let (topic, field) = direction.capacity_claim();
        let capacity = claim_u128(oracle, &plant, topic, field, now).ok_or(TokenError::MissingClaim {
            subject: plant,
            topic,
        })?;
        let cap = self.config().energy_cap(capacity).ok_or(TokenError::Overflow)?;
        if value > cap {
            return Err(TokenError::CapacityExceeded { value, cap });
        }

        self.transact(|state, _| {
            if direction == EnergyDirection::Generation
                && !state
                    .families
                    .values()
                    .any(|family| family.plant == plant && family.period == period)
            {
                return Err(TokenError::NoForwardsForPeriod { plant, period });
            }

            state.documentation.put(
                plant,
                period,
                direction,
                EnergyDocumentation {
                    value,
                    authority,
                    documented_at: now,
                },
            );
            state.emit(LedgerEvent::EnergyDocumented {
                plant,
                period,
                direction,
                value,
                authority,
            });
            Ok(())
        })?;

        info!(
            "Documented {:?} {} for plant {:?} period {} by {:?}",
            direction, value, plant, period, authority
        );
        Ok(())
    }
}
