//! Claim topics
//!
//! Topics are plain numbers so that property criteria may reference any
//! topic the claims subsystem knows about. The constants below are the
//! topics the ledger itself reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric claim topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimTopic(pub u64);

impl ClaimTopic {
    // Roles held by authorities
    pub const IS_MARKET_AUTHORITY: Self = Self(10_010);
    pub const IS_BALANCE_AUTHORITY: Self = Self(10_020);
    pub const IS_METERING_AUTHORITY: Self = Self(10_030);
    pub const IS_PHYSICAL_ASSET_AUTHORITY: Self = Self(10_040);

    // Claims held by plants
    pub const METERING: Self = Self(10_050);
    pub const BALANCE: Self = Self(10_060);
    pub const EXISTENCE: Self = Self(10_070);
    pub const GENERATION_TYPE: Self = Self(10_080);
    pub const LOCATION: Self = Self(10_090);
    pub const MAX_POWER_GENERATION: Self = Self(10_100);
    pub const CONSUMPTION_TYPE: Self = Self(10_110);
    pub const MAX_POWER_CONSUMPTION: Self = Self(10_120);
    pub const STORAGE_TYPE: Self = Self(10_130);
    pub const REAL_WORLD_PLANT_ID: Self = Self(10_140);

    // Held by distributor identities
    pub const ACCEPTED_DISTRIBUTOR: Self = Self(10_150);

    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Well-known name, if any
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::IS_MARKET_AUTHORITY => "IsMarketAuthority",
            Self::IS_BALANCE_AUTHORITY => "IsBalanceAuthority",
            Self::IS_METERING_AUTHORITY => "IsMeteringAuthority",
            Self::IS_PHYSICAL_ASSET_AUTHORITY => "IsPhysicalAssetAuthority",
            Self::METERING => "Metering",
            Self::BALANCE => "Balance",
            Self::EXISTENCE => "Existence",
            Self::GENERATION_TYPE => "GenerationType",
            Self::LOCATION => "Location",
            Self::MAX_POWER_GENERATION => "MaxPowerGeneration",
            Self::CONSUMPTION_TYPE => "ConsumptionType",
            Self::MAX_POWER_CONSUMPTION => "MaxPowerConsumption",
            Self::STORAGE_TYPE => "StorageType",
            Self::REAL_WORLD_PLANT_ID => "RealWorldPlantId",
            Self::ACCEPTED_DISTRIBUTOR => "AcceptedDistributor",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ClaimTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "topic#{}", self.0),
        }
    }
}

/// JSON field names the ledger reads from claim payloads
pub mod fields {
    /// `METERING`: address of the plant's metering authority (hex)
    pub const METERING_AUTHORITY: &str = "meteringAuthority";
    /// `MAX_POWER_GENERATION`: generation capacity in watts
    pub const MAX_GENERATION: &str = "maxGen";
    /// `MAX_POWER_CONSUMPTION`: consumption capacity in watts
    pub const MAX_CONSUMPTION: &str = "maxCon";
}
