//! Distributor Errors

use lib_tokens::{EnergyDirection, TokenError, TokenKind};
use lib_types::{Address, Amount, BalancePeriod, TokenId};
use thiserror::Error;

/// Error during distribution operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributionError {
    /// The ledger rejected the underlying call
    #[error("Ledger error: {0}")]
    Token(#[from] TokenError),

    #[error("Family {0:?} is not registered with this distributor")]
    NotRegisteredDistributor(TokenId),

    #[error("No {direction:?} documented for {plant:?} in period {period}")]
    NotDocumented {
        plant: Address,
        period: BalancePeriod,
        direction: EnergyDirection,
    },

    #[error("{0} forwards have no surplus")]
    NoSurplusForKind(TokenKind),

    #[error("Surplus not yet available: {distributed} of {minted} forward units distributed")]
    SurplusNotYetAvailable { distributed: Amount, minted: Amount },

    #[error("Family criteria do not hold for plant {0:?}")]
    CriteriaNotMet(Address),

    #[error("Only {available} certificates available, requested {requested}")]
    InsufficientAvailable { available: Amount, requested: Amount },

    #[error("Recorded deposits ({recorded}) exceed certificates held ({held})")]
    UnbackedDeposits { recorded: Amount, held: Amount },

    #[error("Invalid deposit data: {0}")]
    InvalidDepositData(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type for distribution operations
pub type DistributionResult<T> = Result<T, DistributionError>;
