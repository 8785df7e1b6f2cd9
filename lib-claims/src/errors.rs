//! Claims Subsystem Errors

use lib_types::Address;
use thiserror::Error;

/// Error during identity, claim or relay operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("Unknown identity: {0:?}")]
    UnknownIdentity(Address),

    #[error("Identity already registered: {0:?}")]
    IdentityExists(Address),

    #[error("Zero address cannot be an identity")]
    ZeroIdentity,

    #[error("Caller {caller:?} does not own identity {identity:?}")]
    NotOwner { caller: Address, identity: Address },

    #[error("Caller {caller:?} may not remove this claim")]
    NotClaimController { caller: Address },

    #[error("Ownership edge {identity:?} -> {owner:?} would close a cycle")]
    OwnershipCycle { identity: Address, owner: Address },

    #[error("Relay path of {hops} hops exceeds the limit of {max}")]
    RelayTooDeep { hops: usize, max: u8 },

    #[error("Relay chain broken at hop {hop}: {identity:?} is not owned by {expected_owner:?}")]
    BrokenRelayChain {
        hop: usize,
        identity: Address,
        expected_owner: Address,
    },

    #[error("Claim source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Result type for claims operations
pub type ClaimsResult<T> = Result<T, ClaimsError>;
