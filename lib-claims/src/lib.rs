//! Claims-based authorization for the energy ledger
//!
//! The ledger only asks yes/no and value questions about claims through
//! [`AuthorizationOracle`]. [`ClaimRegistry`] is the in-memory backend with
//! the identity ownership graph and the act-as relay.

pub mod context;
pub mod errors;
pub mod oracle;
pub mod registry;
pub mod topics;

pub use context::CallContext;
pub use errors::{ClaimsError, ClaimsResult};
pub use oracle::{
    claim_address, claim_field, claim_object, claim_u128, value_as_u128, AuthorizationOracle,
    Claim,
};
pub use registry::ClaimRegistry;
pub use topics::{fields, ClaimTopic};
