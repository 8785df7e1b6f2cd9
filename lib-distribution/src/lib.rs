//! Certificate distributors
//!
//! - [`SimpleDistributor`]: pro-rata certificates for plain forward holders
//!   plus surplus withdrawal for the issuing plant
//! - [`ComplexDistributor`]: property forwards backed by deposited
//!   certificates whose plant satisfies the family's criteria

pub mod complex;
pub mod errors;
pub mod simple;

pub use complex::ComplexDistributor;
pub use errors::{DistributionError, DistributionResult};
pub use simple::{entitlement, SimpleDistributor};
