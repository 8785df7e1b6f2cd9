//! Energy ledger primitives.
//! Stable, protocol-neutral, behavior-free.
//!
//! Rule: No String identifiers in ledger state. Ever.

pub mod balance_period;
pub mod config;
pub mod primitives;

pub use balance_period::{get_balance_period, BalancePeriodConfig};
pub use config::{ConfigError, LedgerConfig};
pub use primitives::{Address, Amount, BalancePeriod, Timestamp, TokenId};
