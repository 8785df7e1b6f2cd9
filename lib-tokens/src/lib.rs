//! Energy token ledger.
//!
//! - [`kind`] / [`token_id`]: the token identity codec
//! - [`criteria`]: property predicates and their hash
//! - [`ledger::EnergyToken`]: balances, reception approvals, transfers,
//!   forward families, certificate minting and energy documentation
//!
//! Every operation is atomic: an error leaves the ledger unchanged.

pub mod approval;
pub mod criteria;
pub mod documentation;
pub mod errors;
pub mod events;
pub mod forwards;
pub mod kind;
pub mod ledger;
pub mod receiver;
pub mod token_id;
mod transfer;

pub use approval::{ApprovalKey, ReceptionApproval};
pub use criteria::{criteria_hold, get_criteria_hash, Criterion, CriterionOperator};
pub use documentation::{EnergyDirection, EnergyDocumentation};
pub use errors::{TokenError, TokenResult};
pub use events::LedgerEvent;
pub use forwards::{ForwardFamily, TokenInfo, ISSUER_CLAIMS};
pub use kind::{number_to_token_kind, token_kind_of, token_kind_to_number, TokenKind};
pub use ledger::EnergyToken;
pub use receiver::{LedgerView, Receipt, TokenReceiver};
pub use token_id::{
    get_certificate_token_id, get_forward_token_id, get_property_token_id, get_token_id,
    ZERO_DISCRIMINATOR,
};
