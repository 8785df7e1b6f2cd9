//! Token Ledger Errors

use lib_claims::ClaimTopic;
use lib_types::{Address, Amount, BalancePeriod, Timestamp, TokenId};
use thiserror::Error;

use crate::kind::TokenKind;

/// Error during ledger operations
///
/// Every error leaves the ledger exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    // ------------------------------------------------------------------
    // Authorization
    // ------------------------------------------------------------------
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transfer to the zero address")]
    TransferToZeroAddress,

    #[error("Self-transfer by {0:?} requires an explicit self-approval")]
    SelfTransferNotApproved(Address),

    #[error("{subject:?} lacks required claim {topic}")]
    MissingClaim { subject: Address, topic: ClaimTopic },

    #[error("No reception approval from {receiver:?} for sender {sender:?} on {token:?}")]
    ReceptionNotApproved {
        receiver: Address,
        sender: Address,
        token: TokenId,
    },

    #[error("Reception approval expired at {expiry}, now {now}")]
    ReceptionApprovalExpired { expiry: Timestamp, now: Timestamp },

    #[error("Reception approval covers {remaining}, need {need}")]
    InsufficientReceptionApproval { remaining: Amount, need: Amount },

    #[error("Transfers to accepted distributor {0:?} must use the receiver hook")]
    ReceiverHookRequired(Address),

    #[error("Receiver rejected tokens: {0}")]
    ReceiverRejected(String),

    #[error("Distributor {0:?} is not accepted")]
    DistributorNotAccepted(Address),

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------
    #[error("Forwards already created: {0:?}")]
    ForwardsAlreadyCreated(TokenId),

    #[error("Unknown forward family: {0:?}")]
    UnknownForwardFamily(TokenId),

    #[error("Unknown token: {0:?}")]
    UnknownToken(TokenId),

    #[error("Forwards {0:?} are settled: generation has been documented")]
    ForwardsSettled(TokenId),

    #[error("No generation documented for the period of family {0:?}")]
    NoGenerationDocumented(TokenId),

    #[error("Certificates would exceed documented generation: documented {documented}, requested {requested}")]
    CertificatesExceedGeneration { documented: Amount, requested: Amount },

    #[error("Invalid balance period: {0}")]
    InvalidBalancePeriod(BalancePeriod),

    #[error("Documentation window for period {period} closed at {closed_at}")]
    DocumentationWindowClosed {
        period: BalancePeriod,
        closed_at: Timestamp,
    },

    #[error("No forwards created for plant {plant:?} in period {period}")]
    NoForwardsForPeriod { plant: Address, period: BalancePeriod },

    #[error("Energy value {value} exceeds capacity cap {cap}")]
    CapacityExceeded { value: Amount, cap: Amount },

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------
    #[error("Unknown token kind tag: {0:#04x}")]
    UnknownTokenKind(u8),

    #[error("Token kind {0} not allowed here")]
    InvalidTokenKind(TokenKind),

    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Zero amount not allowed")]
    ZeroAmount,

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow")]
    Underflow,
}

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;
