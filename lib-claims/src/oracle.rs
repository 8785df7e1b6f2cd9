//! Authorization Oracle
//!
//! The ledger never inspects claim internals beyond the handful of JSON
//! fields it needs. Backends only implement [`AuthorizationOracle::lookup_claim`];
//! the yes/no questions are derived from it.
//!
//! # Failure mode
//!
//! A backend error is indistinguishable from an absent claim: every query
//! answers "no" and the failure is logged.

use lib_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::ClaimsResult;
use crate::topics::ClaimTopic;

/// An attested claim about a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub topic: ClaimTopic,
    /// Identity that issued the claim
    pub issuer: Address,
    /// JSON payload
    pub data: Vec<u8>,
    /// First second the claim is valid
    pub valid_from: Timestamp,
    /// Last second the claim is valid (None = no expiry)
    pub valid_until: Option<Timestamp>,
}

impl Claim {
    /// Claim valid from genesis with no expiry
    pub fn new(topic: ClaimTopic, issuer: Address, data: Vec<u8>) -> Self {
        Self {
            topic,
            issuer,
            data,
            valid_from: 0,
            valid_until: None,
        }
    }

    /// Claim whose payload is the given JSON value
    pub fn json(topic: ClaimTopic, issuer: Address, value: &Value) -> Self {
        Self::new(topic, issuer, value.to_string().into_bytes())
    }

    pub fn with_validity(mut self, valid_from: Timestamp, valid_until: Option<Timestamp>) -> Self {
        self.valid_from = valid_from;
        self.valid_until = valid_until;
        self
    }

    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        now >= self.valid_from && self.valid_until.map_or(true, |until| now <= until)
    }
}

/// Claims-based yes/no questions consumed by the ledger
pub trait AuthorizationOracle {
    /// Fetch the current claim for (subject, topic) from the backend
    fn lookup_claim(&self, subject: &Address, topic: ClaimTopic) -> ClaimsResult<Option<Claim>>;

    /// Payload of a claim valid at `now`
    fn claim_value(&self, subject: &Address, topic: ClaimTopic, now: Timestamp) -> Option<Vec<u8>> {
        match self.lookup_claim(subject, topic) {
            Ok(Some(claim)) if claim.is_valid_at(now) => Some(claim.data),
            Ok(_) => None,
            Err(e) => {
                warn!("Claim lookup for {} on {:?} failed: {}", topic, subject, e);
                None
            }
        }
    }

    /// Whether the subject holds a claim valid at `now`
    fn has_claim(&self, subject: &Address, topic: ClaimTopic, now: Timestamp) -> bool {
        self.claim_value(subject, topic, now).is_some()
    }

    /// Whether the subject is an accepted distributor
    fn is_accepted_distributor(&self, subject: &Address, now: Timestamp) -> bool {
        self.has_claim(subject, ClaimTopic::ACCEPTED_DISTRIBUTOR, now)
    }
}

/// Claim payload parsed as a JSON object
pub fn claim_object(
    oracle: &dyn AuthorizationOracle,
    subject: &Address,
    topic: ClaimTopic,
    now: Timestamp,
) -> Option<Map<String, Value>> {
    let data = oracle.claim_value(subject, topic, now)?;
    match serde_json::from_slice::<Value>(&data) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            warn!("Claim {} on {:?} is not valid JSON: {}", topic, subject, e);
            None
        }
    }
}

/// Single JSON field of a claim payload
pub fn claim_field(
    oracle: &dyn AuthorizationOracle,
    subject: &Address,
    topic: ClaimTopic,
    field: &str,
    now: Timestamp,
) -> Option<Value> {
    claim_object(oracle, subject, topic, now)?.remove(field)
}

/// Unsigned integer field; accepts JSON numbers and decimal strings
pub fn claim_u128(
    oracle: &dyn AuthorizationOracle,
    subject: &Address,
    topic: ClaimTopic,
    field: &str,
    now: Timestamp,
) -> Option<u128> {
    value_as_u128(&claim_field(oracle, subject, topic, field, now)?)
}

/// Address field encoded as hex
pub fn claim_address(
    oracle: &dyn AuthorizationOracle,
    subject: &Address,
    topic: ClaimTopic,
    field: &str,
    now: Timestamp,
) -> Option<Address> {
    match claim_field(oracle, subject, topic, field, now)? {
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Interpret a JSON value as an unsigned integer
pub fn value_as_u128(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
