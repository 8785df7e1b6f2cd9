//! Property Criteria
//!
//! A property forward family is gated by an ordered list of predicates over
//! a plant's live claim values: `(topic, field_name, operator, value)`.
//!
//! The criteria hash is part of the family's token id, so two lists that
//! differ in any element or in order give different families.

use std::cmp::Ordering;
use std::fmt;

use lib_claims::{claim_field, AuthorizationOracle, ClaimTopic};
use lib_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CRITERIA_HASH_DOMAIN: &[u8] = b"ENERGY_CRITERIA_V1";

/// Comparison between a claim field and the expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionOperator {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CriterionOperator {
    pub const fn code(&self) -> u8 {
        match self {
            CriterionOperator::Eq => 0,
            CriterionOperator::Lt => 1,
            CriterionOperator::Gt => 2,
            CriterionOperator::Le => 3,
            CriterionOperator::Ge => 4,
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CriterionOperator::Eq => ordering == Ordering::Equal,
            CriterionOperator::Lt => ordering == Ordering::Less,
            CriterionOperator::Gt => ordering == Ordering::Greater,
            CriterionOperator::Le => ordering != Ordering::Greater,
            CriterionOperator::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CriterionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CriterionOperator::Eq => "==",
            CriterionOperator::Lt => "<",
            CriterionOperator::Gt => ">",
            CriterionOperator::Le => "<=",
            CriterionOperator::Ge => ">=",
        };
        f.write_str(symbol)
    }
}

/// One predicate over a claim field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Criterion {
    pub topic: ClaimTopic,
    pub field_name: String,
    pub operator: CriterionOperator,
    pub value: String,
}

impl Criterion {
    pub fn new(
        topic: ClaimTopic,
        field_name: impl Into<String>,
        operator: CriterionOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            topic,
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluate against the subject's claims valid at `now`.
    ///
    /// Both sides are compared as integers when both parse as integers;
    /// otherwise only `Eq` can hold, as an exact string match. A missing
    /// claim or field never satisfies a criterion.
    pub fn holds_for(
        &self,
        oracle: &dyn AuthorizationOracle,
        subject: &Address,
        now: Timestamp,
    ) -> bool {
        let Some(actual) = claim_field(oracle, subject, self.topic, &self.field_name, now) else {
            return false;
        };
        let actual = match actual {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return false,
        };

        match (actual.trim().parse::<i128>(), self.value.trim().parse::<i128>()) {
            (Ok(lhs), Ok(rhs)) => self.operator.accepts(lhs.cmp(&rhs)),
            _ => self.operator == CriterionOperator::Eq && actual == self.value,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} {}",
            self.topic, self.field_name, self.operator, self.value
        )
    }
}

/// Whether every criterion holds for `subject`
pub fn criteria_hold(
    criteria: &[Criterion],
    oracle: &dyn AuthorizationOracle,
    subject: &Address,
    now: Timestamp,
) -> bool {
    criteria.iter().all(|c| c.holds_for(oracle, subject, now))
}

/// Order-sensitive hash of a criteria list
pub fn get_criteria_hash(criteria: &[Criterion]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CRITERIA_HASH_DOMAIN);
    hasher.update(&(criteria.len() as u64).to_be_bytes());
    for criterion in criteria {
        hasher.update(&criterion.topic.id().to_be_bytes());
        hasher.update(&(criterion.field_name.len() as u64).to_be_bytes());
        hasher.update(criterion.field_name.as_bytes());
        hasher.update(&[criterion.operator.code()]);
        hasher.update(&(criterion.value.len() as u64).to_be_bytes());
        hasher.update(criterion.value.as_bytes());
    }
    *hasher.finalize().as_bytes()
}
