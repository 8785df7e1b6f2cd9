//! Command handlers
//!
//! Each handler is a pure function from parsed input to a report; printing
//! happens in [`crate::run_cli`].

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use lib_claims::ClaimTopic;
use lib_tokens::{
    get_criteria_hash, get_token_id, number_to_token_kind, Criterion, TokenKind, ZERO_DISCRIMINATOR,
};
use lib_types::{Address, BalancePeriod, LedgerConfig, Timestamp};

use crate::error::{CliError, CliResult};

// ============================================================================
// INPUT PARSING
// ============================================================================

/// Kind by name (case-insensitive) or by tag number
pub fn parse_kind(input: &str) -> CliResult<TokenKind> {
    if let Ok(tag) = parse_number(input) {
        return TokenKind::from_tag(tag).map_err(|_| CliError::InvalidKind(input.to_string()));
    }
    TokenKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(input))
        .ok_or_else(|| CliError::InvalidKind(input.to_string()))
}

fn parse_number(input: &str) -> Result<u8, std::num::ParseIntError> {
    match input.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    }
}

pub fn parse_address(input: &str) -> CliResult<Address> {
    input.parse().map_err(|e: hex::FromHexError| CliError::InvalidAddress {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Read a JSON array of criteria
pub fn load_criteria(path: &Path) -> CliResult<Vec<Criterion>> {
    let failed = |reason: String| CliError::CriteriaLoadFailed {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
    let criteria: Vec<Criterion> = serde_json::from_str(&content).map_err(|e| failed(e.to_string()))?;
    debug!("Loaded {} criteria from {}", criteria.len(), path.display());
    Ok(criteria)
}

// ============================================================================
// PERIOD
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub timestamp: Timestamp,
    pub period: BalancePeriod,
    pub period_end: Timestamp,
    pub is_period_start: bool,
}

pub fn period(config: &LedgerConfig, timestamp: Timestamp) -> PeriodReport {
    let clock = &config.balance_period;
    let period = clock.balance_period(timestamp);
    PeriodReport {
        timestamp,
        period,
        period_end: clock.period_end(period),
        is_period_start: clock.is_period_start(timestamp),
    }
}

impl fmt::Display for PeriodReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Balance period: {}\nEnds at:        {}",
            self.period, self.period_end
        )?;
        if self.is_period_start {
            write!(f, "\n{} is the start of its period", self.timestamp)?;
        }
        Ok(())
    }
}

// ============================================================================
// TOKEN ID
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TokenIdReport {
    pub token_id: String,
    pub kind: TokenKind,
    pub tag: u8,
    pub period: BalancePeriod,
    pub plant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_hash: Option<String>,
}

pub fn token_id(
    config: &LedgerConfig,
    kind: TokenKind,
    period: BalancePeriod,
    plant: &Address,
    criteria: Option<&[Criterion]>,
) -> CliResult<TokenIdReport> {
    let clock = &config.balance_period;
    if !clock.is_period_start(period) {
        return Err(CliError::NotPeriodStart {
            period,
            nearest: clock.balance_period(period),
        });
    }

    let criteria_hash = match (kind, criteria) {
        (TokenKind::PropertyForward, Some(criteria)) => Some(get_criteria_hash(criteria)),
        // An empty criteria list is a valid property family
        (TokenKind::PropertyForward, None) => Some(get_criteria_hash(&[])),
        (_, Some(_)) => return Err(CliError::UnexpectedCriteria),
        (_, None) => None,
    };
    let id = get_token_id(
        kind,
        period,
        plant,
        criteria_hash.as_ref().unwrap_or(&ZERO_DISCRIMINATOR),
    );

    Ok(TokenIdReport {
        token_id: id.to_string(),
        kind,
        tag: kind.tag(),
        period,
        plant: plant.to_string(),
        criteria_hash: criteria_hash.map(hex::encode),
    })
}

impl fmt::Display for TokenIdReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Token id: {}", self.token_id)?;
        writeln!(f, "Kind:     {} (tag {:#04x})", self.kind, self.tag)?;
        writeln!(f, "Period:   {}", self.period)?;
        write!(f, "Plant:    {}", self.plant)?;
        if let Some(hash) = &self.criteria_hash {
            write!(f, "\nCriteria: {}", hash)?;
        }
        Ok(())
    }
}

// ============================================================================
// CRITERIA HASH
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CriteriaReport {
    pub hash: String,
    pub criteria: Vec<String>,
}

pub fn criteria_hash(criteria: &[Criterion]) -> CriteriaReport {
    CriteriaReport {
        hash: hex::encode(get_criteria_hash(criteria)),
        criteria: criteria.iter().map(describe_criterion).collect(),
    }
}

fn describe_criterion(criterion: &Criterion) -> String {
    match ClaimTopic::name(&criterion.topic) {
        Some(name) => format!("{} ({})", criterion, name),
        None => criterion.to_string(),
    }
}

impl fmt::Display for CriteriaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Criteria hash: {}", self.hash)?;
        for line in &self.criteria {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}

// ============================================================================
// KIND
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: TokenKind,
    pub tag: u8,
    pub ordinal: u8,
    pub forward: bool,
    pub certificate: bool,
    pub required_claims: Vec<u64>,
}

pub fn kind(number: &str) -> CliResult<KindReport> {
    let tag = parse_number(number).map_err(|_| CliError::InvalidKind(number.to_string()))?;
    let kind = number_to_token_kind(tag)?;
    Ok(KindReport {
        kind,
        tag,
        ordinal: kind.ordinal(),
        forward: kind.is_forward(),
        certificate: kind.is_certificate(),
        required_claims: kind.required_claims().iter().map(ClaimTopic::id).collect(),
    })
}

impl fmt::Display for KindReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Kind:    {}", self.kind)?;
        writeln!(f, "Tag:     {:#04x}", self.tag)?;
        write!(f, "Ordinal: {}", self.ordinal)?;
        if !self.required_claims.is_empty() {
            let claims: Vec<String> = self.required_claims.iter().map(u64::to_string).collect();
            write!(f, "\nReceivers need claims: {}", claims.join(", "))?;
        }
        Ok(())
    }
}

// ============================================================================
// CHECK CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub path: String,
    pub config: LedgerConfig,
    /// Documentation cap of a 1 kW plant over one period
    pub cap_per_kilowatt: Option<u128>,
}

pub fn check_config(path: &Path) -> CliResult<ConfigReport> {
    let config = LedgerConfig::load(path)?;
    Ok(ConfigReport {
        path: path.display().to_string(),
        cap_per_kilowatt: config.energy_cap(1_000),
        config,
    })
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: OK", self.path)?;
        writeln!(
            f,
            "  balance period: {}s (offset {})",
            self.config.balance_period.length, self.config.balance_period.offset
        )?;
        writeln!(f, "  units per Wh: {}", self.config.units_per_watt_hour)?;
        writeln!(
            f,
            "  documentation window: {}s",
            self.config.documentation_window_secs
        )?;
        write!(f, "  max relay hops: {}", self.config.max_relay_hops)?;
        if let Some(cap) = self.cap_per_kilowatt {
            write!(f, "\n  cap per kW and period: {} units", cap)?;
        }
        Ok(())
    }
}
