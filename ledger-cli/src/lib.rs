//! Ledger CLI Library
//!
//! Offline tools over the energy ledger codecs: balance periods, token ids,
//! criteria hashes and configuration checks. Handlers in [`commands`] are
//! pure; [`run_cli`] loads the configuration, dispatches and prints.

pub mod argument_parsing;
pub mod commands;
pub mod error;
pub mod output;

use tracing::debug;

use lib_types::LedgerConfig;

pub use argument_parsing::{LedgerCli, LedgerCommand, OutputFormat};
pub use error::{CliError, CliResult};
pub use output::{ConsoleOutput, Output};

/// Configuration from `--config`, or defaults
pub fn load_config(cli: &LedgerCli) -> CliResult<LedgerConfig> {
    match &cli.config {
        Some(path) => {
            debug!("Loading ledger config from {}", path.display());
            Ok(LedgerConfig::load(path)?)
        }
        None => Ok(LedgerConfig::default()),
    }
}

/// Execute a parsed command line
pub fn run_cli<O: Output>(cli: &LedgerCli, out: &O) -> CliResult<()> {
    let format = cli.format;
    match &cli.command {
        LedgerCommand::Period { timestamp } => {
            let config = load_config(cli)?;
            out.report(format, &commands::period(&config, *timestamp))
        }
        LedgerCommand::TokenId {
            kind,
            period,
            plant,
            criteria,
        } => {
            let config = load_config(cli)?;
            let kind = commands::parse_kind(kind)?;
            let plant = commands::parse_address(plant)?;
            let criteria = criteria
                .as_deref()
                .map(commands::load_criteria)
                .transpose()?;
            let report = commands::token_id(&config, kind, *period, &plant, criteria.as_deref())?;
            out.report(format, &report)
        }
        LedgerCommand::CriteriaHash { file } => {
            let criteria = commands::load_criteria(file)?;
            out.report(format, &commands::criteria_hash(&criteria))
        }
        LedgerCommand::Kind { number } => out.report(format, &commands::kind(number)?),
        LedgerCommand::CheckConfig { path } => out.report(format, &commands::check_config(path)?),
    }
}
