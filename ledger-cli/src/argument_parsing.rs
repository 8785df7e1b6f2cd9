//! Ledger CLI argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Energy ledger command-line tools
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "ledger-cli")]
pub struct LedgerCli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, env = "LEDGER_FORMAT", global = true)]
    pub format: OutputFormat,

    /// Ledger configuration file (TOML); defaults apply when absent
    #[arg(short, long, env = "LEDGER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum LedgerCommand {
    /// Balance period containing a unix timestamp
    Period {
        /// Unix timestamp in seconds
        timestamp: u64,
    },

    /// Derive the id of a forward, certificate or property forward token
    TokenId {
        /// Kind name (e.g. AbsoluteForward) or tag number
        #[arg(short, long)]
        kind: String,

        /// Balance period start
        #[arg(short, long)]
        period: u64,

        /// Plant address (64 hex characters)
        #[arg(long)]
        plant: String,

        /// JSON file with the criteria list (PropertyForward only)
        #[arg(long)]
        criteria: Option<PathBuf>,
    },

    /// Hash a JSON criteria list
    CriteriaHash {
        /// JSON file with the criteria list
        file: PathBuf,
    },

    /// Describe a token kind tag number
    Kind {
        /// Tag number, decimal or 0x-prefixed hex
        number: String,
    },

    /// Load and validate a ledger configuration file
    CheckConfig {
        /// TOML file to check
        path: PathBuf,
    },
}
