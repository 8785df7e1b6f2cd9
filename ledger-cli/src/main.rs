//! Ledger CLI
//!
//! Entry point for the ledger-cli binary.

use std::env;
use std::process::ExitCode;

use clap::Parser;
use ledger_cli::{run_cli, ConsoleOutput, LedgerCli, Output};

fn main() -> ExitCode {
    // Initialize logging
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = LedgerCli::parse();
    let out = ConsoleOutput;
    match run_cli(&cli, &out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = out.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
