//! Output abstraction for testable printing
//!
//! Command handlers build a report and hand it to an [`Output`]; the
//! console implementation prints, the test implementation captures.

use std::fmt::Display;

use serde::Serialize;

use crate::argument_parsing::OutputFormat;
use crate::error::CliResult;

pub trait Output {
    /// Print normal output
    fn print(&self, msg: &str) -> CliResult<()>;

    /// Print error message
    fn error(&self, msg: &str) -> CliResult<()>;

    /// Print formatted JSON
    fn print_json(&self, data: &serde_json::Value) -> CliResult<()> {
        self.print(&serde_json::to_string_pretty(data)?)
    }

    /// Print a report in the requested format
    fn report<R: Serialize + Display>(&self, format: OutputFormat, report: &R) -> CliResult<()>
    where
        Self: Sized,
    {
        match format {
            OutputFormat::Text => self.print(&report.to_string()),
            OutputFormat::Json => self.print_json(&serde_json::to_value(report)?),
        }
    }
}

/// Standard console output implementation
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn print(&self, msg: &str) -> CliResult<()> {
        println!("{}", msg);
        Ok(())
    }

    fn error(&self, msg: &str) -> CliResult<()> {
        eprintln!("error: {}", msg);
        Ok(())
    }
}
