//! CLI module for the grievance collector
//!
//! This module provides the command-line interface for inspecting persisted reports.
//!
//! ## Commands
//!
//! - `show <file>` - Print the report of every run stored in a report file
//! - `merge <file>` - Fold every stored run into one report
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations and finished sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);

    pub fn is_success(self) -> bool {
        self == ExitCode::SUCCESS
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(u8::try_from(code.0).unwrap_or(1))
    }
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Inspect disappointment reports written by test suites
#[derive(Parser, Debug)]
#[command(name = "grievance")]
#[command(version = VERSION)]
#[command(about = "Inspect disappointment reports written by test suites", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the report of every run stored in a report file
    Show {
        /// Report file written by a session
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// List counts by tag, error and test
        #[arg(short, long)]
        verbose: bool,
        /// Only the most recent run
        #[arg(long)]
        latest: bool,
    },

    /// Fold every run stored in a report file into one report
    Merge {
        /// Report file written by a session
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// List counts by tag, error and test
        #[arg(short, long)]
        verbose: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Show { file, verbose, latest } => commands::show_report(&file, verbose, latest),
        Command::Merge { file, verbose } => commands::merge_reports(&file, verbose),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::try_parse_from(["grievance", "show", "report.json", "-v", "--latest"]).unwrap();
        if let Command::Show { file, verbose, latest } = cli.command {
            assert_eq!(file, PathBuf::from("report.json"));
            assert!(verbose);
            assert!(latest);
        } else {
            panic!("Expected Show command");
        }
    }

    #[test]
    fn test_cli_parse_merge() {
        let cli = Cli::try_parse_from(["grievance", "merge", "report.json"]).unwrap();
        assert!(matches!(cli.command, Command::Merge { verbose: false, .. }));
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["grievance"]).is_err());
    }

    #[test]
    fn test_exit_code_conversion() {
        assert!(ExitCode::SUCCESS.is_success());
        assert!(!ExitCode::FAILURE.is_success());
        assert!(!ExitCode(300).is_success());
    }
}
