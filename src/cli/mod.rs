//! CLI module for the Asthra compiler front end
//!
//! ## Commands
//!
//! - `check <FILES...>` - Lex, parse, resolve, and analyse a set of modules
//! - `lex <FILE>` - Print the token stream of one file (debug)
//! - `parse <FILE>` - Print the syntax tree of one file (debug)
//!
//! Every command accepts `--format human|json`.
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

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::AnalyzerConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Failures of the driver itself, as opposed to diagnostics in the compiled program.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{}' is {size} bytes, over the source size limit", path.display())]
    TooLarge { path: PathBuf, size: u64 },
    #[error("no input files")]
    NoInput,
    #[error("cannot encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Output rendering for diagnostics and debug dumps.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Source snippets with labels, for terminals
    #[default]
    Human,
    /// One JSON document on stdout, for tools
    Json,
}

/// The Asthra compiler front end
#[derive(Parser, Debug)]
#[command(name = "asthra")]
#[command(version = VERSION)]
#[command(about = "Front end of the Asthra programming language compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check modules for lexical, syntax, resolution, and semantic errors
    Check {
        /// Source files; module names are their paths relative to the common root
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
        /// Semantic errors kept per module
        #[arg(long, value_name = "N")]
        max_errors: Option<usize>,
        /// Analyse modules on one thread
        #[arg(long)]
        sequential: bool,
        /// Module whose `main` is the entry point (default: the module declaring `package main`)
        #[arg(long, value_name = "MODULE")]
        entry: Option<String>,
    },

    /// Tokenize one file (debug)
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse one file (debug)
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Command {
    /// Analyzer settings, with flags applied over the defaults.
    fn analyzer_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default();
        if let Command::Check {
            max_errors,
            sequential,
            entry,
            ..
        } = self
        {
            if let Some(max) = max_errors {
                config = config.with_max_errors(*max);
            }
            if *sequential {
                config = config.with_parallel(false);
            }
            if let Some(entry) = entry {
                config = config.with_entry_module(entry.clone());
            }
        }
        config
    }
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
            eprintln!("error: {}", e);
            process::exit(e.exit_code().0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.command.analyzer_config();
    match cli.command {
        Command::Check { files, .. } => commands::check_files(&files, &config, cli.format),
        Command::Lex { file } => commands::lex_file(&file, cli.format),
        Command::Parse { file } => commands::parse_file(&file, cli.format),
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
    fn test_cli_parse_check_with_flags() {
        let cli = Cli::try_parse_from([
            "asthra",
            "check",
            "a.asthra",
            "b.asthra",
            "--max-errors",
            "5",
            "--sequential",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let config = cli.command.analyzer_config();
        assert_eq!(config.max_errors_per_module, 5);
        assert!(!config.parallel);
        let Command::Check { files, .. } = cli.command else {
            panic!("Expected Check command");
        };
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_cli_check_requires_files() {
        assert!(Cli::try_parse_from(["asthra", "check"]).is_err());
    }

    #[test]
    fn test_cli_parse_debug_commands() {
        let cli = Cli::try_parse_from(["asthra", "lex", "a.asthra"]).unwrap();
        assert!(matches!(cli.command, Command::Lex { .. }));
        assert_eq!(cli.format, OutputFormat::Human);

        let cli = Cli::try_parse_from(["asthra", "parse", "a.asthra"]).unwrap();
        assert!(matches!(cli.command, Command::Parse { .. }));
    }

    #[test]
    fn test_default_config_for_debug_commands() {
        let cli = Cli::try_parse_from(["asthra", "lex", "a.asthra"]).unwrap();
        assert_eq!(cli.command.analyzer_config(), AnalyzerConfig::default());
    }
}
