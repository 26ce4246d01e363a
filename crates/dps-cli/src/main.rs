//! # dps CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dps_cli::list::{run_list, ListArgs};
use dps_cli::scaffold::{run_default, DefaultArgs};
use dps_cli::validate::{run_validate, ValidateArgs};

/// Schema engine CLI.
///
/// Validates data documents against schemas declared in a schema pack and
/// synthesizes default documents.
#[derive(Parser, Debug)]
#[command(name = "dps", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents against a schema.
    Validate(ValidateArgs),

    /// Print the default document for a schema.
    Default(DefaultArgs),

    /// List the schemas and collections in a pack.
    List(ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Default(args) => run_default(args),
        Commands::List(args) => run_list(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
