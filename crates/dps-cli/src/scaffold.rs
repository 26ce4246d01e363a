//! # Default Subcommand
//!
//! Prints the smallest document the schema accepts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dps_schema::{Registry, ValidationOptions};
use serde_json::Value;

use crate::load_pack;

/// Arguments for the default subcommand.
#[derive(Args, Debug)]
pub struct DefaultArgs {
    /// Schema pack file (YAML or JSON).
    #[arg(long)]
    pub pack: PathBuf,

    /// Name of the schema to synthesize.
    #[arg(long)]
    pub schema: String,
}

/// Synthesize the default for `schema`, matching case tags in the pack's
/// default namespace.
///
/// A schema made only of optional parts synthesizes to nothing; that is
/// printed as `null`.
pub fn synthesize(
    registry: &Registry,
    schema: &str,
    options: &ValidationOptions,
) -> Result<Value> {
    let value = registry
        .default_value(schema, options)
        .with_context(|| format!("cannot synthesize a default for '{schema}'"))?;
    Ok(value.unwrap_or(Value::Null))
}

/// Execute the default subcommand.
pub fn run_default(args: &DefaultArgs) -> Result<u8> {
    let (registry, options) = load_pack(&args.pack)?;
    let value = synthesize(&registry, &args.schema, &options)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(0)
}
