//! # Validate Subcommand
//!
//! Validates each document against one schema and prints every issue at
//! its path. Documents are independent: each gets a fresh issue sink.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dps_core::Issues;
use dps_schema::Registry;
use serde::Serialize;

use crate::{load_pack, read_document, EXIT_INVALID};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema pack file (YAML or JSON).
    #[arg(long)]
    pub pack: PathBuf,

    /// Name of the schema to validate against.
    #[arg(long)]
    pub schema: String,

    /// Documents to validate.
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Print one JSON report per document instead of text.
    #[arg(long)]
    pub json: bool,

    /// Warn about object keys the schema does not declare.
    #[arg(long)]
    pub report_unknown_keys: bool,
}

/// Outcome for one document.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub valid: bool,
    pub issues: Issues,
}

/// Validate every document in `args` against `registry`.
pub fn check_documents(
    registry: &Registry,
    options: &dps_schema::ValidationOptions,
    args: &ValidateArgs,
) -> Result<Vec<DocumentReport>> {
    let mut reports = Vec::with_capacity(args.documents.len());
    for path in &args.documents {
        let value = read_document(path)?;
        let result = registry.validate(&args.schema, &value, options)?;
        tracing::debug!(
            document = %path.display(),
            issues = result.issues.len(),
            "validated document"
        );
        reports.push(DocumentReport {
            document: path.display().to_string(),
            valid: result.is_valid(),
            issues: result.issues,
        });
    }
    Ok(reports)
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let (registry, mut options) = load_pack(&args.pack)?;
    if args.report_unknown_keys {
        options.report_unknown_keys = true;
    }

    let reports = check_documents(&registry, &options, args)?;

    for report in &reports {
        if args.json {
            println!("{}", serde_json::to_string(report)?);
            continue;
        }
        let status = if report.valid { "OK" } else { "FAIL" };
        println!("{status}: {}", report.document);
        if !report.issues.is_empty() {
            println!("{}", report.issues);
        }
    }

    let failed = reports.iter().filter(|r| !r.valid).count();
    if !args.json {
        println!();
        println!("{} of {} documents valid", reports.len() - failed, reports.len());
    }
    Ok(if failed > 0 { EXIT_INVALID } else { 0 })
}
