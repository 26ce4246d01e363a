//! # dps-cli: Command-Line Front End for the Schema Engine
//!
//! Provides the `dps` binary. Every subcommand starts from a schema pack
//! (see [`dps_schema::SchemaPack`]) and works on one schema by name.
//!
//! ## Subcommands
//!
//! - `dps validate`: validate data documents, print every issue.
//! - `dps default`: print the synthesized default document.
//! - `dps list`: list registered schemas and collections.
//!
//! ```bash
//! dps validate --pack loot.yaml --schema loot_table chests/*.json
//! dps default --pack loot.yaml --schema loot_table
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` the command itself failed (unreadable pack, unknown
//! schema), `2` validation found at least one error.

pub mod list;
pub mod scaffold;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use dps_schema::{Registry, SchemaPack, ValidationOptions};
use serde_json::Value;

/// Exit code for documents that failed validation.
pub const EXIT_INVALID: u8 = 2;

/// Load a schema pack and freeze it into a registry.
pub fn load_pack(path: &Path) -> Result<(Registry, ValidationOptions)> {
    let pack = SchemaPack::load(path)?;
    let registry = pack
        .build()
        .with_context(|| format!("schema pack {} is inconsistent", path.display()))?;
    tracing::info!(
        pack = %path.display(),
        schemas = registry.schemas().len(),
        collections = registry.collections().len(),
        "loaded schema pack"
    );
    Ok((registry, pack.options))
}

/// Read a data document. `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let value: Value = match ext {
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
    };
    Ok(value)
}
