//! # List Subcommand

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::load_pack;

/// Arguments for the list subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Schema pack file (YAML or JSON).
    #[arg(long)]
    pub pack: PathBuf,
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs) -> Result<u8> {
    let (registry, _) = load_pack(&args.pack)?;

    let schemas = registry.schemas().names();
    println!("Schemas ({}):", schemas.len());
    for name in &schemas {
        println!("  {name}");
    }

    println!();
    let collections = registry.collections().names();
    println!("Collections ({}):", collections.len());
    for name in &collections {
        let size = registry.collection(name).map_or(0, <[String]>::len);
        println!("  {name:<32} {size} entries");
    }
    Ok(0)
}
