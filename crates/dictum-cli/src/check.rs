//! # Check Subcommand
//!
//! Loads a holdings file and reports what it parsed. Structural
//! validation happens in the core constructors during loading; reaching
//! the summary means every holding is well-formed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::load::load_holdings;

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Holdings file to validate.
    pub file: PathBuf,
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let holdings = load_holdings(&args.file)?;
    for (index, holding) in holdings.iter().enumerate() {
        println!("[{index}] {holding}");
    }
    info!(count = holdings.len(), file = %args.file.display(), "holdings file OK");
    println!("{} holding(s) OK", holdings.len());
    Ok(())
}
