//! # dictum CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Dictum — legal rule entailment toolchain.
///
/// Loads YAML-authored judicial holdings and reports implication,
/// contradiction and consistency relations between them.
#[derive(Parser, Debug)]
#[command(name = "dictum", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compare the holdings of two files and report their relations.
    Compare(dictum_cli::compare::CompareArgs),
    /// Load and structurally validate a holdings file.
    Check(dictum_cli::check::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare(args) => dictum_cli::compare::run(&args),
        Commands::Check(args) => dictum_cli::check::run(&args),
    }
}
