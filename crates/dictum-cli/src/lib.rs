//! # dictum-cli — Holdings Comparison CLI
//!
//! Subcommand handlers for the `dictum` binary. The CLI is a thin shell
//! over the library crates: `load` deserializes YAML-authored holdings
//! into the core data model (resolving repeated entity labels to one
//! shared term per file), `check` validates a file, and `compare` reports
//! the relations between two holdings with their explanations.

pub mod check;
pub mod compare;
pub mod load;
