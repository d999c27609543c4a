//! # Compare Subcommand
//!
//! Loads two holdings files and reports every relation that holds between
//! the first holding of each, with the registers that justify it.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use dictum_factor::Factor;
use dictum_rule::{Explanation, ExplanationRelation, Holding, Rule};

use crate::load::load_holdings;

/// Arguments for the compare subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Left holdings file.
    pub left: PathBuf,

    /// Right holdings file.
    pub right: PathBuf,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    let left = first_holding(load_holdings(&args.left)?, &args.left)?;
    let right = first_holding(load_holdings(&args.right)?, &args.right)?;
    for line in report(&left, &right) {
        println!("{line}");
    }
    Ok(())
}

fn first_holding(mut holdings: Vec<Holding>, path: &PathBuf) -> Result<Holding> {
    if holdings.is_empty() {
        bail!("{} contains no holdings", path.display());
    }
    Ok(holdings.remove(0))
}

/// Every relation between two holdings, rendered.
fn report(left: &Holding, right: &Holding) -> Vec<String> {
    let mut lines = Vec::new();
    if left.implies(right) {
        lines.push(explain(ExplanationRelation::Implies, left, right));
    }
    if right.implies(left) {
        lines.push(explain(ExplanationRelation::ImpliedBy, left, right));
    }
    if left.contradicts(right) {
        let registers = left
            .rule
            .explain_contradicts(&right.rule)
            .into_iter()
            .collect();
        let explanation = Explanation::new(ExplanationRelation::Contradicts, left, right, registers)
            .label_terms(rule_factors(&left.rule).into_iter().chain(rule_factors(&right.rule)));
        lines.push(explanation.to_string());
    }
    if left.rule.consistent_with(&right.rule) {
        lines.push(explain(ExplanationRelation::ConsistentWith, left, right));
    }
    if lines.is_empty() {
        lines.push(format!("no relation found between {left} and {right}"));
    }
    lines
}

fn explain(relation: ExplanationRelation, left: &Holding, right: &Holding) -> String {
    Explanation::new(relation, left, right, Vec::new()).to_string()
}

fn rule_factors(rule: &Rule) -> Vec<&Factor> {
    rule.procedures
        .iter()
        .flat_map(|p| {
            p.inputs()
                .iter()
                .chain(p.despite().iter())
                .chain(p.outputs().iter())
        })
        .collect()
}
