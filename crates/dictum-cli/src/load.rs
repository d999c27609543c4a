//! # YAML Holdings Loader
//!
//! Deserializes an authored holdings file into the core data model. The
//! raw document is a flat, human-writable shape: facts reference entities
//! by label, and every occurrence of one label within a file resolves to
//! the same generic term, so cross-factor matching works the way the
//! author reads the document. No schema validation happens here beyond
//! what serde and the core constructors enforce.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use dictum_core::{Comparator, Predicate, Quantity, QuantityClause};
use dictum_factor::Factor;
use dictum_rule::{Enactment, Holding, Procedure, Rule};

fn default_true() -> bool {
    true
}

/// Top-level document shape.
#[derive(Debug, Deserialize)]
pub struct HoldingsFile {
    /// The holdings the file asserts.
    pub holdings: Vec<RawHolding>,
}

/// One authored holding.
#[derive(Debug, Deserialize)]
pub struct RawHolding {
    pub rule: RawRule,
    #[serde(default = "default_true")]
    pub rule_valid: bool,
    #[serde(default = "default_true")]
    pub decided: bool,
}

/// One authored rule. Factors are written inline; alternatives are not
/// authored directly (they arise from union operations).
#[derive(Debug, Deserialize)]
pub struct RawRule {
    #[serde(default)]
    pub inputs: Vec<RawFactor>,
    #[serde(default)]
    pub despite: Vec<RawFactor>,
    pub outputs: Vec<RawFactor>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub universal: bool,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default)]
    pub enactments: Vec<RawEnactment>,
}

/// An authored fact: a template, entity labels for its slots, and an
/// optional quantity clause.
#[derive(Debug, Deserialize)]
pub struct RawFactor {
    pub content: String,
    #[serde(default = "default_true")]
    pub truth: bool,
    #[serde(default)]
    pub absent: bool,
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub quantity: Option<RawQuantity>,
}

/// An authored quantity: a comparator sign with either an amount (plus
/// optional unit) or a calendar date.
#[derive(Debug, Deserialize)]
pub struct RawQuantity {
    pub sign: Comparator,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct RawEnactment {
    pub source: String,
    #[serde(default)]
    pub span: Option<(usize, usize)>,
}

/// Per-file entity resolution: one label, one term.
#[derive(Debug, Default)]
struct EntityPool {
    entities: BTreeMap<String, Factor>,
}

impl EntityPool {
    fn resolve(&mut self, label: &str) -> Factor {
        self.entities
            .entry(label.to_string())
            .or_insert_with(|| Factor::entity(label))
            .clone()
    }
}

/// Load every holding in a YAML file.
pub fn load_holdings(path: &Path) -> Result<Vec<Holding>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading holdings file {}", path.display()))?;
    parse_holdings(&text).with_context(|| format!("in holdings file {}", path.display()))
}

/// Parse holdings from YAML text.
pub fn parse_holdings(text: &str) -> Result<Vec<Holding>> {
    let file: HoldingsFile = serde_yaml::from_str(text).context("parsing YAML")?;
    let mut pool = EntityPool::default();
    file.holdings
        .iter()
        .map(|raw| build_holding(raw, &mut pool))
        .collect()
}

fn build_holding(raw: &RawHolding, pool: &mut EntityPool) -> Result<Holding> {
    let mut rule = Rule::new(Procedure::new(
        build_factors(&raw.rule.inputs, pool)?,
        build_factors(&raw.rule.despite, pool)?,
        build_factors(&raw.rule.outputs, pool)?,
    ));
    rule.mandatory = raw.rule.mandatory;
    rule.universal = raw.rule.universal;
    rule.exclusive = raw.rule.exclusive;
    for enactment in &raw.rule.enactments {
        let mut e = Enactment::new(enactment.source.clone());
        if let Some((start, end)) = enactment.span {
            e = e.with_span(start, end);
        }
        rule = rule.with_enactment(e);
    }
    let mut holding = Holding::new(rule);
    holding.rule_valid = raw.rule_valid;
    holding.decided = raw.decided;
    Ok(holding)
}

fn build_factors(raw: &[RawFactor], pool: &mut EntityPool) -> Result<Vec<Factor>> {
    raw.iter().map(|r| build_factor(r, pool)).collect()
}

fn build_factor(raw: &RawFactor, pool: &mut EntityPool) -> Result<Factor> {
    let mut predicate = Predicate::new(&raw.content)
        .with_context(|| format!("in template {:?}", raw.content))?;
    if !raw.truth {
        predicate = predicate.negated();
    }
    if let Some(q) = &raw.quantity {
        predicate = predicate.with_quantity(QuantityClause::new(q.sign, build_quantity(q)?));
    }
    let terms = raw.terms.iter().map(|label| pool.resolve(label)).collect();
    let factor =
        Factor::fact(predicate, terms).with_context(|| format!("in fact {:?}", raw.content))?;
    Ok(match factor {
        Factor::Fact(f) if raw.absent => Factor::Fact(f.absent()),
        other => other,
    })
}

fn build_quantity(raw: &RawQuantity) -> Result<Quantity> {
    match (raw.amount, &raw.unit, raw.date) {
        (Some(magnitude), Some(unit), None) => Ok(Quantity::measure(magnitude, unit)),
        (Some(number), None, None) => Ok(Quantity::Number(number)),
        (None, None, Some(date)) => Ok(Quantity::Date(date)),
        _ => bail!("a quantity needs either an amount (with optional unit) or a date"),
    }
}
