//! # Predicate — Templated Propositions
//!
//! A `Predicate` is the content of a legal statement: a template with
//! named `{slot}` placeholders for the terms supplied alongside it, a
//! truth flag, and an optional quantity clause.
//!
//! ## Invariants
//!
//! - Slot order defines positional meaning for supplied terms. Slot names
//!   are authoring conveniences; two templates that differ only in slot
//!   names are the same template.
//! - Slot names must be unique within one template. Duplicates are a
//!   construction-time [`StructureError`], never silently accepted.
//!
//! ## Comparison
//!
//! `means` is structural equivalence; `implies` is entailment of the
//! truth-qualified claim (for quantity predicates, subset of satisfying
//! sets after unit normalization); `contradicts` is defined only between
//! predicates sharing a template.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StructureError;
use crate::quantity::QuantityClause;

/// Matches one `{slot}` placeholder. Slot names are word characters,
/// spaces, and hyphens.
fn slot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([\w][\w\s-]*)\}").expect("slot pattern is valid"))
}

/// A templated proposition with blank slots for terms.
///
/// The proposition `"{suspect} was the owner of {weapon}"` with
/// `truth: false` states that the slot-0 term was *not* the owner of the
/// slot-1 term. A quantity clause turns the template into a bounded claim,
/// e.g. `"the length of {hair} was" >= 5 millimeter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Template text with `{slot}` placeholders.
    pub content: String,
    /// Whether the proposition is asserted true or false.
    #[serde(default = "default_true")]
    pub truth: bool,
    /// Optional comparator-bounded quantity completing the proposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<QuantityClause>,
}

fn default_true() -> bool {
    true
}

impl Predicate {
    /// Build a predicate asserted true with no quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DuplicateSlot`] when a slot name repeats
    /// within the template, or [`StructureError::UnterminatedSlot`] when a
    /// `{` is never closed.
    pub fn new(content: impl Into<String>) -> Result<Self, StructureError> {
        let content = content.into();
        validate_template(&content)?;
        Ok(Self {
            content,
            truth: true,
            quantity: None,
        })
    }

    /// Same template asserted with the opposite truth value.
    pub fn negated(&self) -> Self {
        Self {
            content: self.content.clone(),
            truth: !self.truth,
            quantity: self.quantity.clone(),
        }
    }

    /// Attach a quantity clause, keeping template and truth.
    pub fn with_quantity(mut self, clause: QuantityClause) -> Self {
        self.quantity = Some(clause);
        self
    }

    /// The slot names of the template, in positional order.
    pub fn slots(&self) -> Vec<String> {
        slot_pattern()
            .captures_iter(&self.content)
            .map(|c| c[1].to_string())
            .collect()
    }

    /// Number of terms this template requires.
    pub fn slot_count(&self) -> usize {
        slot_pattern().find_iter(&self.content).count()
    }

    /// The template with slot names erased, so templates differing only in
    /// slot naming compare as the same.
    pub fn normalized_content(&self) -> String {
        slot_pattern().replace_all(&self.content, "{}").into_owned()
    }

    /// Whether the two predicates share a template (slot names ignored).
    pub fn same_template(&self, other: &Predicate) -> bool {
        self.normalized_content() == other.normalized_content()
    }

    /// Substitute the given texts into the template's slots, in order.
    /// Surplus slots are left as written; surplus texts are ignored.
    pub fn content_with(&self, texts: &[String]) -> String {
        let mut i = 0;
        slot_pattern()
            .replace_all(&self.content, |_: &regex::Captures<'_>| {
                let text = texts.get(i).cloned().unwrap_or_else(|| "___".to_string());
                i += 1;
                text
            })
            .into_owned()
    }

    /// Structural equivalence: same template and truth, and equal
    /// quantity bounds under the same comparator (or no quantity on
    /// either side).
    pub fn means(&self, other: &Predicate) -> bool {
        if !self.same_template(other) {
            return false;
        }
        match (&self.quantity, &other.quantity) {
            (None, None) => self.truth == other.truth,
            (Some(a), Some(b)) => self.truth == other.truth && a.means(b),
            _ => false,
        }
    }

    /// Whether this predicate's truth-qualified claim entails `other`'s.
    ///
    /// Quantity predicates entail when the satisfying set of self's
    /// normalized claim is a subset of other's. Non-quantity predicates
    /// entail only on exact truth match.
    pub fn implies(&self, other: &Predicate) -> bool {
        if !self.same_template(other) {
            return false;
        }
        match (&self.quantity, &other.quantity) {
            (None, None) => self.truth == other.truth,
            (Some(a), Some(b)) => a.claim(self.truth).implies(&b.claim(other.truth)),
            _ => false,
        }
    }

    /// Whether the two predicates cannot both hold.
    ///
    /// Defined only between predicates sharing a template: disjoint
    /// satisfying sets for quantity predicates, or opposite truth values
    /// when either side is non-quantitative.
    pub fn contradicts(&self, other: &Predicate) -> bool {
        if !self.same_template(other) {
            return false;
        }
        match (&self.quantity, &other.quantity) {
            (Some(a), Some(b)) => a.claim(self.truth).contradicts(&b.claim(other.truth)),
            // If either predicate is non-quantitative, contradiction
            // requires simple truth-value opposition.
            _ => self.truth != other.truth,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.truth {
            f.write_str("it was false that ")?;
        }
        f.write_str(&self.content)?;
        if let Some(q) = &self.quantity {
            write!(f, " {q}")?;
        }
        Ok(())
    }
}

/// Reject templates with duplicate slot names or unbalanced delimiters.
fn validate_template(content: &str) -> Result<(), StructureError> {
    let mut depth = 0usize;
    for ch in content.chars() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or(StructureError::UnterminatedSlot {
                    template: content.to_string(),
                })?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(StructureError::UnterminatedSlot {
            template: content.to_string(),
        });
    }
    let mut seen = std::collections::BTreeSet::new();
    for cap in slot_pattern().captures_iter(content) {
        let name = cap[1].to_string();
        if !seen.insert(name.clone()) {
            return Err(StructureError::DuplicateSlot {
                name,
                template: content.to_string(),
            });
        }
    }
    Ok(())
}
