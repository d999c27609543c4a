//! # Factor Variants
//!
//! The atomic comparable unit: a `Fact` wrapping a predicate and its
//! terms, an `Entity` placeholder, an `Exhibit` (a physical item that may
//! carry an attributed statement), or `Evidence` (an exhibit offered to
//! prove an effect fact).
//!
//! ## Design Decision
//!
//! The variants share one capability set through a tagged enum with
//! exhaustive matches rather than a trait-object hierarchy. Four variants
//! with heavily shared generic-term machinery gain nothing from dynamic
//! dispatch, and the enum keeps serde derivation and structural equality
//! derivable.
//!
//! ## Invariants
//!
//! - A fact's term count must equal its template's slot count.
//! - Within one construction, a term id may recur only with identical
//!   structure (the DAG-coherence pass; ownership already rules out true
//!   cycles).
//! - `absent` means negation-by-nonexistence and is distinct from a false
//!   truth flag: "no evidence of a beard was found" is not "evidence that
//!   there was no beard".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use dictum_core::{Predicate, StructureError};

use crate::term::TermId;

fn default_true() -> bool {
    true
}

// ─── Variants ────────────────────────────────────────────────────────

/// A generic, interchangeable participant: a person, thing, or place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Structural identity of this term.
    #[serde(default)]
    pub id: TermId,
    /// Display label; plays no part in matching while the entity is generic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether this entity is an interchangeable placeholder. Non-generic
    /// entities compare nominally by label.
    #[serde(default = "default_true")]
    pub generic: bool,
}

impl Entity {
    /// A generic entity with a display label.
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            id: TermId::new(),
            label: Some(label.into()),
            generic: true,
        }
    }

    /// Mark this entity non-generic: it stands for the named individual
    /// and matches only entities with the same label.
    pub fn specific(mut self) -> Self {
        self.generic = false;
        self
    }
}

/// A proposition about zero or more terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Structural identity, used when the fact itself serves as a generic term.
    #[serde(default)]
    pub id: TermId,
    /// The templated proposition.
    pub predicate: Predicate,
    /// Terms filling the template's slots, in slot order.
    #[serde(default)]
    pub terms: Vec<Factor>,
    /// Negation-by-nonexistence.
    #[serde(default)]
    pub absent: bool,
    /// Whether the whole fact is an interchangeable placeholder.
    #[serde(default)]
    pub generic: bool,
    /// Optional name for back-reference from authored documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Fact {
    /// Build a fact, validating slot count and term coherence.
    ///
    /// # Errors
    ///
    /// [`StructureError::SlotCountMismatch`] when the term count differs
    /// from the template's slot count; [`StructureError::IncoherentTerm`]
    /// when one term id recurs with conflicting structure.
    pub fn new(predicate: Predicate, terms: Vec<Factor>) -> Result<Self, StructureError> {
        let slots = predicate.slot_count();
        if slots != terms.len() {
            return Err(StructureError::SlotCountMismatch {
                template: predicate.content.clone(),
                slots,
                terms: terms.len(),
            });
        }
        let fact = Self {
            id: TermId::new(),
            predicate,
            terms,
            absent: false,
            generic: false,
            name: None,
        };
        validate_coherence(fact.terms.iter())?;
        Ok(fact)
    }

    /// The same fact marked absent.
    pub fn absent(mut self) -> Self {
        self.absent = true;
        self
    }

    /// The same fact marked as a generic placeholder.
    pub fn generic(mut self) -> Self {
        self.generic = true;
        self
    }

    /// Attach a back-reference name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A physical item offered in court, optionally carrying an attributed
/// statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibit {
    /// Structural identity.
    #[serde(default)]
    pub id: TermId,
    /// Physical form, e.g. `"testimony"` or `"contract"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// The statement the exhibit asserts, if any (a [`Fact`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<Box<Factor>>,
    /// Who made the statement (an [`Entity`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stated_by: Option<Box<Factor>>,
    /// Negation-by-nonexistence.
    #[serde(default)]
    pub absent: bool,
    /// Whether the exhibit is an interchangeable placeholder.
    #[serde(default)]
    pub generic: bool,
    /// Optional name for back-reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Exhibit {
    /// An exhibit of the given form with no statement.
    pub fn of_form(form: impl Into<String>) -> Self {
        Self {
            id: TermId::new(),
            form: Some(form.into()),
            statement: None,
            stated_by: None,
            absent: false,
            generic: false,
            name: None,
        }
    }

    /// Attach the statement the exhibit asserts.
    pub fn stating(mut self, statement: Factor, by: Option<Factor>) -> Self {
        self.statement = Some(Box::new(statement));
        self.stated_by = by.map(Box::new);
        self
    }

    /// The same exhibit marked absent.
    pub fn absent(mut self) -> Self {
        self.absent = true;
        self
    }
}

/// An exhibit offered to prove an effect fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Structural identity.
    #[serde(default)]
    pub id: TermId,
    /// The underlying exhibit (an [`Exhibit`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhibit: Option<Box<Factor>>,
    /// The fact the evidence tends to prove (a [`Fact`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_effect: Option<Box<Factor>>,
    /// Negation-by-nonexistence.
    #[serde(default)]
    pub absent: bool,
    /// Whether the evidence is an interchangeable placeholder.
    #[serde(default)]
    pub generic: bool,
    /// Optional name for back-reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Evidence {
    /// Evidence pairing an exhibit with the fact it tends to prove.
    pub fn new(exhibit: Option<Factor>, to_effect: Option<Factor>) -> Self {
        Self {
            id: TermId::new(),
            exhibit: exhibit.map(Box::new),
            to_effect: to_effect.map(Box::new),
            absent: false,
            generic: false,
            name: None,
        }
    }

    /// The same evidence marked absent.
    pub fn absent(mut self) -> Self {
        self.absent = true;
        self
    }
}

// ─── Factor ──────────────────────────────────────────────────────────

/// The variant of a [`Factor`]. Comparison across different kinds is
/// always empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// A proposition about terms.
    Fact,
    /// A generic participant.
    Entity,
    /// A physical item offered in court.
    Exhibit,
    /// An exhibit offered to prove an effect.
    Evidence,
}

impl fmt::Display for FactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fact => "fact",
            Self::Entity => "entity",
            Self::Exhibit => "exhibit",
            Self::Evidence => "evidence",
        };
        f.write_str(s)
    }
}

/// The atomic comparable legal statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Factor {
    /// A proposition about terms.
    Fact(Fact),
    /// A generic participant.
    Entity(Entity),
    /// A physical item offered in court.
    Exhibit(Exhibit),
    /// An exhibit offered to prove an effect.
    Evidence(Evidence),
}

impl Factor {
    /// Convenience: a generic entity factor with a display label.
    pub fn entity(label: impl Into<String>) -> Factor {
        Factor::Entity(Entity::named(label))
    }

    /// Convenience: a fact factor, validating structure.
    pub fn fact(predicate: Predicate, terms: Vec<Factor>) -> Result<Factor, StructureError> {
        Ok(Factor::Fact(Fact::new(predicate, terms)?))
    }

    /// The variant of this factor.
    pub fn kind(&self) -> FactorKind {
        match self {
            Factor::Fact(_) => FactorKind::Fact,
            Factor::Entity(_) => FactorKind::Entity,
            Factor::Exhibit(_) => FactorKind::Exhibit,
            Factor::Evidence(_) => FactorKind::Evidence,
        }
    }

    /// Structural identity of this factor as a term.
    pub fn id(&self) -> TermId {
        match self {
            Factor::Fact(f) => f.id,
            Factor::Entity(e) => e.id,
            Factor::Exhibit(e) => e.id,
            Factor::Evidence(e) => e.id,
        }
    }

    /// Whether the factor is asserted by nonexistence.
    pub fn is_absent(&self) -> bool {
        match self {
            Factor::Fact(f) => f.absent,
            Factor::Entity(_) => false,
            Factor::Exhibit(e) => e.absent,
            Factor::Evidence(e) => e.absent,
        }
    }

    /// Whether the factor is an interchangeable placeholder.
    pub fn is_generic(&self) -> bool {
        match self {
            Factor::Fact(f) => f.generic,
            Factor::Entity(e) => e.generic,
            Factor::Exhibit(e) => e.generic,
            Factor::Evidence(e) => e.generic,
        }
    }

    /// Back-reference name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Factor::Fact(f) => f.name.as_deref(),
            Factor::Entity(_) => None,
            Factor::Exhibit(e) => e.name.as_deref(),
            Factor::Evidence(e) => e.name.as_deref(),
        }
    }

    /// Display label: entity label, back-reference name, or a short id.
    pub fn display_label(&self) -> String {
        if let Factor::Entity(e) = self {
            if let Some(label) = &e.label {
                return label.clone();
            }
        }
        if let Some(name) = self.name() {
            return name.to_string();
        }
        format!("{}-{}", self.kind(), self.id().short())
    }

    /// Direct constituent terms, in positional order.
    pub fn terms(&self) -> Vec<&Factor> {
        match self {
            Factor::Fact(f) => f.terms.iter().collect(),
            Factor::Entity(_) => Vec::new(),
            Factor::Exhibit(e) => [e.statement.as_deref(), e.stated_by.as_deref()]
                .into_iter()
                .flatten()
                .collect(),
            Factor::Evidence(e) => [e.exhibit.as_deref(), e.to_effect.as_deref()]
                .into_iter()
                .flatten()
                .collect(),
        }
    }

    /// Generic terms reachable from this factor, in first-appearance
    /// order, deduplicated by id. A generic factor is its own (only)
    /// generic term; recursion does not descend inside it.
    pub fn generic_terms(&self) -> Vec<&Factor> {
        let mut out: Vec<&Factor> = Vec::new();
        collect_generic_terms(self, &mut out);
        out
    }

    /// Index of reachable generic terms by id.
    pub fn term_index(&self) -> BTreeMap<TermId, Factor> {
        self.generic_terms()
            .into_iter()
            .map(|t| (t.id(), t.clone()))
            .collect()
    }

    /// Run the DAG-coherence pass over this factor and everything nested
    /// in it.
    pub fn validate(&self) -> Result<(), StructureError> {
        validate_coherence(std::iter::once(self))
    }

    /// The same factor with the absent flag cleared, used when comparing
    /// an absence against the claim that would discharge it.
    pub(crate) fn as_present(&self) -> Factor {
        let mut present = self.clone();
        match &mut present {
            Factor::Fact(f) => f.absent = false,
            Factor::Entity(_) => {}
            Factor::Exhibit(e) => e.absent = false,
            Factor::Evidence(e) => e.absent = false,
        }
        present
    }

    /// Substitute generic terms through a register.
    ///
    /// Each generic factor whose id the register maps is replaced by the
    /// factor the target id names in `replacements`; everything else is
    /// rebuilt with its terms substituted recursively. Used by rule
    /// composition to translate one rule's factors into another's term
    /// space.
    pub fn with_context(
        &self,
        mapping: &crate::context::ContextRegister,
        replacements: &BTreeMap<TermId, Factor>,
    ) -> Factor {
        if self.is_generic() {
            if let Some(target) = mapping.get(self.id()) {
                if let Some(replacement) = replacements.get(&target) {
                    return replacement.clone();
                }
            }
            return self.clone();
        }
        let substitute =
            |f: &Factor| -> Factor { f.with_context(mapping, replacements) };
        let boxed = |f: &Option<Box<Factor>>| -> Option<Box<Factor>> {
            f.as_deref().map(|inner| Box::new(substitute(inner)))
        };
        match self {
            Factor::Entity(_) => self.clone(),
            Factor::Fact(fact) => {
                let mut next = fact.clone();
                next.terms = fact.terms.iter().map(substitute).collect();
                Factor::Fact(next)
            }
            Factor::Exhibit(exhibit) => {
                let mut next = exhibit.clone();
                next.statement = boxed(&exhibit.statement);
                next.stated_by = boxed(&exhibit.stated_by);
                Factor::Exhibit(next)
            }
            Factor::Evidence(evidence) => {
                let mut next = evidence.clone();
                next.exhibit = boxed(&evidence.exhibit);
                next.to_effect = boxed(&evidence.to_effect);
                Factor::Evidence(next)
            }
        }
    }
}

fn collect_generic_terms<'a>(factor: &'a Factor, out: &mut Vec<&'a Factor>) {
    if factor.is_generic() {
        if !out.iter().any(|t| t.id() == factor.id()) {
            out.push(factor);
        }
        return;
    }
    for term in factor.terms() {
        collect_generic_terms(term, out);
    }
}

/// Reject constructions where one term id recurs with conflicting
/// structure.
fn validate_coherence<'a>(
    roots: impl Iterator<Item = &'a Factor>,
) -> Result<(), StructureError> {
    let mut seen: BTreeMap<TermId, &Factor> = BTreeMap::new();
    let mut stack: Vec<&Factor> = roots.collect();
    while let Some(factor) = stack.pop() {
        match seen.get(&factor.id()) {
            Some(existing) if *existing != factor => {
                return Err(StructureError::IncoherentTerm {
                    id: factor.id().to_string(),
                });
            }
            Some(_) => continue,
            None => {
                seen.insert(factor.id(), factor);
                stack.extend(factor.terms());
            }
        }
    }
    Ok(())
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factor::Entity(e) => {
                write!(f, "<{}>", self.display_label())?;
                if !e.generic {
                    f.write_str(" (specific)")?;
                }
                Ok(())
            }
            Factor::Fact(fact) => {
                if fact.absent {
                    f.write_str("absent ")?;
                }
                f.write_str("the fact that ")?;
                if !fact.predicate.truth {
                    f.write_str("it was false that ")?;
                }
                let labels: Vec<String> =
                    fact.terms.iter().map(|t| t.display_label()).collect();
                f.write_str(&fact.predicate.content_with(&labels))?;
                if let Some(q) = &fact.predicate.quantity {
                    write!(f, " {q}")?;
                }
                Ok(())
            }
            Factor::Exhibit(e) => {
                if e.absent {
                    f.write_str("absent ")?;
                }
                match &e.form {
                    Some(form) => write!(f, "the {form}")?,
                    None => f.write_str("the exhibit")?,
                }
                if let Some(statement) = &e.statement {
                    write!(f, " asserting {statement}")?;
                }
                Ok(())
            }
            Factor::Evidence(e) => {
                if e.absent {
                    f.write_str("absent ")?;
                }
                f.write_str("evidence")?;
                if let Some(exhibit) = &e.exhibit {
                    write!(f, " of {exhibit}")?;
                }
                if let Some(effect) = &e.to_effect {
                    write!(f, ", which tends to prove {effect}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictum_core::Predicate;

    fn shot_fact() -> Fact {
        let alice = Factor::entity("Alice");
        let bob = Factor::entity("Bob");
        Fact::new(
            Predicate::new("{shooter} shot {victim}").unwrap(),
            vec![alice, bob],
        )
        .unwrap()
    }

    // ---- construction ----

    #[test]
    fn test_slot_count_enforced() {
        let err = Fact::new(
            Predicate::new("{shooter} shot {victim}").unwrap(),
            vec![Factor::entity("Alice")],
        )
        .unwrap_err();
        assert!(matches!(err, StructureError::SlotCountMismatch { .. }));
    }

    #[test]
    fn test_shared_term_id_with_same_structure_accepted() {
        let alice = Factor::entity("Alice");
        let fact = Fact::new(
            Predicate::new("{a} shot {b}").unwrap(),
            vec![alice.clone(), alice],
        );
        // Injectivity of matching is a comparison concern; construction
        // permits one term filling two slots.
        assert!(fact.is_ok());
    }

    #[test]
    fn test_incoherent_term_rejected() {
        let alice = Factor::entity("Alice");
        let mut impostor = alice.clone();
        if let Factor::Entity(e) = &mut impostor {
            e.label = Some("Definitely Not Alice".to_string());
        }
        let err = Fact::new(
            Predicate::new("{a} shot {b}").unwrap(),
            vec![alice, impostor],
        )
        .unwrap_err();
        assert!(matches!(err, StructureError::IncoherentTerm { .. }));
    }

    // ---- term iteration ----

    #[test]
    fn test_generic_terms_in_order() {
        let fact = Factor::Fact(shot_fact());
        let labels: Vec<String> = fact
            .generic_terms()
            .iter()
            .map(|t| t.display_label())
            .collect();
        assert_eq!(labels, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_generic_fact_is_its_own_term() {
        let fact = Factor::Fact(shot_fact().generic());
        let terms = fact.generic_terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].id(), fact.id());
    }

    #[test]
    fn test_nested_term_collection() {
        let inner = Factor::Fact(shot_fact());
        let exhibit = Factor::Exhibit(
            Exhibit::of_form("testimony").stating(inner, Some(Factor::entity("Carol"))),
        );
        let labels: Vec<String> = exhibit
            .generic_terms()
            .iter()
            .map(|t| t.display_label())
            .collect();
        assert_eq!(labels, vec!["Alice", "Bob", "Carol"]);
    }

    // ---- substitution ----

    #[test]
    fn test_with_context_replaces_mapped_terms() {
        let fact = Factor::Fact(shot_fact());
        let dan = Factor::entity("Dan");
        let alice_id = fact.generic_terms()[0].id();
        let mapping = crate::context::ContextRegister::from_pairs([(alice_id, dan.id())]).unwrap();
        let replacements = BTreeMap::from([(dan.id(), dan.clone())]);
        let translated = fact.with_context(&mapping, &replacements);
        assert_eq!(
            format!("{translated}"),
            "the fact that Dan shot Bob"
        );
    }

    // ---- display ----

    #[test]
    fn test_display_fact() {
        let fact = Factor::Fact(shot_fact());
        assert_eq!(format!("{fact}"), "the fact that Alice shot Bob");
    }

    #[test]
    fn test_display_absent_fact() {
        let fact = Factor::Fact(shot_fact().absent());
        assert_eq!(format!("{fact}"), "absent the fact that Alice shot Bob");
    }

    // ---- serde ----

    #[test]
    fn test_serde_roundtrip() {
        let fact = Factor::Fact(shot_fact());
        let json = serde_json::to_string(&fact).unwrap();
        let back: Factor = serde_json::from_str(&json).unwrap();
        assert_eq!(fact, back);
    }
}
