//! # ComparableGroup and FactorSequence
//!
//! A `ComparableGroup` is an unordered collection matched by searching
//! correspondences between members; a `FactorSequence` is matched
//! position by position. Both thread one shared register through every
//! member comparison, so a binding forced by an early pairing constrains
//! every later one, and both report all valid registers rather than
//! stopping at an arbitrary first match: a locally valid register may be
//! globally inconsistent, so downstream callers must be able to try every
//! one before concluding failure.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dictum_factor::compare::{all, assignments, first, Flow, Sink};
use dictum_factor::{ContextRegister, Factor, TermId};

use crate::cache::{MatchCache, Relation};

// ─── ComparableGroup ─────────────────────────────────────────────────

/// An unordered collection of Factors with set semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparableGroup {
    factors: Vec<Factor>,
}

impl ComparableGroup {
    /// A group owning the given factors.
    pub fn new(factors: Vec<Factor>) -> Self {
        Self { factors }
    }

    /// The empty group.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Member factors, in insertion order.
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Iterate the members.
    pub fn iter(&self) -> impl Iterator<Item = &Factor> {
        self.factors.iter()
    }

    /// Generic terms reachable from any member, first-appearance order,
    /// deduplicated by id.
    pub fn generic_terms(&self) -> Vec<&Factor> {
        let mut out: Vec<&Factor> = Vec::new();
        for factor in &self.factors {
            for term in factor.generic_terms() {
                if !out.iter().any(|t| t.id() == term.id()) {
                    out.push(term);
                }
            }
        }
        out
    }

    /// Index of reachable generic terms by id.
    pub fn term_index(&self) -> BTreeMap<TermId, Factor> {
        self.factors.iter().flat_map(Factor::term_index).collect()
    }

    // ---- implies ----

    /// Whether some register makes every member of `other` implied by
    /// some member of this group.
    pub fn implies(&self, other: &ComparableGroup) -> bool {
        self.explain_implies(other, None).is_some()
    }

    /// First register under which this group entails `other`.
    pub fn explain_implies(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        let mut cache = MatchCache::new();
        first(|sink| self.implies_into(other, &incoming(context), &mut cache, sink))
    }

    /// Every register under which this group entails `other`.
    pub fn explanations_implies(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        let mut cache = MatchCache::new();
        all(|sink| self.implies_into(other, &incoming(context), &mut cache, sink))
    }

    /// Entailment search with a caller-provided cache, for composition
    /// layers that run several group queries per top-level operation.
    pub fn implies_into(
        &self,
        other: &ComparableGroup,
        ctx: &ContextRegister,
        cache: &mut MatchCache,
        sink: Sink,
    ) -> Flow {
        debug!(
            source = self.len(),
            target = other.len(),
            "group implication search"
        );
        cover(&other.factors, &self.factors, ctx, cache, sink)
    }

    // ---- means ----

    /// Whether some register pairs the two groups member-for-member with
    /// the same meaning.
    pub fn means(&self, other: &ComparableGroup) -> bool {
        self.explain_means(other, None).is_some()
    }

    /// First register under which the two groups mean the same thing.
    pub fn explain_means(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        let mut cache = MatchCache::new();
        first(|sink| self.means_into(other, &incoming(context), &mut cache, sink))
    }

    /// Every register under which the two groups mean the same thing.
    pub fn explanations_means(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        let mut cache = MatchCache::new();
        all(|sink| self.means_into(other, &incoming(context), &mut cache, sink))
    }

    /// Equivalence search with a caller-provided cache.
    pub fn means_into(
        &self,
        other: &ComparableGroup,
        ctx: &ContextRegister,
        cache: &mut MatchCache,
        sink: Sink,
    ) -> Flow {
        if self.len() != other.len() {
            return ControlFlow::Continue(());
        }
        let mut used = vec![false; self.factors.len()];
        bijection(&other.factors, &self.factors, &mut used, ctx, cache, sink)
    }

    // ---- contradicts ----

    /// Whether some register makes a member of this group incompatible
    /// with a member of `other`.
    pub fn contradicts(&self, other: &ComparableGroup) -> bool {
        self.explain_contradicts(other, None).is_some()
    }

    /// First register under which a cross pair contradicts.
    pub fn explain_contradicts(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        let mut cache = MatchCache::new();
        first(|sink| self.contradicts_into(other, &incoming(context), &mut cache, sink))
    }

    /// Every register under which a cross pair contradicts.
    pub fn explanations_contradicts(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        let mut cache = MatchCache::new();
        all(|sink| self.contradicts_into(other, &incoming(context), &mut cache, sink))
    }

    /// Contradiction search with a caller-provided cache.
    pub fn contradicts_into(
        &self,
        other: &ComparableGroup,
        ctx: &ContextRegister,
        cache: &mut MatchCache,
        sink: Sink,
    ) -> Flow {
        for left in &self.factors {
            for right in &other.factors {
                let bases = cache.registers(left, right, Relation::Contradicts);
                for base in bases.iter() {
                    if let Some(merged) = ctx.merge(base) {
                        sink(merged)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    // ---- consistent_with ----

    /// Whether at least one generic-term assignment lets both groups hold
    /// together.
    pub fn consistent_with(&self, other: &ComparableGroup) -> bool {
        self.explain_consistent_with(other, None).is_some()
    }

    /// First assignment under which no cross pair contradicts.
    pub fn explain_consistent_with(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| self.consistent_into(other, &incoming(context), sink))
    }

    /// Every assignment under which no cross pair contradicts.
    pub fn explanations_consistent_with(
        &self,
        other: &ComparableGroup,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        all(|sink| self.consistent_into(other, &incoming(context), sink))
    }

    fn consistent_into(&self, other: &ComparableGroup, ctx: &ContextRegister, sink: Sink) -> Flow {
        let ga = self.generic_terms();
        let gb = other.generic_terms();
        assignments(&ga, &gb, ctx, &mut |candidate| {
            let sealed = candidate.seal();
            let clash = self.factors.iter().any(|left| {
                other
                    .factors
                    .iter()
                    .any(|right| left.explain_contradicts(right, Some(&sealed)).is_some())
            });
            if clash {
                ControlFlow::Continue(())
            } else {
                sink(candidate)
            }
        })
    }

    // ---- composition ----

    /// Whether some member entails the single factor.
    pub fn implies_factor(&self, target: &Factor) -> bool {
        self.factors.iter().any(|f| f.implies(target))
    }

    /// The disjunction's shared content: each side's factors the other
    /// side implies, deduplicated by meaning. `None` when the two groups
    /// share nothing.
    pub fn shared_context_or(&self, other: &ComparableGroup) -> Option<ComparableGroup> {
        let mut kept: Vec<Factor> = Vec::new();
        for factor in self.factors.iter().chain(other.factors.iter()) {
            let implied_by_self = self.implies_factor(factor);
            let implied_by_other = other.implies_factor(factor);
            if implied_by_self && implied_by_other {
                push_unique(&mut kept, factor);
            }
        }
        if kept.is_empty() {
            None
        } else {
            Some(ComparableGroup::new(kept))
        }
    }

    /// Union keeping every member of this group and the members of
    /// `other` with no equivalent already present.
    pub fn union_with(&self, other: &ComparableGroup) -> ComparableGroup {
        let mut factors = self.factors.clone();
        for factor in &other.factors {
            push_unique(&mut factors, factor);
        }
        ComparableGroup::new(factors)
    }

    /// Addition: keep every member of this group, absorbing members of
    /// `other` already implied by one of ours.
    pub fn add(&self, other: &ComparableGroup) -> ComparableGroup {
        let mut factors = self.factors.clone();
        for factor in &other.factors {
            if !self.implies_factor(factor) {
                push_unique(&mut factors, factor);
            }
        }
        ComparableGroup::new(factors)
    }

    /// Every member translated through a register, replacing mapped
    /// generic terms with their counterparts from `replacements`.
    pub fn with_context(
        &self,
        mapping: &ContextRegister,
        replacements: &BTreeMap<TermId, Factor>,
    ) -> ComparableGroup {
        ComparableGroup::new(
            self.factors
                .iter()
                .map(|f| f.with_context(mapping, replacements))
                .collect(),
        )
    }
}

impl From<Vec<Factor>> for ComparableGroup {
    fn from(factors: Vec<Factor>) -> Self {
        Self::new(factors)
    }
}

impl FromIterator<Factor> for ComparableGroup {
    fn from_iter<I: IntoIterator<Item = Factor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn push_unique(kept: &mut Vec<Factor>, candidate: &Factor) {
    if !kept.iter().any(|k| k.means(candidate)) {
        kept.push(candidate.clone());
    }
}

fn incoming(context: Option<&ContextRegister>) -> ContextRegister {
    context.cloned().unwrap_or_default()
}

/// Cover every target with some source under one shared register,
/// backtracking across source choices and per-pair registers.
fn cover(
    targets: &[Factor],
    sources: &[Factor],
    ctx: &ContextRegister,
    cache: &mut MatchCache,
    sink: Sink,
) -> Flow {
    match targets.split_first() {
        None => sink(ctx.clone()),
        Some((target, rest)) => {
            for source in sources {
                let bases = cache.registers(source, target, Relation::Implies);
                for base in bases.iter() {
                    if let Some(merged) = ctx.merge(base) {
                        cover(rest, sources, &merged, cache, &mut *sink)?;
                    }
                }
            }
            ControlFlow::Continue(())
        }
    }
}

/// Pair every target with a distinct source of the same meaning under
/// one shared register.
fn bijection(
    targets: &[Factor],
    sources: &[Factor],
    used: &mut Vec<bool>,
    ctx: &ContextRegister,
    cache: &mut MatchCache,
    sink: Sink,
) -> Flow {
    match targets.split_first() {
        None => sink(ctx.clone()),
        Some((target, rest)) => {
            for index in 0..sources.len() {
                if used[index] {
                    continue;
                }
                let bases = cache.registers(&sources[index], target, Relation::Means);
                for base in bases.iter() {
                    if let Some(merged) = ctx.merge(base) {
                        used[index] = true;
                        let flow = bijection(rest, sources, used, &merged, cache, &mut *sink);
                        used[index] = false;
                        flow?;
                    }
                }
            }
            ControlFlow::Continue(())
        }
    }
}

// ─── FactorSequence ──────────────────────────────────────────────────

/// An order-sensitive collection: the factor at position *i* compares
/// only against position *i*.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorSequence {
    factors: Vec<Factor>,
}

impl FactorSequence {
    /// A sequence owning the given factors, in order.
    pub fn new(factors: Vec<Factor>) -> Self {
        Self { factors }
    }

    /// Member factors, in positional order.
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the sequence has no positions.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Whether some register makes every position of this sequence entail
    /// the same position of `other`. Length mismatches never entail.
    pub fn implies(&self, other: &FactorSequence) -> bool {
        self.explain_implies(other, None).is_some()
    }

    /// First register for positional entailment.
    pub fn explain_implies(
        &self,
        other: &FactorSequence,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| self.positional_into(other, &incoming(context), Relation::Implies, sink))
    }

    /// Whether some register makes the sequences equivalent position by
    /// position.
    pub fn means(&self, other: &FactorSequence) -> bool {
        self.explain_means(other, None).is_some()
    }

    /// First register for positional equivalence.
    pub fn explain_means(
        &self,
        other: &FactorSequence,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| self.positional_into(other, &incoming(context), Relation::Means, sink))
    }

    fn positional_into(
        &self,
        other: &FactorSequence,
        ctx: &ContextRegister,
        relation: Relation,
        sink: Sink,
    ) -> Flow {
        if self.len() != other.len() {
            return ControlFlow::Continue(());
        }
        let mut cache = MatchCache::new();
        positional(&self.factors, &other.factors, ctx, relation, &mut cache, sink)
    }

    /// The despite query: whether an assignment of generic terms lets the
    /// two collections coexist, checked pairwise with no positional
    /// alignment.
    pub fn despite(&self, other: &FactorSequence) -> bool {
        self.explain_despite(other, None).is_some()
    }

    /// First assignment under which no cross pair contradicts.
    pub fn explain_despite(
        &self,
        other: &FactorSequence,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        let left = ComparableGroup::new(self.factors.clone());
        let right = ComparableGroup::new(other.factors.clone());
        left.explain_consistent_with(&right, context)
    }
}

impl From<Vec<Factor>> for FactorSequence {
    fn from(factors: Vec<Factor>) -> Self {
        Self::new(factors)
    }
}

/// Compare positions in order under one shared register.
fn positional(
    left: &[Factor],
    right: &[Factor],
    ctx: &ContextRegister,
    relation: Relation,
    cache: &mut MatchCache,
    sink: Sink,
) -> Flow {
    match (left.split_first(), right.split_first()) {
        (None, None) => sink(ctx.clone()),
        (Some((l, l_rest)), Some((r, r_rest))) => {
            let bases = cache.registers(l, r, relation);
            for base in bases.iter() {
                if let Some(merged) = ctx.merge(base) {
                    positional(l_rest, r_rest, &merged, relation, cache, &mut *sink)?;
                }
            }
            ControlFlow::Continue(())
        }
        _ => ControlFlow::Continue(()),
    }
}
