//! # The Comparison Engine
//!
//! Decides `means`, `implies`, `contradicts`, and `consistent_with`
//! between two Factors under some consistent renaming of their generic
//! terms. Every relation takes an optional incoming [`ContextRegister`]
//! and yields zero or more outgoing registers.
//!
//! ## Search shape
//!
//! The engine is a depth-first backtracking search. An immutable partial
//! register is threaded through each recursive call; a pair binding that
//! conflicts with the register fails that branch and the search
//! backtracks. Results are reported through a sink returning
//! [`ControlFlow`]: breaking after the first register gives the cheap
//! entry point, continuing enumerates every valid register. Recomputation
//! from the top is acceptable; there is no hidden cursor state.
//!
//! ## Semantics notes
//!
//! - Cross-variant comparisons are empty, never an error.
//! - A generic factor is a placeholder: it matches any factor of its kind,
//!   binding its id in the register.
//! - The `absent` flag inverts implication: absent(A) implies absent(B)
//!   exactly when present(B) implies present(A). An absence of the
//!   narrower claim does not establish absence of the broader one.
//! - `consistent_with` is a satisfiability search over generic-term
//!   assignments, not the negation of contradiction enumeration.

use std::ops::ControlFlow;

use crate::context::ContextRegister;
use crate::factor::{Factor, FactorKind};

/// Continuation signal for the search.
pub type Flow = ControlFlow<()>;

/// Result sink. Return `Break` to stop the search.
pub type Sink<'a> = &'a mut dyn FnMut(ContextRegister) -> Flow;

/// Relation applied to nested term pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rel {
    Means,
    Implies,
}

// ─── Public API ──────────────────────────────────────────────────────

impl Factor {
    /// Whether some register makes the two factors structurally identical.
    pub fn means(&self, other: &Factor) -> bool {
        self.explain_means(other, None).is_some()
    }

    /// First register under which the two factors mean the same thing.
    pub fn explain_means(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| means_into(self, other, &incoming(context), sink))
    }

    /// Every register under which the two factors mean the same thing.
    pub fn explanations_means(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        all(|sink| means_into(self, other, &incoming(context), sink))
    }

    /// Whether some register makes this factor entail `other`.
    pub fn implies(&self, other: &Factor) -> bool {
        self.explain_implies(other, None).is_some()
    }

    /// First register under which this factor entails `other`.
    pub fn explain_implies(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| implies_into(self, other, &incoming(context), sink))
    }

    /// Every register under which this factor entails `other`.
    pub fn explanations_implies(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        all(|sink| implies_into(self, other, &incoming(context), sink))
    }

    /// Whether some register makes the two factors incompatible.
    pub fn contradicts(&self, other: &Factor) -> bool {
        self.explain_contradicts(other, None).is_some()
    }

    /// First register under which the two factors cannot both hold.
    pub fn explain_contradicts(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| contradicts_into(self, other, &incoming(context), sink))
    }

    /// Every register under which the two factors cannot both hold.
    pub fn explanations_contradicts(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        all(|sink| contradicts_into(self, other, &incoming(context), sink))
    }

    /// Whether at least one generic-term assignment lets both factors
    /// hold together.
    pub fn consistent_with(&self, other: &Factor) -> bool {
        self.explain_consistent_with(other, None).is_some()
    }

    /// First assignment under which no contradiction arises.
    pub fn explain_consistent_with(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| consistent_into(self, other, &incoming(context), sink))
    }

    /// Every assignment under which no contradiction arises.
    pub fn explanations_consistent_with(
        &self,
        other: &Factor,
        context: Option<&ContextRegister>,
    ) -> Vec<ContextRegister> {
        all(|sink| consistent_into(self, other, &incoming(context), sink))
    }
}

fn incoming(context: Option<&ContextRegister>) -> ContextRegister {
    context.cloned().unwrap_or_default()
}

/// Drive a search to its first result.
pub fn first(search: impl FnOnce(Sink) -> Flow) -> Option<ContextRegister> {
    let mut found = None;
    let _ = search(&mut |register| {
        found = Some(register);
        ControlFlow::Break(())
    });
    found
}

/// Drive a search to exhaustion.
pub fn all(search: impl FnOnce(Sink) -> Flow) -> Vec<ContextRegister> {
    let mut found = Vec::new();
    let _ = search(&mut |register| {
        found.push(register);
        ControlFlow::Continue(())
    });
    found
}

// ─── means ───────────────────────────────────────────────────────────

pub(crate) fn means_into(
    a: &Factor,
    b: &Factor,
    ctx: &ContextRegister,
    sink: Sink,
) -> Flow {
    if a.kind() != b.kind() {
        return ControlFlow::Continue(());
    }
    if a.is_generic() || b.is_generic() {
        // Two placeholders of the same kind are interchangeable; a
        // placeholder never means a concrete factor.
        if a.is_generic() && b.is_generic() {
            if let Some(r) = ctx.insert_checked(a.id(), b.id()) {
                return sink(r);
            }
        }
        return ControlFlow::Continue(());
    }
    if a.is_absent() != b.is_absent() {
        return ControlFlow::Continue(());
    }
    match (a, b) {
        (Factor::Entity(x), Factor::Entity(y)) => {
            // Non-generic entities compare nominally.
            if x.label == y.label {
                sink(ctx.clone())
            } else {
                ControlFlow::Continue(())
            }
        }
        (Factor::Fact(x), Factor::Fact(y)) => {
            if !x.predicate.means(&y.predicate) {
                return ControlFlow::Continue(());
            }
            let pairs: Vec<(&Factor, &Factor)> =
                x.terms.iter().zip(y.terms.iter()).collect();
            zip_rel(&pairs, ctx, Rel::Means, sink)
        }
        (Factor::Exhibit(x), Factor::Exhibit(y)) => {
            if x.form != y.form {
                return ControlFlow::Continue(());
            }
            match strict_pairs(&[
                (&x.statement, &y.statement),
                (&x.stated_by, &y.stated_by),
            ]) {
                Some(pairs) => zip_rel(&pairs, ctx, Rel::Means, sink),
                None => ControlFlow::Continue(()),
            }
        }
        (Factor::Evidence(x), Factor::Evidence(y)) => {
            match strict_pairs(&[(&x.exhibit, &y.exhibit), (&x.to_effect, &y.to_effect)]) {
                Some(pairs) => zip_rel(&pairs, ctx, Rel::Means, sink),
                None => ControlFlow::Continue(()),
            }
        }
        _ => ControlFlow::Continue(()),
    }
}

// ─── implies ─────────────────────────────────────────────────────────

pub(crate) fn implies_into(
    a: &Factor,
    b: &Factor,
    ctx: &ContextRegister,
    sink: Sink,
) -> Flow {
    if a.kind() != b.kind() {
        return ControlFlow::Continue(());
    }
    match (a.is_absent(), b.is_absent()) {
        (false, false) => implies_present(a, b, ctx, sink),
        (true, true) => {
            // Absence inverts direction: the broader absent claim follows
            // from the narrower present implication running the other way.
            let rev = ctx.reversed();
            implies_present(b, a, &rev, &mut |r| sink(r.reversed()))
        }
        _ => ControlFlow::Continue(()),
    }
}

/// Entailment ignoring the top-level absent flags (already resolved by
/// the caller). Nested terms are compared with full semantics.
fn implies_present(a: &Factor, b: &Factor, ctx: &ContextRegister, sink: Sink) -> Flow {
    if b.is_generic() {
        // Anything of the kind satisfies a generic placeholder.
        if let Some(r) = ctx.insert_checked(a.id(), b.id()) {
            return sink(r);
        }
        return ControlFlow::Continue(());
    }
    if a.is_generic() {
        // A bare placeholder proves nothing concrete.
        return ControlFlow::Continue(());
    }
    match (a, b) {
        (Factor::Entity(x), Factor::Entity(y)) => {
            if x.label == y.label {
                sink(ctx.clone())
            } else {
                ControlFlow::Continue(())
            }
        }
        (Factor::Fact(x), Factor::Fact(y)) => {
            if !x.predicate.implies(&y.predicate) {
                return ControlFlow::Continue(());
            }
            let pairs: Vec<(&Factor, &Factor)> =
                x.terms.iter().zip(y.terms.iter()).collect();
            zip_rel(&pairs, ctx, Rel::Implies, sink)
        }
        (Factor::Exhibit(x), Factor::Exhibit(y)) => {
            if y.form.is_some() && x.form != y.form {
                return ControlFlow::Continue(());
            }
            match wildcard_pairs(&[
                (&x.statement, &y.statement),
                (&x.stated_by, &y.stated_by),
            ]) {
                Some(pairs) => zip_rel(&pairs, ctx, Rel::Implies, sink),
                None => ControlFlow::Continue(()),
            }
        }
        (Factor::Evidence(x), Factor::Evidence(y)) => {
            match wildcard_pairs(&[(&x.exhibit, &y.exhibit), (&x.to_effect, &y.to_effect)]) {
                Some(pairs) => zip_rel(&pairs, ctx, Rel::Implies, sink),
                None => ControlFlow::Continue(()),
            }
        }
        _ => ControlFlow::Continue(()),
    }
}

// ─── contradicts ─────────────────────────────────────────────────────

pub(crate) fn contradicts_into(
    a: &Factor,
    b: &Factor,
    ctx: &ContextRegister,
    sink: Sink,
) -> Flow {
    if a.kind() != b.kind() || a.kind() == FactorKind::Entity {
        // An entity carries no truth claim and never contradicts.
        return ControlFlow::Continue(());
    }
    if a.is_generic() || b.is_generic() {
        return ControlFlow::Continue(());
    }
    match (a.is_absent(), b.is_absent()) {
        // Absence of a broader claim and absence of a narrower one can
        // always coexist.
        (true, true) => ControlFlow::Continue(()),
        (true, false) => {
            // The present factor clashes with the absence exactly when it
            // would satisfy the absent one's target claim.
            let target = a.as_present();
            let rev = ctx.reversed();
            implies_into(b, &target, &rev, &mut |r| sink(r.reversed()))
        }
        (false, true) => {
            let target = b.as_present();
            implies_into(a, &target, ctx, sink)
        }
        (false, false) => contradicts_present(a, b, ctx, sink),
    }
}

fn contradicts_present(a: &Factor, b: &Factor, ctx: &ContextRegister, sink: Sink) -> Flow {
    match (a, b) {
        (Factor::Fact(x), Factor::Fact(y)) => {
            if !x.predicate.contradicts(&y.predicate) {
                return ControlFlow::Continue(());
            }
            // The clash is real only when both facts speak about the same
            // terms, so term pairs are matched with `means`.
            let pairs: Vec<(&Factor, &Factor)> =
                x.terms.iter().zip(y.terms.iter()).collect();
            zip_rel(&pairs, ctx, Rel::Means, sink)
        }
        (Factor::Exhibit(x), Factor::Exhibit(y)) => {
            let forms_compatible =
                x.form.is_none() || y.form.is_none() || x.form == y.form;
            if !forms_compatible {
                return ControlFlow::Continue(());
            }
            match (&x.statement, &y.statement) {
                (Some(sa), Some(sb)) => {
                    contradicts_into(sa, sb, ctx, &mut |r| match (&x.stated_by, &y.stated_by) {
                        (Some(pa), Some(pb)) => means_into(pa, pb, &r, &mut *sink),
                        _ => sink(r),
                    })
                }
                _ => ControlFlow::Continue(()),
            }
        }
        (Factor::Evidence(x), Factor::Evidence(y)) => match (&x.to_effect, &y.to_effect) {
            (Some(ea), Some(eb)) => {
                contradicts_into(ea, eb, ctx, &mut |r| match (&x.exhibit, &y.exhibit) {
                    (Some(xa), Some(xb)) => means_into(xa, xb, &r, &mut *sink),
                    _ => sink(r),
                })
            }
            _ => ControlFlow::Continue(()),
        },
        _ => ControlFlow::Continue(()),
    }
}

// ─── consistent_with ─────────────────────────────────────────────────

pub(crate) fn consistent_into(
    a: &Factor,
    b: &Factor,
    ctx: &ContextRegister,
    sink: Sink,
) -> Flow {
    if a.kind() != b.kind() {
        // Cross-variant factors cannot contradict, hence are consistent
        // under the incoming register unchanged.
        return sink(ctx.clone());
    }
    let ga = a.generic_terms();
    let gb = b.generic_terms();
    assignments(&ga, &gb, ctx, &mut |candidate| {
        let sealed = candidate.seal();
        if first(|inner| contradicts_into(a, b, &sealed, inner)).is_none() {
            sink(candidate)
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// Enumerate injective assignments between two sets of generic terms,
/// extending the incoming register. Each source term is either left
/// unmatched or bound to a same-kind target term.
pub fn assignments(
    from: &[&Factor],
    to: &[&Factor],
    ctx: &ContextRegister,
    sink: Sink,
) -> Flow {
    match from.split_first() {
        None => sink(ctx.clone()),
        Some((term, rest)) => {
            if ctx.get(term.id()).is_some() {
                // Already pinned by the incoming register.
                return assignments(rest, to, ctx, sink);
            }
            // Branch 1: leave the term uncorresponded.
            assignments(rest, to, ctx, sink)?;
            // Branch 2: bind it to each available same-kind target.
            for target in to {
                if term.kind() == target.kind() {
                    if let Some(extended) = ctx.insert_checked(term.id(), target.id()) {
                        assignments(rest, to, &extended, sink)?;
                    }
                }
            }
            ControlFlow::Continue(())
        }
    }
}

// ─── Shared machinery ────────────────────────────────────────────────

fn relate(rel: Rel, a: &Factor, b: &Factor, ctx: &ContextRegister, sink: Sink) -> Flow {
    match rel {
        Rel::Means => means_into(a, b, ctx, sink),
        Rel::Implies => implies_into(a, b, ctx, sink),
    }
}

/// Compare term pairs in order, threading the register through each pair
/// and backtracking across the alternatives every pair offers.
fn zip_rel(pairs: &[(&Factor, &Factor)], ctx: &ContextRegister, rel: Rel, sink: Sink) -> Flow {
    match pairs.split_first() {
        None => sink(ctx.clone()),
        Some((&(x, y), rest)) => relate(rel, x, y, ctx, &mut |register| {
            zip_rel(rest, &register, rel, &mut *sink)
        }),
    }
}

type OptPair<'a> = (&'a Option<Box<Factor>>, &'a Option<Box<Factor>>);

/// Pair up optional components for `means`: both present or both missing.
fn strict_pairs<'a>(slots: &[OptPair<'a>]) -> Option<Vec<(&'a Factor, &'a Factor)>> {
    let mut pairs = Vec::new();
    for (left, right) in slots {
        match (left.as_deref(), right.as_deref()) {
            (None, None) => {}
            (Some(l), Some(r)) => pairs.push((l, r)),
            _ => return None,
        }
    }
    Some(pairs)
}

/// Pair up optional components for `implies`: a missing target component
/// is a wildcard; a missing source against a present target fails.
fn wildcard_pairs<'a>(slots: &[OptPair<'a>]) -> Option<Vec<(&'a Factor, &'a Factor)>> {
    let mut pairs = Vec::new();
    for (left, right) in slots {
        match (left.as_deref(), right.as_deref()) {
            (_, None) => {}
            (None, Some(_)) => return None,
            (Some(l), Some(r)) => pairs.push((l, r)),
        }
    }
    Some(pairs)
}
