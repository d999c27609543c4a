//! The inputs/despite/outputs triple of a rule, with entailment,
//! contradiction and the addition operator.
//!
//! Registers produced here always map this procedure's generic terms to
//! the other procedure's. Where an inner query runs in the opposite
//! direction (the trigger comparison inside `implies`), the register is
//! reversed on the way in and back out.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dictum_factor::compare::{first, Flow, Sink};
use dictum_factor::{ContextRegister, Factor, TermId};
use dictum_group::{ComparableGroup, MatchCache};

/// The preconditions, tolerated facts and conclusions of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    inputs: ComparableGroup,
    #[serde(default, skip_serializing_if = "ComparableGroup::is_empty")]
    despite: ComparableGroup,
    outputs: ComparableGroup,
}

impl Procedure {
    /// A procedure from its three groups.
    pub fn new(
        inputs: impl Into<ComparableGroup>,
        despite: impl Into<ComparableGroup>,
        outputs: impl Into<ComparableGroup>,
    ) -> Self {
        Self {
            inputs: inputs.into(),
            despite: despite.into(),
            outputs: outputs.into(),
        }
    }

    /// Preconditions: the factors that must hold for the rule to fire.
    pub fn inputs(&self) -> &ComparableGroup {
        &self.inputs
    }

    /// Acknowledged-but-irrelevant factors the rule fires in spite of.
    pub fn despite(&self) -> &ComparableGroup {
        &self.despite
    }

    /// Conclusions guaranteed once the inputs hold.
    pub fn outputs(&self) -> &ComparableGroup {
        &self.outputs
    }

    /// Index of every generic term reachable from any of the three groups.
    pub fn term_index(&self) -> BTreeMap<TermId, Factor> {
        let mut index = self.inputs.term_index();
        index.extend(self.despite.term_index());
        index.extend(self.outputs.term_index());
        index
    }

    /// The trigger set: inputs and despite-factors combined.
    fn trigger(&self) -> ComparableGroup {
        self.inputs.union_with(&self.despite)
    }

    // ---- implies ----

    /// Whether anything that would trigger `other` also triggers this
    /// procedure, with this procedure's outputs entailing `other`'s.
    pub fn implies(&self, other: &Procedure) -> bool {
        self.explain_implies(other, None).is_some()
    }

    /// First register under which this procedure entails `other`.
    pub fn explain_implies(
        &self,
        other: &Procedure,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| self.implies_into(other, &incoming(context), sink))
    }

    fn implies_into(&self, other: &Procedure, ctx: &ContextRegister, sink: Sink) -> Flow {
        debug!("procedure implication search");
        let mut cache = MatchCache::new();
        self.outputs
            .implies_into(&other.outputs, ctx, &mut cache, &mut |r1| {
                // Anything triggering other must trigger self: other's
                // trigger entails self's inputs, searched in the other
                // procedure's direction and folded back.
                let trigger = other.trigger();
                for r2 in trigger.explanations_implies(&self.inputs, Some(&r1.reversed())) {
                    if let Some(merged) = r1.merge(&r2.reversed()) {
                        sink(merged)?;
                    }
                }
                ControlFlow::Continue(())
            })
    }

    /// The weaker, some-instance entailment: this procedure's inputs
    /// entail `other`'s inputs, and its outputs entail `other`'s outputs,
    /// under one register. Used by non-universal rules, where the instance
    /// a rule describes must be an instance of the broader rule.
    pub fn implies_in_some_instance(&self, other: &Procedure) -> bool {
        first(|sink| {
            let mut cache = MatchCache::new();
            self.inputs.implies_into(
                &other.inputs,
                &ContextRegister::new(),
                &mut cache,
                &mut |r| match self.outputs.explain_implies(&other.outputs, Some(&r)) {
                    Some(merged) => sink(merged),
                    None => ControlFlow::Continue(()),
                },
            )
        })
        .is_some()
    }

    // ---- contradicts ----

    /// Whether the two procedures could both apply to the same facts yet
    /// demand opposite results.
    pub fn contradicts(&self, other: &Procedure) -> bool {
        self.explain_contradicts(other, None).is_some()
    }

    /// First register reaching an output contradiction while both trigger
    /// sets remain jointly satisfiable.
    pub fn explain_contradicts(
        &self,
        other: &Procedure,
        context: Option<&ContextRegister>,
    ) -> Option<ContextRegister> {
        first(|sink| self.contradicts_into(other, &incoming(context), sink))
    }

    fn contradicts_into(&self, other: &Procedure, ctx: &ContextRegister, sink: Sink) -> Flow {
        debug!("procedure contradiction search");
        let mut cache = MatchCache::new();
        self.outputs
            .contradicts_into(&other.outputs, ctx, &mut cache, &mut |r| {
                let jointly_satisfiable = self
                    .trigger()
                    .explain_consistent_with(&other.trigger(), Some(&r))
                    .is_some();
                if jointly_satisfiable {
                    sink(r)
                } else {
                    ControlFlow::Continue(())
                }
            })
    }

    /// Whether some generic-term assignment lets every factor of both
    /// procedures hold together.
    pub fn consistent_with(&self, other: &Procedure) -> bool {
        let mine = self.trigger().union_with(&self.outputs);
        let theirs = other.trigger().union_with(&other.outputs);
        mine.consistent_with(&theirs)
    }

    // ---- addition ----

    /// Chain two procedures: valid when this procedure's post-firing state
    /// (outputs plus still-standing inputs) satisfies every input of
    /// `other`. The result fires on this procedure's trigger and reaches
    /// both procedures' conclusions, with `other`'s factors translated
    /// into this procedure's term space. `None` when no register exists.
    pub fn add(&self, other: &Procedure) -> Option<(Procedure, ContextRegister)> {
        let state = self.inputs.union_with(&self.outputs);
        let register = state.explain_implies(&other.inputs, None)?;
        let replacements = self.term_index();
        let back = register.reversed();
        let translate = |group: &ComparableGroup| group.with_context(&back, &replacements);

        // Inputs of `other` the outputs alone already establish are
        // consequences, not new preconditions.
        let unmet: ComparableGroup = other
            .inputs
            .iter()
            .filter(|f| !self.outputs.implies_factor(f))
            .cloned()
            .collect();
        let combined = Procedure {
            inputs: self.inputs.union_with(&translate(&unmet)),
            despite: self.despite.union_with(&translate(&other.despite)),
            outputs: self.outputs.union_with(&translate(&other.outputs)),
        };
        Some((combined, register))
    }
}

fn incoming(context: Option<&ContextRegister>) -> ContextRegister {
    context.cloned().unwrap_or_default()
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GIVEN")?;
        for factor in self.inputs.iter() {
            write!(f, " {factor};")?;
        }
        if !self.despite.is_empty() {
            f.write_str(" DESPITE")?;
            for factor in self.despite.iter() {
                write!(f, " {factor};")?;
            }
        }
        f.write_str(" RESULT")?;
        for factor in self.outputs.iter() {
            write!(f, " {factor};")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictum_core::{Comparator, Predicate, Quantity, QuantityClause};

    fn beard_entity() -> Factor {
        Factor::entity("the suspected beard")
    }

    fn facial_hair(beard: &Factor) -> Factor {
        Factor::fact(
            Predicate::new("{thing} was facial hair").unwrap(),
            vec![beard.clone()],
        )
        .unwrap()
    }

    fn length_at_least(beard: &Factor, magnitude: f64, unit: &str) -> Factor {
        let predicate = Predicate::new("the length of {thing} was")
            .unwrap()
            .with_quantity(QuantityClause::new(
                Comparator::GreaterEqual,
                Quantity::measure(magnitude, unit),
            ));
        Factor::fact(predicate, vec![beard.clone()]).unwrap()
    }

    fn was_a_beard(beard: &Factor) -> Factor {
        Factor::fact(
            Predicate::new("{thing} was a beard").unwrap(),
            vec![beard.clone()],
        )
        .unwrap()
    }

    fn chin_procedure() -> Procedure {
        let beard = beard_entity();
        Procedure::new(
            vec![
                facial_hair(&beard),
                length_at_least(&beard, 5.0, "millimeter"),
            ],
            vec![],
            vec![was_a_beard(&beard)],
        )
    }

    // ---- implies ----

    #[test]
    fn test_procedure_implies_itself() {
        let p = chin_procedure();
        assert!(p.implies(&p.clone()));
    }

    #[test]
    fn test_harder_trigger_is_implied() {
        // A procedure demanding an exact 8mm length is triggered by fewer
        // situations; the 5mm-minimum procedure applies whenever it does.
        let beard = beard_entity();
        let exact = Predicate::new("the length of {thing} was")
            .unwrap()
            .with_quantity(QuantityClause::new(
                Comparator::Equal,
                Quantity::measure(8.0, "millimeter"),
            ));
        let narrowed = Procedure::new(
            vec![
                facial_hair(&beard),
                Factor::fact(exact, vec![beard.clone()]).unwrap(),
            ],
            vec![],
            vec![was_a_beard(&beard)],
        );
        assert!(chin_procedure().implies(&narrowed));
        assert!(!narrowed.implies(&chin_procedure()));
    }

    #[test]
    fn test_unrelated_triggers_do_not_imply() {
        let beard = beard_entity();
        let ear_to_ear = Procedure::new(
            vec![
                facial_hair(&beard),
                Factor::fact(
                    Predicate::new("{thing} existed in an uninterrupted line from ear to ear")
                        .unwrap(),
                    vec![beard.clone()],
                )
                .unwrap(),
            ],
            vec![],
            vec![was_a_beard(&beard)],
        );
        assert!(!chin_procedure().implies(&ear_to_ear));
        assert!(!ear_to_ear.implies(&chin_procedure()));
    }

    // ---- contradicts ----

    #[test]
    fn test_opposite_outputs_with_compatible_triggers_contradict() {
        let beard = beard_entity();
        let denial = Procedure::new(
            vec![length_at_least(&beard, 12.0, "inch")],
            vec![],
            vec![
                Factor::fact(
                    Predicate::new("{thing} was a beard").unwrap().negated(),
                    vec![beard.clone()],
                )
                .unwrap(),
            ],
        );
        assert!(chin_procedure().contradicts(&denial));
        assert!(denial.contradicts(&chin_procedure()));
    }

    #[test]
    fn test_incompatible_triggers_defeat_contradiction() {
        // Both procedures speak about the same measured thing, but their
        // triggers cannot hold together, so no case puts them in conflict.
        let beard = beard_entity();
        let short = Predicate::new("the length of {thing} was")
            .unwrap()
            .with_quantity(QuantityClause::new(
                Comparator::Less,
                Quantity::measure(1.0, "millimeter"),
            ));
        let denial = Procedure::new(
            vec![
                facial_hair(&beard),
                Factor::fact(short, vec![beard.clone()]).unwrap(),
            ],
            vec![],
            vec![
                Factor::fact(
                    Predicate::new("{thing} was a beard").unwrap().negated(),
                    vec![beard.clone()],
                )
                .unwrap(),
            ],
        );
        assert!(!chin_procedure().contradicts(&denial));
    }

    // ---- addition ----

    #[test]
    fn test_addition_chains_outputs_into_inputs() {
        let token = Factor::entity("the token");
        let loan = Procedure::new(
            vec![
                Factor::fact(
                    Predicate::new("{thing} was loaned").unwrap(),
                    vec![token.clone()],
                )
                .unwrap(),
            ],
            vec![],
            vec![
                Factor::fact(
                    Predicate::new("{thing} was transferred").unwrap(),
                    vec![token.clone()],
                )
                .unwrap(),
            ],
        );
        let coin = Factor::entity("the coin");
        let offense = Procedure::new(
            vec![
                Factor::fact(
                    Predicate::new("{thing} was transferred").unwrap(),
                    vec![coin.clone()],
                )
                .unwrap(),
            ],
            vec![],
            vec![
                Factor::fact(
                    Predicate::new("transferring {thing} was an offense").unwrap(),
                    vec![coin.clone()],
                )
                .unwrap(),
            ],
        );
        let (combined, register) = loan.add(&offense).expect("valid addition");
        assert_eq!(combined.inputs().len(), 1);
        assert_eq!(combined.outputs().len(), 2);
        // The register binds the loaned token to the transferred coin.
        assert_eq!(register.get(token.id()), Some(coin.id()));
    }

    #[test]
    fn test_addition_fails_without_register() {
        let beard = beard_entity();
        let unrelated = Procedure::new(
            vec![facial_hair(&beard)],
            vec![],
            vec![was_a_beard(&beard)],
        );
        let token = Factor::entity("the token");
        let offense = Procedure::new(
            vec![
                Factor::fact(
                    Predicate::new("{thing} was transferred").unwrap(),
                    vec![token.clone()],
                )
                .unwrap(),
            ],
            vec![],
            vec![
                Factor::fact(
                    Predicate::new("transferring {thing} was an offense").unwrap(),
                    vec![token],
                )
                .unwrap(),
            ],
        );
        assert!(unrelated.add(&offense).is_none());
    }
}
