//! A Procedure plus modal strength and supporting citations.
//!
//! A rule is read as: in SOME (or EVERY, when `universal`) case where the
//! inputs hold, the court MAY (or MUST, when `mandatory`) accept the
//! outputs. `exclusive` asserts the outputs follow only via this rule.
//! A rule normally carries one procedure; a union rule carries several
//! alternative trigger sets attached to shared outputs.

use std::fmt;
use std::ops::{Add, BitOr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use dictum_factor::compare::first;
use dictum_factor::ContextRegister;

use crate::enactment::{merge_enactments, Enactment};
use crate::procedure::Procedure;

/// A procedure with modal qualifiers and enactment support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Alternative trigger/outcome sets; normally one. A query against the
    /// rule may use any alternative.
    pub procedures: Vec<Procedure>,
    /// The court must apply the rule, rather than merely being allowed to.
    #[serde(default)]
    pub mandatory: bool,
    /// The rule applies whenever its inputs are present, not just in some
    /// instance.
    #[serde(default)]
    pub universal: bool,
    /// The outputs follow only via this rule.
    #[serde(default)]
    pub exclusive: bool,
    /// Citations supporting the rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enactments: Vec<Enactment>,
}

impl Rule {
    /// A permissive, some-instance rule around one procedure.
    pub fn new(procedure: Procedure) -> Self {
        Self {
            procedures: vec![procedure],
            mandatory: false,
            universal: false,
            exclusive: false,
            enactments: Vec::new(),
        }
    }

    /// Mark the rule mandatory.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Mark the rule universal.
    pub fn universal(mut self) -> Self {
        self.universal = true;
        self
    }

    /// Mark the rule exclusive.
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Attach a supporting citation.
    pub fn with_enactment(mut self, enactment: Enactment) -> Self {
        self.enactments.push(enactment);
        self
    }

    /// The single procedure of a non-union rule, when there is exactly one.
    fn sole_procedure(&self) -> Option<&Procedure> {
        match self.procedures.as_slice() {
            [p] => Some(p),
            _ => None,
        }
    }

    // ---- implies ----

    /// Whether accepting this rule commits a court to `other`.
    ///
    /// Modal gating: a permissive rule never implies a mandatory one, and
    /// a some-instance rule never implies a universal one. Every
    /// alternative of `other` must be covered by some alternative of this
    /// rule.
    pub fn implies(&self, other: &Rule) -> bool {
        if other.mandatory && !self.mandatory {
            return false;
        }
        if other.universal && !self.universal {
            return false;
        }
        debug!(
            alternatives = self.procedures.len(),
            target_alternatives = other.procedures.len(),
            "rule implication"
        );
        other.procedures.iter().all(|target| {
            self.procedures.iter().any(|source| {
                if self.universal {
                    source.implies(target)
                } else {
                    source.implies_in_some_instance(target)
                }
            })
        })
    }

    // ---- contradicts ----

    /// Whether the two rules could demand opposite results.
    pub fn contradicts(&self, other: &Rule) -> bool {
        self.explain_contradicts(other).is_some()
    }

    /// First register under which the rules conflict.
    ///
    /// A mandatory-universal rule contradicts a weaker rule only when the
    /// weaker rule's trigger also triggers it; two weak rules conflict
    /// whenever their procedures do.
    pub fn explain_contradicts(&self, other: &Rule) -> Option<ContextRegister> {
        let strong_self = self.mandatory && self.universal;
        let strong_other = other.mandatory && other.universal;
        for a in &self.procedures {
            for b in &other.procedures {
                let found = match (strong_self, strong_other) {
                    (true, false) => contradicts_overriding(a, b),
                    (false, true) => contradicts_overriding(b, a).map(|r| r.reversed()),
                    _ => a.explain_contradicts(b, None),
                };
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    /// Whether some pair of alternatives from the two rules can hold
    /// together under some generic-term assignment.
    pub fn consistent_with(&self, other: &Rule) -> bool {
        self.procedures
            .iter()
            .any(|a| other.procedures.iter().any(|b| a.consistent_with(b)))
    }

    // ---- addition ----

    /// Chain this rule into `other`, when this rule's post-firing state
    /// satisfies `other`'s trigger. `None` when the rules do not combine
    /// or either carries union alternatives.
    pub fn add(&self, other: &Rule) -> Option<Rule> {
        let a = self.sole_procedure()?;
        let b = other.sole_procedure()?;
        let (combined, _register) = a.add(b)?;
        Some(Rule {
            procedures: vec![combined],
            mandatory: self.mandatory && other.mandatory,
            universal: self.universal && other.universal,
            exclusive: false,
            enactments: merge_enactments(&self.enactments, &other.enactments),
        })
    }

    // ---- union ----

    /// Disjoin the rules' trigger sets, when every procedure of both rules
    /// reaches the same outputs under some register. The result keeps each
    /// alternative input set attached to the shared outputs.
    pub fn union(&self, other: &Rule) -> Option<Rule> {
        let anchor = self.procedures.first()?;
        let replacements = anchor.term_index();
        let mut procedures = self.procedures.clone();
        for alternative in &other.procedures {
            let register = anchor
                .outputs()
                .explain_means(alternative.outputs(), None)?;
            let back = register.reversed();
            procedures.push(Procedure::new(
                alternative.inputs().with_context(&back, &replacements),
                alternative.despite().with_context(&back, &replacements),
                anchor.outputs().clone(),
            ));
        }
        Some(Rule {
            procedures,
            mandatory: self.mandatory && other.mandatory,
            universal: self.universal && other.universal,
            exclusive: false,
            enactments: merge_enactments(&self.enactments, &other.enactments),
        })
    }
}

/// Contradiction between a mandatory-universal rule and a weaker one: the
/// outputs conflict and the weaker rule's trigger also triggers the
/// overriding rule, so the court cannot follow the permission without
/// breaking the obligation.
fn contradicts_overriding(must: &Procedure, may: &Procedure) -> Option<ContextRegister> {
    first(|sink| {
        let mut cache = dictum_group::MatchCache::new();
        must.outputs()
            .contradicts_into(may.outputs(), &ContextRegister::new(), &mut cache, &mut |r| {
                let trigger = may.inputs().union_with(may.despite());
                if trigger
                    .explain_implies(must.inputs(), Some(&r.reversed()))
                    .is_some()
                {
                    sink(r)
                } else {
                    std::ops::ControlFlow::Continue(())
                }
            })
    })
}

impl Add for &Rule {
    type Output = Option<Rule>;

    fn add(self, other: &Rule) -> Option<Rule> {
        Rule::add(self, other)
    }
}

impl BitOr for &Rule {
    type Output = Option<Rule>;

    fn bitor(self, other: &Rule) -> Option<Rule> {
        Rule::union(self, other)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the rule that the court {} {} accept",
            if self.mandatory { "MUST" } else { "MAY" },
            if self.universal { "ALWAYS" } else { "SOMETIMES" },
        )?;
        for (i, procedure) in self.procedures.iter().enumerate() {
            if i > 0 {
                f.write_str(" OR")?;
            }
            write!(f, " {procedure}")?;
        }
        Ok(())
    }
}
