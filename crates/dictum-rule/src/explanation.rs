//! Human-readable justification of a reported relation: the registers
//! discovered during a search, paired with descriptions of the compared
//! objects and display labels for the mapped terms. Presentation only; no
//! comparison logic lives here.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use dictum_factor::{ContextRegister, Factor, TermId};

/// The relation an explanation justifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationRelation {
    /// Same meaning.
    Means,
    /// The left object entails the right.
    Implies,
    /// The right object entails the left.
    ImpliedBy,
    /// The two cannot both hold.
    Contradicts,
    /// At least one interpretation lets both hold.
    ConsistentWith,
}

impl fmt::Display for ExplanationRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Means => "means",
            Self::Implies => "implies",
            Self::ImpliedBy => "is implied by",
            Self::Contradicts => "contradicts",
            Self::ConsistentWith => "is consistent with",
        };
        f.write_str(s)
    }
}

/// A reported relation with the register(s) that justify it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// The relation found.
    pub relation: ExplanationRelation,
    /// Short description of the left object.
    pub left: String,
    /// Short description of the right object.
    pub right: String,
    /// The registers justifying the relation.
    pub registers: Vec<ContextRegister>,
    /// Display labels for mapped term ids.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<TermId, String>,
}

impl Explanation {
    /// An explanation of a relation between two displayed objects.
    pub fn new(
        relation: ExplanationRelation,
        left: impl fmt::Display,
        right: impl fmt::Display,
        registers: Vec<ContextRegister>,
    ) -> Self {
        Self {
            relation,
            left: left.to_string(),
            right: right.to_string(),
            registers,
            labels: BTreeMap::new(),
        }
    }

    /// Record display labels for every generic term reachable from the
    /// given factors, so register renderings read as entity names rather
    /// than ids.
    pub fn label_terms<'a>(mut self, factors: impl IntoIterator<Item = &'a Factor>) -> Self {
        for factor in factors {
            for term in factor.generic_terms() {
                self.labels
                    .entry(term.id())
                    .or_insert_with(|| term.display_label());
            }
        }
        self
    }

    fn label(&self, id: TermId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.short())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.left, self.relation, self.right)?;
        for register in &self.registers {
            let rendered: Vec<String> = register
                .pairs()
                .map(|(a, b)| format!("<{}> -> <{}>", self.label(a), self.label(b)))
                .collect();
            writeln!(f, "  because {}", rendered.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dictum_core::Predicate;

    #[test]
    fn test_rendering_substitutes_labels() {
        let a = Factor::fact(
            Predicate::new("{person} was a spy").unwrap(),
            vec![Factor::entity("Alice")],
        )
        .unwrap();
        let b = Factor::fact(
            Predicate::new("{person} was a spy").unwrap(),
            vec![Factor::entity("Bob")],
        )
        .unwrap();
        let register = a.explain_means(&b, None).unwrap();
        let explanation = Explanation::new(
            ExplanationRelation::Means,
            &a,
            &b,
            vec![register],
        )
        .label_terms([&a, &b]);
        let rendered = format!("{explanation}");
        assert!(rendered.contains("<Alice> -> <Bob>"));
        assert!(rendered.contains("means"));
    }

    #[test]
    fn test_unlabeled_terms_fall_back_to_short_ids() {
        let id = TermId::new();
        let register = ContextRegister::from_pairs([(id, id)]).unwrap();
        let explanation =
            Explanation::new(ExplanationRelation::Means, "left", "right", vec![register]);
        let rendered = format!("{explanation}");
        assert!(rendered.contains(&id.short()));
    }
}
