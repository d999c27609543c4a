//! A court's posture toward a Rule. A holding can accept a rule, reject
//! it as invalid, or mention it without deciding; only decided holdings
//! carry entailment or contradiction weight.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rule::Rule;

/// A Rule plus a decision posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// The rule the holding speaks about.
    pub rule: Rule,
    /// Whether the holding asserts the rule is valid law.
    #[serde(default = "default_true")]
    pub rule_valid: bool,
    /// Whether the court actually decided the point.
    #[serde(default = "default_true")]
    pub decided: bool,
}

fn default_true() -> bool {
    true
}

impl Holding {
    /// A decided holding accepting the rule.
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            rule_valid: true,
            decided: true,
        }
    }

    /// A decided holding rejecting the rule as invalid.
    pub fn rejecting(mut self) -> Self {
        self.rule_valid = false;
        self
    }

    /// Mark the holding as dictum: mentioned but not decided.
    pub fn undecided(mut self) -> Self {
        self.decided = false;
        self
    }

    /// Whether accepting this holding commits a court to `other`.
    ///
    /// Accepting a rule accepts everything it implies; rejecting a rule
    /// rejects everything that implies it. An undecided holding commits
    /// to nothing, and nothing commits to it.
    pub fn implies(&self, other: &Holding) -> bool {
        if !self.decided || !other.decided {
            return false;
        }
        match (self.rule_valid, other.rule_valid) {
            (true, true) => self.rule.implies(&other.rule),
            (false, false) => other.rule.implies(&self.rule),
            _ => false,
        }
    }

    /// Whether the two holdings cannot both be good law.
    ///
    /// Two acceptances conflict when their rules do. An acceptance
    /// conflicts with a rejection when the accepted rule implies the
    /// rejected one: committing to the broader rule commits to the
    /// narrower one the other side struck down.
    pub fn contradicts(&self, other: &Holding) -> bool {
        if !self.decided || !other.decided {
            return false;
        }
        match (self.rule_valid, other.rule_valid) {
            (true, true) => self.rule.contradicts(&other.rule),
            (true, false) => self.rule.implies(&other.rule),
            (false, true) => other.rule.implies(&self.rule),
            (false, false) => false,
        }
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.decided {
            f.write_str("it was not decided whether ")?;
        } else if !self.rule_valid {
            f.write_str("it is not valid law that ")?;
        }
        write!(f, "{}", self.rule)
    }
}
