//! # ContextRegister — Consistent Generic-Term Mappings
//!
//! A `ContextRegister` is the record a comparison builds as it walks two
//! Factor structures: a partial, injective, bidirectional mapping from the
//! source structure's generic term ids to the target structure's.
//!
//! ## Invariants
//!
//! - Once a source term is bound to a target term, every later
//!   sub-comparison touching that source term must agree; a conflicting
//!   pair makes the insertion fail so the search branch can backtrack.
//! - The mapping is injective: two source terms never share a target.
//! - A register never owns the terms it maps; it records relationships
//!   between ids only.
//!
//! ## Sealing
//!
//! The consistency search needs to distinguish "not yet mapped" from
//! "mapped to nothing". A sealed register accepts no new pairs, so any
//! comparison run under it can only use the correspondences already fixed.
//!
//! All operations are value-producing: `insert_checked` and `merge`
//! return a new register, leaving the original untouched, which lets the
//! backtracking search thread immutable partial registers through its
//! recursion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::term::TermId;

/// An injective partial mapping between the generic terms of two compared
/// structures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRegister {
    forward: BTreeMap<TermId, TermId>,
    reverse: BTreeMap<TermId, TermId>,
    #[serde(default)]
    sealed: bool,
}

impl ContextRegister {
    /// An empty, unsealed register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a register from explicit pairs. Returns `None` when the pairs
    /// conflict or break injectivity.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (TermId, TermId)>) -> Option<Self> {
        let mut register = Self::new();
        for (from, to) in pairs {
            register = register.insert_checked(from, to)?;
        }
        Some(register)
    }

    /// Number of bound pairs.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether no pairs are bound.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The target bound to a source term, if any.
    pub fn get(&self, from: TermId) -> Option<TermId> {
        self.forward.get(&from).copied()
    }

    /// The source bound to a target term, if any.
    pub fn get_reverse(&self, to: TermId) -> Option<TermId> {
        self.reverse.get(&to).copied()
    }

    /// Iterate the bound pairs in deterministic (source id) order.
    pub fn pairs(&self) -> impl Iterator<Item = (TermId, TermId)> + '_ {
        self.forward.iter().map(|(a, b)| (*a, *b))
    }

    /// Add one pair, returning the extended register, or `None` when the
    /// pair conflicts with an existing binding, breaks injectivity, or the
    /// register is sealed and the pair is not already present.
    pub fn insert_checked(&self, from: TermId, to: TermId) -> Option<Self> {
        match (self.forward.get(&from), self.reverse.get(&to)) {
            (Some(bound), _) if *bound != to => None,
            (_, Some(bound)) if *bound != from => None,
            (Some(_), Some(_)) => Some(self.clone()),
            _ if self.sealed => None,
            _ => {
                let mut next = self.clone();
                next.forward.insert(from, to);
                next.reverse.insert(to, from);
                Some(next)
            }
        }
    }

    /// Combine two registers, or `None` when any pair of `other` conflicts
    /// with this register.
    pub fn merge(&self, other: &ContextRegister) -> Option<Self> {
        let mut merged = self.clone();
        for (from, to) in other.pairs() {
            merged = merged.insert_checked(from, to)?;
        }
        Some(merged)
    }

    /// The same mapping with source and target sides swapped.
    pub fn reversed(&self) -> Self {
        Self {
            forward: self.reverse.clone(),
            reverse: self.forward.clone(),
            sealed: self.sealed,
        }
    }

    /// A copy accepting no further pairs.
    pub fn seal(&self) -> Self {
        let mut sealed = self.clone();
        sealed.sealed = true;
        sealed
    }

    /// Whether the register accepts no further pairs.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Whether every pair maps a term to itself.
    pub fn is_identity(&self) -> bool {
        self.forward.iter().all(|(a, b)| a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- insertion ----

    #[test]
    fn test_insert_and_get() {
        let (a, b) = (TermId::new(), TermId::new());
        let r = ContextRegister::new().insert_checked(a, b).unwrap();
        assert_eq!(r.get(a), Some(b));
        assert_eq!(r.get_reverse(b), Some(a));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_insert_is_value_producing() {
        let (a, b) = (TermId::new(), TermId::new());
        let empty = ContextRegister::new();
        let _extended = empty.insert_checked(a, b).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_conflicting_binding_rejected() {
        let (a, b, c) = (TermId::new(), TermId::new(), TermId::new());
        let r = ContextRegister::new().insert_checked(a, b).unwrap();
        assert!(r.insert_checked(a, c).is_none());
    }

    #[test]
    fn test_injectivity_enforced() {
        let (a, b, c) = (TermId::new(), TermId::new(), TermId::new());
        let r = ContextRegister::new().insert_checked(a, c).unwrap();
        assert!(r.insert_checked(b, c).is_none());
    }

    #[test]
    fn test_duplicate_pair_accepted() {
        let (a, b) = (TermId::new(), TermId::new());
        let r = ContextRegister::new().insert_checked(a, b).unwrap();
        let again = r.insert_checked(a, b).unwrap();
        assert_eq!(r, again);
    }

    #[test]
    fn test_self_mapping_allowed() {
        let a = TermId::new();
        let r = ContextRegister::new().insert_checked(a, a).unwrap();
        assert!(r.is_identity());
    }

    // ---- merge ----

    #[test]
    fn test_merge_disjoint() {
        let (a, b, c, d) = (TermId::new(), TermId::new(), TermId::new(), TermId::new());
        let r1 = ContextRegister::new().insert_checked(a, b).unwrap();
        let r2 = ContextRegister::new().insert_checked(c, d).unwrap();
        let merged = r1.merge(&r2).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_conflict_fails() {
        let (a, b, c) = (TermId::new(), TermId::new(), TermId::new());
        let r1 = ContextRegister::new().insert_checked(a, b).unwrap();
        let r2 = ContextRegister::new().insert_checked(a, c).unwrap();
        assert!(r1.merge(&r2).is_none());
    }

    // ---- reversal and sealing ----

    #[test]
    fn test_reversed_swaps_sides() {
        let (a, b) = (TermId::new(), TermId::new());
        let r = ContextRegister::new().insert_checked(a, b).unwrap();
        let rev = r.reversed();
        assert_eq!(rev.get(b), Some(a));
        assert_eq!(rev.reversed(), r);
    }

    #[test]
    fn test_sealed_rejects_new_pairs() {
        let (a, b, c, d) = (TermId::new(), TermId::new(), TermId::new(), TermId::new());
        let sealed = ContextRegister::new().insert_checked(a, b).unwrap().seal();
        assert!(sealed.insert_checked(c, d).is_none());
        // Existing pairs remain usable.
        assert!(sealed.insert_checked(a, b).is_some());
    }
}
