//! # MatchCache — Per-Query Memoization
//!
//! The backtracking search over group correspondences revisits the same
//! factor pair along many branches. The cache stores each pair's *base*
//! registers (computed against an empty incoming register) keyed by the
//! factors' term ids and the relation; call sites merge a base register
//! with their current partial register instead of re-deriving the
//! comparison.
//!
//! Keys rely on term ids being globally unique (UUID v4 at
//! construction), so two structurally different factors never collide.
//! A cache lives for one top-level query and is dropped with it; there
//! is no cross-query state.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use dictum_factor::{ContextRegister, Factor, TermId};

/// Which pairwise relation a cache entry holds registers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Structural identity.
    Means,
    /// Entailment.
    Implies,
    /// Incompatibility.
    Contradicts,
}

/// Memo of base registers per factor pair within one top-level query.
#[derive(Debug, Default)]
pub struct MatchCache {
    base: HashMap<(TermId, TermId, Relation), Rc<Vec<ContextRegister>>>,
}

impl MatchCache {
    /// An empty cache for a new top-level query.
    pub fn new() -> Self {
        Self::default()
    }

    /// The base registers for `left relation right`, derived on first use.
    pub fn registers(
        &mut self,
        left: &Factor,
        right: &Factor,
        relation: Relation,
    ) -> Rc<Vec<ContextRegister>> {
        let key = (left.id(), right.id(), relation);
        if let Some(found) = self.base.get(&key) {
            trace!(?relation, left = %left.id(), right = %right.id(), "match cache hit");
            return Rc::clone(found);
        }
        let derived = match relation {
            Relation::Means => left.explanations_means(right, None),
            Relation::Implies => left.explanations_implies(right, None),
            Relation::Contradicts => left.explanations_contradicts(right, None),
        };
        let entry = Rc::new(derived);
        self.base.insert(key, Rc::clone(&entry));
        entry
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    /// Whether nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}
