//! # Term Identity
//!
//! Every Factor carries a `TermId`. Identity of a generic term is
//! positional/structural: the id says *which* placeholder a term is, never
//! *what* it is called. Human-readable labels live on the factors
//! themselves and play no part in matching.
//!
//! Fresh ids are assigned at construction; authored data may carry
//! explicit ids so that one entity can be referenced from several factors
//! in the same document.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a term. UUID v4 under the hood.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TermId(Uuid);

impl TermId {
    /// A fresh, globally unique term id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Short hex prefix for display and error messages.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TermId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}
