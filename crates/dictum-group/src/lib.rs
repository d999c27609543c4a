//! # dictum-group — Factor Groups and Combinatorial Matching
//!
//! Collections of Factors compared as a unit. `ComparableGroup` has set
//! semantics: matching one group against another searches the space of
//! correspondences between their members, extending one shared
//! `ContextRegister` a factor-pair at a time and backtracking on
//! inconsistency. `FactorSequence` has positional semantics: member *i*
//! compares only against member *i*, though nested generic terms still
//! cross-match through the register.
//!
//! ## Cost and memoization
//!
//! Group matching is the expensive operation: worst case is combinatorial
//! in group size (bounded in practice by real-world rule sizes of a few
//! dozen factors). Every top-level query carries a [`MatchCache`] so a
//! factor pair's base registers are derived once and reused across
//! branches of the backtracking search.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod cache;
pub mod group;

pub use cache::{MatchCache, Relation};
pub use group::{ComparableGroup, FactorSequence};
