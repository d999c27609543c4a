//! # dictum-factor — Factors and the Generic-Term Comparison Engine
//!
//! The atomic comparable unit of Dictum is the `Factor`: a fact, entity,
//! exhibit, or piece of evidence, each of which may hold nested Factors as
//! its terms. This crate defines the variants, the `TermId` identity they
//! carry, the `ContextRegister` mapping built while comparing two
//! structures, and the comparison engine itself.
//!
//! ## Key Design Principles
//!
//! 1. **Structural identity.** Two terms are "the same" only through an
//!    explicit register mapping, never by name equality. Labels exist for
//!    display alone.
//!
//! 2. **One capability set, no inheritance.** Every variant implements
//!    {`means`, `implies`, `contradicts`, `consistent_with`, term
//!    iteration} directly, sharing the generic-term machinery by
//!    composition.
//!
//! 3. **Register-producing comparisons.** Every relation takes an optional
//!    incoming register and reports zero or more outgoing registers
//!    through a `ControlFlow` sink: the first-result entry point is cheap,
//!    the all-results entry point is exhaustive, and neither keeps hidden
//!    cursor state.
//!
//! 4. **Construction-time DAG validity.** Ownership makes true cycles
//!    unrepresentable; the coherence pass additionally rejects one term id
//!    bound to two different structures within a single construction.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod compare;
pub mod context;
pub mod factor;
pub mod term;

// Re-export primary types for ergonomic imports.
pub use context::ContextRegister;
pub use factor::{Entity, Evidence, Exhibit, Fact, Factor, FactorKind};
pub use term::TermId;
