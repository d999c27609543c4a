//! # dictum-core — Foundational Types for Dictum
//!
//! This crate is the bedrock of the Dictum workspace. It defines the
//! leaf-level primitives every other crate builds on: the error hierarchy,
//! the quantity/unit comparison capability, and `Predicate`, the templated
//! proposition that gives a legal statement its truth-qualified content.
//!
//! ## Key Design Principles
//!
//! 1. **Validated constructors.** A `Predicate` with a duplicate slot name
//!    or a malformed template cannot be constructed. Malformation is a
//!    construction-time error, never a silent coercion.
//!
//! 2. **Reported incompatibility.** Comparing quantities of unrelated
//!    dimensions is a `QuantityError`, not a silent `false`. Higher layers
//!    translate incompatibility into empty result sets so batch comparisons
//!    over heterogeneous data keep working.
//!
//! 3. **Interval semantics for bounds.** A comparator plus a quantity
//!    defines a satisfying set on one measurement axis. Entailment is
//!    subset, contradiction is disjointness. A false truth flag complements
//!    the comparator instead of being special-cased downstream.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dictum-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod error;
pub mod predicate;
pub mod quantity;

// Re-export primary types for ergonomic imports.
pub use error::{QuantityError, StructureError};
pub use predicate::Predicate;
pub use quantity::{Comparator, Quantity, QuantityClause};
