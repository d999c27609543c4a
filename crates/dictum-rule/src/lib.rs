//! # dictum-rule — Procedures, Rules and Holdings
//!
//! The composition layer above factor matching. A `Procedure` bundles the
//! inputs, despite-factors and outputs of a legal rule; a `Rule` adds modal
//! strength (mandatory, universal, exclusive) and supporting `Enactment`
//! citations; a `Holding` records a decision-maker's posture toward a Rule.
//! All are immutable value objects: comparison, addition and union return
//! new values and report the `ContextRegister`s that justify them, wrapped
//! in an `Explanation` for display.
//!
//! ## Key Design Principles
//!
//! - Rule-level queries decompose into Procedure-level queries, which
//!   decompose into group matching. No comparison logic is duplicated at
//!   this layer; it only sequences group searches and threads registers.
//! - "No valid register" is an absent result, never an error, so
//!   composition chains read without failure handling at every step.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod enactment;
pub mod explanation;
pub mod holding;
pub mod procedure;
pub mod rule;

pub use enactment::Enactment;
pub use explanation::{Explanation, ExplanationRelation};
pub use holding::Holding;
pub use procedure::Procedure;
pub use rule::Rule;
