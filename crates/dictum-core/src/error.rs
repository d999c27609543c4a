//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout Dictum. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Structural malformation (`StructureError`) is fatal and surfaces at
//!   construction time, to the caller that built the offending object.
//! - Unit incompatibility (`QuantityError`) is reported at the quantity
//!   API; the comparison layers above translate it into an empty result
//!   sequence so heterogeneous batch comparisons keep working.
//! - A failed search for a context register is never an error. "These two
//!   rules don't combine" is an expected outcome, represented as an empty
//!   or absent result so composition chains need no failure handling at
//!   every step.

use thiserror::Error;

/// Construction-time malformation of a Predicate, Factor, or composite.
///
/// These are raised by constructors and never silently coerced. A value
/// that exists has passed structural validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// A predicate template declared a different number of slots than the
    /// number of terms supplied alongside it.
    #[error("template {template:?} has {slots} slot(s) but {terms} term(s) were supplied")]
    SlotCountMismatch {
        /// The offending template.
        template: String,
        /// Number of slots the template declares.
        slots: usize,
        /// Number of terms actually supplied.
        terms: usize,
    },

    /// The same slot name appeared more than once in one template.
    #[error("duplicate slot name {name:?} in template {template:?}")]
    DuplicateSlot {
        /// The repeated slot name.
        name: String,
        /// The offending template.
        template: String,
    },

    /// A slot delimiter was opened but never closed.
    #[error("unterminated slot delimiter in template {template:?}")]
    UnterminatedSlot {
        /// The offending template.
        template: String,
    },

    /// One term id was bound to two structurally different terms within a
    /// single construction. Term structures must form a coherent DAG: the
    /// same id may recur, but always with identical content.
    #[error("term id {id} appears with conflicting structure within one construction")]
    IncoherentTerm {
        /// Rendered id of the conflicting term.
        id: String,
    },
}

/// Error in the quantity comparison capability.
///
/// `PartialEq` only: [`QuantityError::UnorderedMagnitude`] carries the
/// offending `f64`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantityError {
    /// The two units normalize to different dimensions.
    #[error("cannot compare unit {left:?} with unit {right:?}")]
    IncompatibleUnits {
        /// Unit on the left side of the comparison.
        left: String,
        /// Unit on the right side of the comparison.
        right: String,
    },

    /// The two quantities are of different kinds (e.g. a date and a length).
    #[error("cannot compare a {left} with a {right}")]
    IncompatibleKinds {
        /// Kind of the left quantity.
        left: &'static str,
        /// Kind of the right quantity.
        right: &'static str,
    },

    /// A magnitude was not an ordered number (NaN).
    #[error("magnitude {0} is not comparable")]
    UnorderedMagnitude(f64),
}
