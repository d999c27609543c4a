//! # Quantity Comparison — Units, Dates, and Interval Algebra
//!
//! The supplied measurement-comparison capability: given two
//! `(magnitude, unit, comparator)` triples, report their order relation
//! after unit normalization, and decide entailment and contradiction
//! between comparator-bounded claims.
//!
//! ## Semantics
//!
//! A `QuantityClause` such as `>= 5 millimeter` denotes the set of
//! measurements satisfying it. One clause *implies* another when its
//! satisfying set is a subset of the other's; two clauses *contradict*
//! when their satisfying sets are disjoint. A predicate with a false truth
//! flag complements its comparator before these checks run, so `not(> 12)`
//! behaves exactly as `<= 12`.
//!
//! ## Failure mode
//!
//! Incompatible units (or kinds, e.g. a date against a length) are a
//! reported [`QuantityError`], never a silent `false`. Callers in the
//! comparison engine map the error to "relation does not hold".

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::QuantityError;

// ─── Comparator ──────────────────────────────────────────────────────

/// The comparison operator of a quantity clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Exactly equal to the stated quantity.
    #[serde(rename = "=")]
    Equal,
    /// Strictly greater than the stated quantity.
    #[serde(rename = ">")]
    Greater,
    /// Greater than or equal to the stated quantity.
    #[serde(rename = ">=")]
    GreaterEqual,
    /// Strictly less than the stated quantity.
    #[serde(rename = "<")]
    Less,
    /// Less than or equal to the stated quantity.
    #[serde(rename = "<=")]
    LessEqual,
}

impl Comparator {
    /// The comparator denoting the complement of this one's satisfying set.
    ///
    /// `Equal` has no single-comparator complement (it would be `!=`);
    /// callers normalize that case through [`Claim::Ne`].
    pub fn complement(&self) -> Option<Comparator> {
        match self {
            Self::Equal => None,
            Self::Greater => Some(Self::LessEqual),
            Self::GreaterEqual => Some(Self::Less),
            Self::Less => Some(Self::GreaterEqual),
            Self::LessEqual => Some(Self::Greater),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
        };
        f.write_str(s)
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Self::Equal),
            ">" => Ok(Self::Greater),
            ">=" => Ok(Self::GreaterEqual),
            "<" => Ok(Self::Less),
            "<=" => Ok(Self::LessEqual),
            other => Err(format!("unknown comparator {other:?}")),
        }
    }
}

// ─── Quantity ────────────────────────────────────────────────────────

/// A measurable amount: a bare number, a magnitude with a unit, or a
/// calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// A dimensionless number (counts, ratios).
    Number(f64),
    /// A magnitude with a unit of measure.
    Measure {
        /// Numeric magnitude in the stated unit.
        magnitude: f64,
        /// Unit of measure, e.g. `"millimeter"` or `"inch"`.
        unit: String,
    },
    /// A calendar date.
    Date(NaiveDate),
}

impl Quantity {
    /// A magnitude with a unit of measure.
    pub fn measure(magnitude: f64, unit: impl Into<String>) -> Self {
        Self::Measure {
            magnitude,
            unit: unit.into(),
        }
    }

    /// The kind of this quantity, for error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Measure { .. } => "measurement",
            Self::Date(_) => "date",
        }
    }

    /// Compare two quantities after unit normalization.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::IncompatibleKinds`] when the quantities are
    /// of different kinds, and [`QuantityError::IncompatibleUnits`] when
    /// two measurements normalize to different dimensions.
    pub fn compare(&self, other: &Quantity) -> Result<Ordering, QuantityError> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => ordered(*a, *b),
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            (
                Self::Measure {
                    magnitude: m1,
                    unit: u1,
                },
                Self::Measure {
                    magnitude: m2,
                    unit: u2,
                },
            ) => {
                let (d1, f1) = unit_info(u1);
                let (d2, f2) = unit_info(u2);
                if d1 != d2 {
                    return Err(QuantityError::IncompatibleUnits {
                        left: u1.clone(),
                        right: u2.clone(),
                    });
                }
                ordered(m1 * f1, m2 * f2)
            }
            (a, b) => Err(QuantityError::IncompatibleKinds {
                left: a.kind(),
                right: b.kind(),
            }),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Measure { magnitude, unit } => write!(f, "{magnitude} {unit}"),
            Self::Date(d) => write!(f, "{d}"),
        }
    }
}

/// Total ordering over magnitudes, rejecting NaN. Magnitudes within one
/// part in 10^9 of each other compare equal, absorbing the rounding that
/// binary-inexact unit conversion factors introduce (12 inches must equal
/// 1 foot after normalization).
fn ordered(a: f64, b: f64) -> Result<Ordering, QuantityError> {
    if a.is_nan() || b.is_nan() {
        return Err(QuantityError::UnorderedMagnitude(
            if a.is_nan() { a } else { b },
        ));
    }
    if approx_equal(a, b) {
        return Ok(Ordering::Equal);
    }
    Ok(if a < b { Ordering::Less } else { Ordering::Greater })
}

/// Relative-epsilon equality over finite magnitudes. Exact zeros compare
/// equal through the zero scale.
fn approx_equal(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= scale * 1e-9
}

// ─── Unit Normalization ──────────────────────────────────────────────

/// The physical dimension a unit belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Dimension {
    Length,
    Mass,
    Duration,
    /// An unrecognized unit, comparable only with the identical unit name.
    Custom(String),
}

/// Map a unit name to its dimension and conversion factor to the base
/// unit of that dimension (meter, kilogram, second).
fn unit_info(unit: &str) -> (Dimension, f64) {
    match unit {
        "millimeter" | "millimeters" | "mm" => (Dimension::Length, 0.001),
        "centimeter" | "centimeters" | "cm" => (Dimension::Length, 0.01),
        "meter" | "meters" | "m" => (Dimension::Length, 1.0),
        "kilometer" | "kilometers" | "km" => (Dimension::Length, 1000.0),
        "inch" | "inches" | "in" => (Dimension::Length, 0.0254),
        "foot" | "feet" | "ft" => (Dimension::Length, 0.3048),
        "yard" | "yards" | "yd" => (Dimension::Length, 0.9144),
        "mile" | "miles" => (Dimension::Length, 1609.344),
        "gram" | "grams" | "g" => (Dimension::Mass, 0.001),
        "kilogram" | "kilograms" | "kg" => (Dimension::Mass, 1.0),
        "ounce" | "ounces" | "oz" => (Dimension::Mass, 0.028_349_523_125),
        "pound" | "pounds" | "lb" => (Dimension::Mass, 0.453_592_37),
        "second" | "seconds" | "s" => (Dimension::Duration, 1.0),
        "minute" | "minutes" => (Dimension::Duration, 60.0),
        "hour" | "hours" | "h" => (Dimension::Duration, 3600.0),
        "day" | "days" => (Dimension::Duration, 86_400.0),
        "year" | "years" => (Dimension::Duration, 31_557_600.0),
        other => (Dimension::Custom(other.to_string()), 1.0),
    }
}

// ─── QuantityClause ──────────────────────────────────────────────────

/// A comparator-bounded claim about a quantity: `sign quantity`, e.g.
/// `>= 5 millimeter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityClause {
    /// The comparison operator.
    pub sign: Comparator,
    /// The bounding quantity.
    pub quantity: Quantity,
}

impl QuantityClause {
    /// A comparator-bounded claim.
    pub fn new(sign: Comparator, quantity: Quantity) -> Self {
        Self { sign, quantity }
    }

    /// Whether the two clauses state the same bound: same comparator and
    /// equal quantity after unit normalization.
    pub fn means(&self, other: &QuantityClause) -> bool {
        self.sign == other.sign
            && matches!(self.quantity.compare(&other.quantity), Ok(Ordering::Equal))
    }

    /// Normalize this clause under a truth flag. A false flag complements
    /// the comparator; a false equality becomes a `!=` claim.
    pub(crate) fn claim(&self, truth: bool) -> Claim {
        if truth {
            Claim::Cmp(self.sign, self.quantity.clone())
        } else {
            match self.sign.complement() {
                Some(sign) => Claim::Cmp(sign, self.quantity.clone()),
                None => Claim::Ne(self.quantity.clone()),
            }
        }
    }
}

impl fmt::Display for QuantityClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.sign, self.quantity)
    }
}

// ─── Claims and Interval Algebra ─────────────────────────────────────

/// A truth-normalized quantity claim: either a comparator-bounded set or
/// the complement of a single point (`!=`).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Claim {
    /// The set `{x : x sign quantity}`.
    Cmp(Comparator, Quantity),
    /// The set `{x : x != quantity}`.
    Ne(Quantity),
}

impl Claim {
    /// Whether this claim's satisfying set is a subset of `other`'s.
    /// Incompatible quantities make the relation not hold.
    pub(crate) fn implies(&self, other: &Claim) -> bool {
        match (self, other) {
            (Claim::Cmp(s1, q1), Claim::Cmp(s2, q2)) => match q1.compare(q2) {
                Ok(ord) => cmp_subset(*s1, *s2, ord),
                Err(_) => false,
            },
            (Claim::Ne(q1), Claim::Ne(q2)) => {
                matches!(q1.compare(q2), Ok(Ordering::Equal))
            }
            // The complement of a point is a subset of no bounded set.
            (Claim::Ne(_), Claim::Cmp(..)) => false,
            // A bounded set is inside `!= q` exactly when it excludes q.
            (Claim::Cmp(s1, q1), Claim::Ne(q2)) => match q1.compare(q2) {
                Ok(ord) => !point_satisfies(*s1, ord.reverse()),
                Err(_) => false,
            },
        }
    }

    /// Whether this claim's satisfying set is disjoint from `other`'s.
    pub(crate) fn contradicts(&self, other: &Claim) -> bool {
        match (self, other) {
            (Claim::Cmp(s1, q1), Claim::Cmp(s2, q2)) => match q1.compare(q2) {
                Ok(ord) => cmp_disjoint(*s1, *s2, ord),
                Err(_) => false,
            },
            // `!= q` excludes only one point; it is disjoint only from `= q`.
            (Claim::Ne(q1), Claim::Cmp(Comparator::Equal, q2))
            | (Claim::Cmp(Comparator::Equal, q1), Claim::Ne(q2)) => {
                matches!(q1.compare(q2), Ok(Ordering::Equal))
            }
            (Claim::Ne(_), _) | (_, Claim::Ne(_)) => false,
        }
    }
}

/// Whether a point at `ord` relative to a bound satisfies `sign bound`.
fn point_satisfies(sign: Comparator, ord: Ordering) -> bool {
    match sign {
        Comparator::Equal => ord == Ordering::Equal,
        Comparator::Greater => ord == Ordering::Greater,
        Comparator::GreaterEqual => ord != Ordering::Less,
        Comparator::Less => ord == Ordering::Less,
        Comparator::LessEqual => ord != Ordering::Greater,
    }
}

/// Subset test between `{x : x s1 q1}` and `{x : x s2 q2}` where `ord`
/// is the ordering of q1 relative to q2.
fn cmp_subset(s1: Comparator, s2: Comparator, ord: Ordering) -> bool {
    use Comparator::*;
    match (s1, s2) {
        // A point is a subset iff the point satisfies the bound.
        (Equal, _) => point_satisfies(s2, ord),
        // Lower-bounded sets shrink as the bound rises.
        (Greater, Greater) | (Greater, GreaterEqual) | (GreaterEqual, GreaterEqual) => {
            ord != Ordering::Less
        }
        (GreaterEqual, Greater) => ord == Ordering::Greater,
        // Upper-bounded sets shrink as the bound falls.
        (Less, Less) | (Less, LessEqual) | (LessEqual, LessEqual) => ord != Ordering::Greater,
        (LessEqual, Less) => ord == Ordering::Less,
        // Opposite directions, or an unbounded set against a point.
        _ => false,
    }
}

/// Disjointness test between `{x : x s1 q1}` and `{x : x s2 q2}` where
/// `ord` is the ordering of q1 relative to q2.
fn cmp_disjoint(s1: Comparator, s2: Comparator, ord: Ordering) -> bool {
    use Comparator::*;
    match (s1, s2) {
        (Equal, _) => !point_satisfies(s2, ord),
        (_, Equal) => !point_satisfies(s1, ord.reverse()),
        // Same direction always overlaps at the extremes.
        (Greater | GreaterEqual, Greater | GreaterEqual) => false,
        (Less | LessEqual, Less | LessEqual) => false,
        // Opposite directions: disjoint once the bounds cross.
        (Greater, Less) | (Greater, LessEqual) | (GreaterEqual, Less) => ord != Ordering::Less,
        (GreaterEqual, LessEqual) => ord == Ordering::Greater,
        (Less, Greater) | (LessEqual, Greater) | (Less, GreaterEqual) => ord != Ordering::Greater,
        (LessEqual, GreaterEqual) => ord == Ordering::Less,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mm(n: f64) -> Quantity {
        Quantity::measure(n, "millimeter")
    }

    // ---- ordering and units ----

    #[test]
    fn test_same_unit_ordering() {
        assert_eq!(mm(5.0).compare(&mm(8.0)).unwrap(), Ordering::Less);
        assert_eq!(mm(8.0).compare(&mm(8.0)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_cross_unit_ordering() {
        let twelve_inches = Quantity::measure(12.0, "inch");
        assert_eq!(twelve_inches.compare(&mm(5.0)).unwrap(), Ordering::Greater);
        let foot = Quantity::measure(1.0, "foot");
        assert_eq!(twelve_inches.compare(&foot).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_normalized_equality_tolerates_rounding() {
        // Conversion factors are binary-inexact; equality after
        // normalization must still hold.
        let yard = Quantity::measure(1.0, "yard");
        let three_feet = Quantity::measure(3.0, "feet");
        assert_eq!(yard.compare(&three_feet).unwrap(), Ordering::Equal);
        let mile = Quantity::measure(1.0, "mile");
        let feet = Quantity::measure(5280.0, "feet");
        assert_eq!(mile.compare(&feet).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_nan_magnitude_reported() {
        let err = mm(f64::NAN).compare(&mm(1.0)).unwrap_err();
        assert!(matches!(err, QuantityError::UnorderedMagnitude(m) if m.is_nan()));
    }

    #[test]
    fn test_incompatible_units_reported() {
        let length = mm(5.0);
        let mass = Quantity::measure(5.0, "kilogram");
        assert!(matches!(
            length.compare(&mass),
            Err(QuantityError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_incompatible_kinds_reported() {
        let date = Quantity::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(matches!(
            mm(5.0).compare(&date),
            Err(QuantityError::IncompatibleKinds { .. })
        ));
    }

    #[test]
    fn test_custom_unit_only_matches_itself() {
        let a = Quantity::measure(3.0, "beardcoin");
        let b = Quantity::measure(4.0, "beardcoin");
        assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
        assert!(a.compare(&mm(3.0)).is_err());
    }

    #[test]
    fn test_date_ordering() {
        let a = Quantity::Date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
        let b = Quantity::Date(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
    }

    // ---- clause equivalence ----

    #[test]
    fn test_means_across_units() {
        let a = QuantityClause::new(Comparator::GreaterEqual, Quantity::measure(1.0, "foot"));
        let b = QuantityClause::new(Comparator::GreaterEqual, Quantity::measure(12.0, "inch"));
        assert!(a.means(&b));
    }

    #[test]
    fn test_means_requires_same_sign() {
        let a = QuantityClause::new(Comparator::Greater, mm(5.0));
        let b = QuantityClause::new(Comparator::GreaterEqual, mm(5.0));
        assert!(!a.means(&b));
    }

    // ---- subset (implies) ----

    #[test]
    fn test_exact_point_implies_weaker_bound() {
        let exact = Claim::Cmp(Comparator::Equal, mm(8.0));
        let at_least = Claim::Cmp(Comparator::GreaterEqual, mm(5.0));
        assert!(exact.implies(&at_least));
        assert!(!at_least.implies(&exact));
    }

    #[test]
    fn test_tighter_lower_bound_implies_looser() {
        let tight = Claim::Cmp(Comparator::GreaterEqual, mm(10.0));
        let loose = Claim::Cmp(Comparator::GreaterEqual, mm(5.0));
        assert!(tight.implies(&loose));
        assert!(!loose.implies(&tight));
    }

    #[test]
    fn test_strict_vs_inclusive_bounds() {
        let strict = Claim::Cmp(Comparator::Greater, mm(5.0));
        let inclusive = Claim::Cmp(Comparator::GreaterEqual, mm(5.0));
        assert!(strict.implies(&inclusive));
        assert!(!inclusive.implies(&strict));
    }

    #[test]
    fn test_cross_direction_never_subset() {
        let above = Claim::Cmp(Comparator::Greater, mm(5.0));
        let below = Claim::Cmp(Comparator::Less, mm(10.0));
        assert!(!above.implies(&below));
        assert!(!below.implies(&above));
    }

    #[test]
    fn test_bounded_set_implies_ne_outside_it() {
        let above = Claim::Cmp(Comparator::Greater, mm(5.0));
        let ne_three = Claim::Ne(mm(3.0));
        assert!(above.implies(&ne_three));
        let ne_seven = Claim::Ne(mm(7.0));
        assert!(!above.implies(&ne_seven));
    }

    // ---- disjointness (contradicts) ----

    #[test]
    fn test_crossed_bounds_disjoint() {
        let high = Claim::Cmp(Comparator::GreaterEqual, mm(10.0));
        let low = Claim::Cmp(Comparator::Less, mm(5.0));
        assert!(high.contradicts(&low));
        assert!(low.contradicts(&high));
    }

    #[test]
    fn test_touching_inclusive_bounds_overlap() {
        let up = Claim::Cmp(Comparator::GreaterEqual, mm(5.0));
        let down = Claim::Cmp(Comparator::LessEqual, mm(5.0));
        assert!(!up.contradicts(&down));
    }

    #[test]
    fn test_touching_strict_bound_disjoint() {
        let up = Claim::Cmp(Comparator::Greater, mm(5.0));
        let down = Claim::Cmp(Comparator::LessEqual, mm(5.0));
        assert!(up.contradicts(&down));
    }

    #[test]
    fn test_distinct_points_disjoint() {
        let a = Claim::Cmp(Comparator::Equal, mm(5.0));
        let b = Claim::Cmp(Comparator::Equal, mm(8.0));
        assert!(a.contradicts(&b));
        assert!(!a.contradicts(&a.clone()));
    }

    #[test]
    fn test_ne_contradicts_only_matching_point() {
        let ne = Claim::Ne(mm(5.0));
        let same_point = Claim::Cmp(Comparator::Equal, mm(5.0));
        let other_point = Claim::Cmp(Comparator::Equal, mm(8.0));
        assert!(ne.contradicts(&same_point));
        assert!(!ne.contradicts(&other_point));
    }

    #[test]
    fn test_incompatible_units_do_not_contradict() {
        let length = Claim::Cmp(Comparator::Greater, mm(5.0));
        let mass = Claim::Cmp(Comparator::Less, Quantity::measure(1.0, "kilogram"));
        assert!(!length.contradicts(&mass));
        assert!(!length.implies(&mass));
    }

    // ---- truth normalization ----

    #[test]
    fn test_false_truth_complements_comparator() {
        let clause = QuantityClause::new(Comparator::Greater, mm(12.0));
        assert_eq!(
            clause.claim(false),
            Claim::Cmp(Comparator::LessEqual, mm(12.0))
        );
    }

    #[test]
    fn test_false_equality_becomes_ne() {
        let clause = QuantityClause::new(Comparator::Equal, mm(12.0));
        assert_eq!(clause.claim(false), Claim::Ne(mm(12.0)));
    }
}
