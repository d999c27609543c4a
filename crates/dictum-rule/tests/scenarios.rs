//! End-to-end scenarios from the beard-definition and beardcoin case law:
//! alternative definitions reaching the same conclusion, a mandatory rule
//! overriding a permissive one, and rule chaining through addition.

use dictum_core::{Comparator, Predicate, Quantity, QuantityClause};
use dictum_factor::Factor;
use dictum_rule::{Enactment, Holding, Procedure, Rule};

fn fact(template: &str, terms: Vec<Factor>) -> Factor {
    Factor::fact(Predicate::new(template).unwrap(), terms).unwrap()
}

fn negated_fact(template: &str, terms: Vec<Factor>) -> Factor {
    Factor::fact(Predicate::new(template).unwrap().negated(), terms).unwrap()
}

fn length_fact(beard: &Factor, sign: Comparator, magnitude: f64, unit: &str) -> Factor {
    let predicate = Predicate::new("the length of {thing} was")
        .unwrap()
        .with_quantity(QuantityClause::new(sign, Quantity::measure(magnitude, unit)));
    Factor::fact(predicate, vec![beard.clone()]).unwrap()
}

/// ">= 5mm, on or below the chin" definition of a beard.
fn chin_rule() -> Rule {
    let beard = Factor::entity("the suspected beard");
    Rule::new(Procedure::new(
        vec![
            fact("{thing} was facial hair", vec![beard.clone()]),
            length_fact(&beard, Comparator::GreaterEqual, 5.0, "millimeter"),
            fact("{thing} occurred on or below the chin", vec![beard.clone()]),
        ],
        vec![],
        vec![fact("{thing} was a beard", vec![beard])],
    ))
    .universal()
}

/// "uninterrupted line from ear to ear" definition of a beard.
fn ear_to_ear_rule() -> Rule {
    let beard = Factor::entity("the suspected beard");
    Rule::new(Procedure::new(
        vec![
            fact("{thing} was facial hair", vec![beard.clone()]),
            fact(
                "{thing} existed in an uninterrupted line from the front of one ear to the front of the other ear below the nose",
                vec![beard.clone()],
            ),
        ],
        vec![],
        vec![fact("{thing} was a beard", vec![beard])],
    ))
    .universal()
}

// ---- alternative definitions ----

#[test]
fn test_beard_definitions_do_not_imply_each_other() {
    let chin = chin_rule();
    let ear = ear_to_ear_rule();
    assert!(!chin.implies(&ear));
    assert!(!ear.implies(&chin));
}

#[test]
fn test_chin_rule_implies_exact_length_variant() {
    let beard = Factor::entity("the suspected beard");
    let narrowed = Rule::new(Procedure::new(
        vec![
            fact("{thing} was facial hair", vec![beard.clone()]),
            length_fact(&beard, Comparator::Equal, 8.0, "millimeter"),
            fact("{thing} occurred on or below the chin", vec![beard.clone()]),
        ],
        vec![],
        vec![fact("{thing} was a beard", vec![beard])],
    ))
    .universal();
    assert!(chin_rule().implies(&narrowed));
    assert!(!narrowed.implies(&chin_rule()));
}

#[test]
fn test_definitions_share_outputs_and_union() {
    let either = chin_rule().union(&ear_to_ear_rule()).expect("same outputs");
    assert_eq!(either.procedures.len(), 2);
}

// ---- mandatory contradiction ----

#[test]
fn test_twelve_inch_rule_contradicts_ear_to_ear_rule() {
    // Twelve inches satisfies the 5mm floor, so an ear-to-ear beard of
    // that length is claimed a beard by one rule and not a beard by the
    // other.
    let beard = Factor::entity("the suspected beard");
    let deny = Rule::new(Procedure::new(
        vec![length_fact(&beard, Comparator::GreaterEqual, 12.0, "inch")],
        vec![],
        vec![negated_fact("{thing} was a beard", vec![beard])],
    ))
    .mandatory()
    .universal();
    let affirm = ear_to_ear_rule().mandatory();
    assert!(deny.contradicts(&affirm));
    assert!(affirm.contradicts(&deny));
}

// ---- beardcoin addition ----

struct BeardcoinCase {
    loan_rule: Rule,
    offense_rule: Rule,
    loan: Factor,
    no_license: Factor,
    not_department: Factor,
    transfer: Factor,
}

fn beardcoin_case() -> BeardcoinCase {
    let citation = Enactment::new("/test/acts/47/6C");

    let token = Factor::entity("the Beardcoin token");
    let counterparty = Factor::entity("the counterparty");
    let loan = fact(
        "{token} was loaned to {person}",
        vec![token.clone(), counterparty.clone()],
    );
    let no_license = negated_fact(
        "{person} was licensed to deal in Beardcoin",
        vec![counterparty.clone()],
    );
    let not_department = negated_fact(
        "{person} was the Department of Beards",
        vec![counterparty.clone()],
    );
    let transfer = fact(
        "{token} was transferred to {person}",
        vec![token.clone(), counterparty.clone()],
    );
    // The loan rule carries the two extra inputs the offense rule will
    // need, so the chained rule's trigger is complete.
    let loan_rule = Rule::new(Procedure::new(
        vec![loan.clone(), no_license.clone(), not_department.clone()],
        vec![],
        vec![transfer.clone()],
    ))
    .universal()
    .with_enactment(citation.clone());

    let token2 = Factor::entity("the Beardcoin token");
    let holder = Factor::entity("the counterparty");
    let offense_rule = Rule::new(Procedure::new(
        vec![
            fact(
                "{token} was transferred to {person}",
                vec![token2.clone(), holder.clone()],
            ),
            negated_fact(
                "{person} was licensed to deal in Beardcoin",
                vec![holder.clone()],
            ),
            negated_fact("{person} was the Department of Beards", vec![holder.clone()]),
        ],
        vec![],
        vec![fact(
            "the transfer of {token} to {person} was an offense",
            vec![token2, holder],
        )],
    ))
    .universal()
    .with_enactment(citation);

    BeardcoinCase {
        loan_rule,
        offense_rule,
        loan,
        no_license,
        not_department,
        transfer,
    }
}

#[test]
fn test_beardcoin_addition_inputs_and_outputs() {
    let case = beardcoin_case();
    let combined = case
        .loan_rule
        .add(&case.offense_rule)
        .expect("the loan rule's results satisfy the offense rule's trigger");

    let procedure = &combined.procedures[0];
    // Inputs are exactly the loan-side trigger: the transfer precondition
    // is discharged by the loan rule's own output.
    assert_eq!(procedure.inputs().len(), 3);
    for expected in [&case.loan, &case.no_license, &case.not_department] {
        assert!(
            procedure.inputs().iter().any(|f| f.means(expected)),
            "missing input: {expected}"
        );
    }
    // Outputs carry both the transfer and the offense.
    assert_eq!(procedure.outputs().len(), 2);
    assert!(procedure.outputs().iter().any(|f| f.means(&case.transfer)));
    let offense_shape = fact(
        "the transfer of {token} to {person} was an offense",
        vec![Factor::entity("some token"), Factor::entity("someone")],
    );
    assert!(procedure.outputs().iter().any(|f| f.means(&offense_shape)));
    // The shared citation appears once.
    assert_eq!(combined.enactments, vec![Enactment::new("/test/acts/47/6C")]);
}

#[test]
fn test_addition_round_trip_reproduces_factors() {
    let case = beardcoin_case();
    let combined = case
        .loan_rule
        .add(&case.offense_rule)
        .expect("valid addition");
    let procedure = &combined.procedures[0];

    // Decomposing the combined rule reproduces the loan rule's exact
    // factor multiset on the input side, with nothing dropped and nothing
    // duplicated.
    let original_inputs = case.loan_rule.procedures[0].inputs();
    assert_eq!(procedure.inputs().len(), original_inputs.len());
    for original in original_inputs.iter() {
        assert_eq!(
            procedure
                .inputs()
                .iter()
                .filter(|f| f.means(original))
                .count(),
            1
        );
    }
    assert!(procedure.despite().is_empty());
}

#[test]
fn test_addition_is_associative_up_to_renaming() {
    let step = |given: &str, then: &str| {
        let token = Factor::entity("the token");
        Rule::new(Procedure::new(
            vec![fact(given, vec![token.clone()])],
            vec![],
            vec![fact(then, vec![token])],
        ))
        .universal()
    };
    let a = step("{thing} was minted", "{thing} was issued");
    let b = step("{thing} was issued", "{thing} was circulated");
    let c = step("{thing} was circulated", "{thing} was spent");

    let left = a.add(&b).expect("a+b").add(&c).expect("(a+b)+c");
    let right = a.add(&b.add(&c).expect("b+c")).expect("a+(b+c)");

    let (lp, rp) = (&left.procedures[0], &right.procedures[0]);
    assert!(lp.inputs().means(rp.inputs()));
    assert!(lp.outputs().means(rp.outputs()));
}

// ---- holdings ----

#[test]
fn test_rejected_holding_contradicts_broader_acceptance() {
    let acceptance = Holding::new(chin_rule());
    let beard = Factor::entity("the suspected beard");
    let narrowed = Rule::new(Procedure::new(
        vec![
            fact("{thing} was facial hair", vec![beard.clone()]),
            length_fact(&beard, Comparator::Equal, 8.0, "millimeter"),
            fact("{thing} occurred on or below the chin", vec![beard.clone()]),
        ],
        vec![],
        vec![fact("{thing} was a beard", vec![beard])],
    ))
    .universal();
    let rejection = Holding::new(narrowed).rejecting();
    assert!(acceptance.contradicts(&rejection));
    assert!(rejection.contradicts(&acceptance));
}
