//! Combinator laws over driver-backed steps.

use std::cell::Cell;
use std::rc::Rc;

use crate::fake::{FakeDriver, Gesture};
use crate::{buttons, cells, Step, StepError};

use super::common::{counting, login_app};

fn missing_label() -> Step<FakeDriver, String> {
    buttons().matching_exactly("Nope").label()
}

/// Mapping the identity function changes nothing, on success or failure.
///
/// The failing step is built by one helper so both copies carry the same
/// call site.
#[test]
fn map_identity_preserves_results() {
    let driver = login_app();

    let count = buttons().count();
    let mapped = buttons().count().map(|n| n);
    assert_eq!(mapped.run(&driver), count.run(&driver));

    let missing = missing_label();
    let mapped = missing_label().map(|l| l);
    assert!(matches!(
        missing.run(&driver),
        Err(StepError::ElementDoesNotExist { .. })
    ));
    assert_eq!(mapped.run(&driver), missing.run(&driver));
}

/// `and_then` runs its continuation once per successful evaluation.
///
/// Verifies:
/// - The continuation sees the receiver's value
/// - It runs exactly once per `run`
/// - It never runs when the receiver fails
#[test]
fn and_then_sequencing() {
    let driver = login_app();
    let calls = Rc::new(Cell::new(0));

    let seen = calls.clone();
    let step = buttons().count().and_then(move |n| {
        seen.set(seen.get() + 1);
        Step::always(n * 2)
    });
    assert_eq!(step.run(&driver), Ok(4));
    assert_eq!(calls.get(), 1);
    assert_eq!(step.run(&driver), Ok(4));
    assert_eq!(calls.get(), 2);

    let seen = calls.clone();
    let failing = buttons().only_element().and_then(move |element| {
        seen.set(seen.get() + 1);
        Step::always(element)
    });
    assert!(failing.run(&driver).is_err());
    assert_eq!(calls.get(), 2);
}

/// A failing left operand of `zip` keeps the right operand from running.
///
/// Verifies:
/// - The error is the left operand's
/// - No tap reaches the driver
/// - A counting right operand stays at zero
#[test]
fn zip_short_circuits_side_effects() {
    let driver = login_app();
    let runs = Rc::new(Cell::new(0));

    let step = buttons()
        .only_element()
        .zip(buttons().matching_exactly("Log in").tap())
        .zip(counting(&runs));

    match step.run(&driver) {
        Err(StepError::AmbiguousMatch { count, .. }) => assert_eq!(count, 2),
        other => panic!("Expected AmbiguousMatch, got {:?}", other),
    }
    assert!(driver.gestures().is_empty());
    assert_eq!(runs.get(), 0);
}

/// Both operands of a successful `zip` run, left first.
#[test]
fn zip_runs_in_declared_order() {
    let driver = login_app();
    let step = buttons()
        .matching_exactly("Forgot password?")
        .double_tap()
        .zip(buttons().matching_exactly("Log in").long_press(std::time::Duration::from_millis(10)));

    step.run(&driver).expect("both buttons exist");
    assert_eq!(
        driver.gestures(),
        vec![
            Gesture::DoubleTap("Forgot password?".to_string()),
            Gesture::LongPress("Log in".to_string(), std::time::Duration::from_millis(10)),
        ]
    );
}

/// `or_else` falls back on failure and skips the alternative on success.
#[test]
fn or_else_fallback() {
    let driver = login_app();

    let label = buttons()
        .matching_exactly("Sign up")
        .label()
        .or_else(Step::always("fallback".to_string()));
    assert_eq!(label.run(&driver), Ok("fallback".to_string()));

    let runs = Rc::new(Cell::new(0));
    let step = Step::always(7).or_else(counting(&runs));
    assert_eq!(step.run(&driver), Ok(7));
    assert_eq!(runs.get(), 0);
}

/// When both sides of `or_else` fail, the alternative's failure is reported.
#[test]
fn or_else_reports_the_alternative() {
    let driver = login_app();
    let step = buttons()
        .only_element()
        .or_else(cells().only_element());

    match step.run(&driver) {
        Err(StepError::NoElementsMatchingQuery { query, .. }) => {
            assert_eq!(query.to_string(), "all cells");
        }
        other => panic!("Expected cell failure, got {:?}", other),
    }
}

/// `optional` turns a missing element into `None`.
#[test]
fn optional_absorbs_missing_elements() {
    let driver = login_app();
    let missing = buttons().matching_exactly("Sign up").optional();
    assert!(missing.run(&driver).expect("optional never fails").is_none());

    let present = buttons().matching_exactly("Log in").label().optional();
    assert_eq!(present.run(&driver), Ok(Some("Log in".to_string())));
}

/// `inspect` observes values without changing them.
#[test]
fn inspect_observes_success_only() {
    let driver = login_app();
    let seen = Rc::new(Cell::new(0));

    let sink = seen.clone();
    let step = buttons().count().inspect(move |n| sink.set(*n));
    assert_eq!(step.run(&driver), Ok(2));
    assert_eq!(seen.get(), 2);

    let sink = seen.clone();
    let step = cells()
        .wait_for(super::common::SHORT, 1)
        .count()
        .inspect(move |n| sink.set(*n + 100));
    assert!(step.run(&driver).is_err());
    assert_eq!(seen.get(), 2);
}
