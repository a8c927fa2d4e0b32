//! Wait tests.
//!
//! Tests for bounded polling on queries and elements.

use std::time::{Duration, Instant};

use crate::fake::{FakeDriver, FakeElement};
use crate::{buttons, cells, CountCondition, Predicate, StepError, WaitPolicy};

use super::common::SHORT;

fn delayed_button(delay: Duration) -> FakeDriver {
    FakeDriver::new("main", [FakeElement::button("Retry").appearing_after(delay)])
}

/// A query wait returns as soon as the element shows up.
#[test]
fn query_wait_sees_late_elements() {
    let driver = delayed_button(Duration::from_millis(60));
    let step = buttons().wait_for(Duration::from_secs(2), 1).count();

    let started = Instant::now();
    assert_eq!(step.run(&driver), Ok(1));
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// A query wait that never succeeds fails after roughly its timeout.
///
/// Verifies:
/// - Failure is `TimedOutWaitingForQuery` with the requested count
/// - Elapsed time is at least the timeout, and bounded
#[test]
fn query_wait_times_out() {
    let driver = delayed_button(Duration::ZERO);
    let step = buttons().wait_for(SHORT, 2);

    let started = Instant::now();
    let result = step.run(&driver);
    let elapsed = started.elapsed();

    match result {
        Err(StepError::TimedOutWaitingForQuery {
            query,
            timeout,
            min_count,
            ..
        }) => {
            assert_eq!(query.to_string(), "all buttons");
            assert_eq!(timeout, SHORT);
            assert_eq!(min_count, 2);
        }
        other => panic!("Expected TimedOutWaitingForQuery, got {:?}", other),
    }
    assert!(elapsed >= SHORT);
    assert!(elapsed < SHORT + Duration::from_secs(2));
}

/// A custom policy controls the timeout.
#[test]
fn query_wait_with_policy() {
    let driver = delayed_button(Duration::from_secs(60));
    let policy =
        WaitPolicy::new(Duration::from_millis(100)).with_poll_interval(Duration::from_millis(10));

    match buttons().wait_with(policy, 1).run(&driver) {
        Err(StepError::TimedOutWaitingForQuery { timeout, .. }) => {
            assert_eq!(timeout, Duration::from_millis(100))
        }
        other => panic!("Expected TimedOutWaitingForQuery, got {:?}", other),
    }
}

/// Compound count conditions report their predicate on expiry.
#[test]
fn query_wait_until_condition() {
    let driver = delayed_button(Duration::ZERO);
    let absent = CountCondition::Exactly(0);

    match buttons().wait_until(SHORT, absent).run(&driver) {
        Err(error @ StepError::TimedOutWaitingForQueryWithPredicate { .. }) => {
            assert!(error.is_timeout());
            assert!(error.to_string().contains("to satisfy `count == 0`"));
        }
        other => panic!("Expected TimedOutWaitingForQueryWithPredicate, got {:?}", other),
    }

    let between = CountCondition::All(vec![CountCondition::AtLeast(1), CountCondition::AtMost(3)]);
    assert!(buttons().wait_until(SHORT, between).run(&driver).is_ok());
}

/// An element wait fails with `TimedOutWaitingForElement` naming the element.
#[test]
fn element_wait_times_out() {
    let driver = delayed_button(Duration::ZERO);
    let started = Instant::now();

    match cells().first().wait_for(SHORT).run(&driver) {
        Err(StepError::TimedOutWaitingForElement {
            element, predicate, ..
        }) => {
            assert_eq!(element.to_string(), "the first of all cells");
            assert!(predicate.is_none());
        }
        other => panic!("Expected TimedOutWaitingForElement, got {:?}", other),
    }
    assert!(started.elapsed() >= SHORT);
}

/// An element predicate wait needs the predicate to hold, not just existence.
#[test]
fn element_wait_until_predicate() {
    let driver = FakeDriver::new("main", [FakeElement::button("Pay").disabled()]);

    match buttons().first().wait_until(SHORT, Predicate::Enabled(true)).run(&driver) {
        Err(StepError::TimedOutWaitingForElement { predicate, .. }) => {
            assert_eq!(predicate.as_deref(), Some("isEnabled == true"));
        }
        other => panic!("Expected TimedOutWaitingForElement, got {:?}", other),
    }

    let disabled = buttons().first().wait_until(SHORT, Predicate::Enabled(false));
    assert!(disabled.run(&driver).is_ok());
}

/// Waits with an unbounded timeout return once the condition holds.
#[test]
fn unbounded_waits_succeed() {
    let driver = delayed_button(Duration::from_millis(30));

    let count = buttons().wait_for(Duration::MAX, 1).count();
    assert_eq!(count.run(&driver), Ok(1));

    let label = buttons().first().wait_for(Duration::MAX).label();
    assert_eq!(label.run(&driver), Ok("Retry".to_string()));

    let condition = buttons().wait_until(Duration::MAX, CountCondition::AtLeast(1));
    assert!(condition.run(&driver).is_ok());
}
