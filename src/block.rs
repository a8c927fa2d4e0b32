//! Sequential blocks.
//!
//! A block runs a list of `Step<D, ()>` strictly in order against one driver
//! and stops at the first failure, which it returns unchanged. An empty block
//! succeeds. The [`steps!`](crate::steps!) macro is the literal form, and
//! [`given`], [`when`] and [`then`] label a block as a scenario stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::step::Step;

/// Stage of a Given/When/Then scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Preconditions.
    Given,
    /// The action under test.
    When,
    /// Expected outcome.
    Then,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Given => "given",
            Self::When => "when",
            Self::Then => "then",
        })
    }
}

/// Run `steps` in order, stopping at the first failure.
pub fn sequence<D: 'static>(steps: impl IntoIterator<Item = Step<D, ()>>) -> Step<D, ()> {
    let steps: Vec<_> = steps.into_iter().collect();
    Step::new(move |driver| {
        for step in &steps {
            step.run(driver)?;
        }
        Ok(())
    })
}

/// A [`sequence`] logged as one stage of a scenario.
pub fn stage<D: 'static>(
    stage: Stage,
    label: impl Into<String>,
    steps: impl IntoIterator<Item = Step<D, ()>>,
) -> Step<D, ()> {
    let label = label.into();
    let body = sequence(steps);
    Step::new(move |driver| {
        #[cfg(feature = "tracing")]
        tracing::info!(stage = %stage, label = %label, "stage.start");
        let result = body.run(driver);
        #[cfg(feature = "tracing")]
        tracing::info!(stage = %stage, label = %label, ok = result.is_ok(), "stage.end");
        #[cfg(not(feature = "tracing"))]
        let _ = (&stage, &label);
        result
    })
}

/// Preconditions of a scenario.
pub fn given<D: 'static>(
    label: impl Into<String>,
    steps: impl IntoIterator<Item = Step<D, ()>>,
) -> Step<D, ()> {
    stage(Stage::Given, label, steps)
}

/// The action of a scenario.
pub fn when<D: 'static>(
    label: impl Into<String>,
    steps: impl IntoIterator<Item = Step<D, ()>>,
) -> Step<D, ()> {
    stage(Stage::When, label, steps)
}

/// The expected outcome of a scenario.
pub fn then<D: 'static>(
    label: impl Into<String>,
    steps: impl IntoIterator<Item = Step<D, ()>>,
) -> Step<D, ()> {
    stage(Stage::Then, label, steps)
}
