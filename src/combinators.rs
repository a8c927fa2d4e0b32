//! Product and recovery combinators.
//!
//! `zip` runs its operands strictly left to right against the same driver and
//! stops at the first failure, so later operands' side effects never happen.
//! `or_else` is the only combinator that discards a failure.

use serde::{Deserialize, Serialize};

use crate::step::Step;

/// Which side of an [`Step::or_either`] produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrElse<A, B> {
    /// The receiver succeeded.
    Primary(A),
    /// The receiver failed and the alternative succeeded.
    Fallback(B),
}

impl<A, B> OrElse<A, B> {
    /// Returns `true` if the receiver produced the value.
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary(_))
    }

    /// Returns `true` if the alternative produced the value.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl<A> OrElse<A, A> {
    /// The value, whichever side produced it.
    pub fn into_inner(self) -> A {
        match self {
            Self::Primary(value) | Self::Fallback(value) => value,
        }
    }
}

impl<D: 'static, A: 'static> Step<D, A> {
    /// Run both steps in order and pair their results.
    pub fn zip<B: 'static>(self, other: Step<D, B>) -> Step<D, (A, B)> {
        Step::new(move |driver| {
            let a = self.run(driver)?;
            let b = other.run(driver)?;
            Ok((a, b))
        })
    }

    /// Run three steps in order and collect their results.
    pub fn zip3<B: 'static, C: 'static>(self, b: Step<D, B>, c: Step<D, C>) -> Step<D, (A, B, C)> {
        self.zip(b).zip(c).map(|((a, b), c)| (a, b, c))
    }

    /// Run four steps in order and collect their results.
    pub fn zip4<B: 'static, C: 'static, E: 'static>(
        self,
        b: Step<D, B>,
        c: Step<D, C>,
        e: Step<D, E>,
    ) -> Step<D, (A, B, C, E)> {
        self.zip(b).zip(c).zip(e).map(|(((a, b), c), e)| (a, b, c, e))
    }

    /// Fall back to `other` when this step fails.
    ///
    /// The receiver's failure is dropped. If `other` fails too, its failure
    /// is the one reported. `other` is not evaluated when the receiver
    /// succeeds.
    pub fn or_else(self, other: Step<D, A>) -> Step<D, A> {
        self.or_either(other).map(OrElse::into_inner)
    }

    /// Like [`Step::or_else`], for alternatives of a different type; the
    /// result records which side produced it.
    pub fn or_either<B: 'static>(self, other: Step<D, B>) -> Step<D, OrElse<A, B>> {
        Step::new(move |driver| match self.run(driver) {
            Ok(value) => Ok(OrElse::Primary(value)),
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    location = %_error.location(),
                    error = %_error,
                    "or_else.fallback"
                );
                other.run(driver).map(OrElse::Fallback)
            }
        })
    }
}
