//! The deferred, failable unit of work.
//!
//! A [`Step`] is a computation from a driver handle to a result. Building a
//! step never touches a driver; the handle is supplied when the step is
//! evaluated with [`Step::run`], and it is threaded through every nested step
//! from there. This keeps reusable helpers (page objects, shared flows)
//! definable without a running application.
//!
//! Composition short-circuits: once a sub-step fails, nothing after it in the
//! same composition runs.

use std::fmt;

use crate::error::StepError;

/// Result of evaluating a step.
pub type StepResult<R> = Result<R, StepError>;

/// A deferred computation from a driver `D` to a result `R`.
///
/// Steps are immutable once built. Combinators take their operands by value,
/// so a composed step owns its sub-steps. A step can be evaluated any number
/// of times; each evaluation starts from scratch against the driver it is
/// given.
pub struct Step<D, R> {
    eval: Box<dyn Fn(&D) -> StepResult<R>>,
}

impl<D, R> fmt::Debug for Step<D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("result", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

impl<D: 'static, R: 'static> Step<D, R> {
    /// Wrap a function of the driver as a step.
    pub fn new(eval: impl Fn(&D) -> StepResult<R> + 'static) -> Self {
        Self {
            eval: Box::new(eval),
        }
    }

    /// Evaluate the step against a driver.
    pub fn run(&self, driver: &D) -> StepResult<R> {
        (self.eval)(driver)
    }

    /// A step that always succeeds with `value` and never touches the driver.
    pub fn always(value: R) -> Self
    where
        R: Clone,
    {
        Self::new(move |_| Ok(value.clone()))
    }

    /// A step that always fails with `error` and never touches the driver.
    pub fn fail(error: StepError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    /// Transform a successful result. A failure passes through untouched and
    /// `f` is not called.
    pub fn map<B: 'static>(self, f: impl Fn(R) -> B + 'static) -> Step<D, B> {
        Step::new(move |driver| self.run(driver).map(&f))
    }

    /// Sequence another step that depends on this one's result.
    ///
    /// `f` is called exactly once per evaluation when this step succeeds,
    /// and never when it fails. The step it returns runs against the same
    /// driver.
    #[doc(alias = "flat_map")]
    pub fn and_then<B: 'static>(self, f: impl Fn(R) -> Step<D, B> + 'static) -> Step<D, B> {
        Step::new(move |driver| {
            let value = self.run(driver)?;
            f(value).run(driver)
        })
    }

    /// Feed a successful result, together with the driver, to a fallible
    /// function. This is how driver-backed operations are layered onto a step.
    pub fn with_driver<B: 'static>(
        self,
        f: impl Fn(&D, R) -> StepResult<B> + 'static,
    ) -> Step<D, B> {
        Step::new(move |driver| {
            let value = self.run(driver)?;
            f(driver, value)
        })
    }

    /// Run another step after this one, discarding this step's result.
    pub fn then<B: 'static>(self, next: Step<D, B>) -> Step<D, B> {
        Step::new(move |driver| {
            self.run(driver)?;
            next.run(driver)
        })
    }

    /// Observe a successful result without changing it.
    ///
    /// The observer is not called when the step fails.
    #[doc(alias = "do")]
    pub fn inspect(self, observer: impl Fn(&R) + 'static) -> Self {
        Self::new(move |driver| {
            let value = self.run(driver)?;
            observer(&value);
            Ok(value)
        })
    }

    /// Turn a failure into `None` instead of propagating it.
    pub fn optional(self) -> Step<D, Option<R>> {
        Step::new(move |driver| Ok(self.run(driver).ok()))
    }

    /// Discard a successful result, keeping failures.
    #[doc(alias = "to_void")]
    pub fn discard(self) -> Step<D, ()> {
        self.map(|_| ())
    }
}

impl<D: 'static> Step<D, bool> {
    /// Fail with [`StepError::AssertionFailed`] unless the result is `true`.
    ///
    /// The failure is attributed to the caller of `assert`.
    #[track_caller]
    pub fn assert(self, message: impl Into<String>) -> Step<D, ()> {
        let failure = StepError::assertion(message);
        Step::new(move |driver| {
            if self.run(driver)? {
                Ok(())
            } else {
                Err(failure.clone())
            }
        })
    }
}

impl<D: 'static, R: PartialEq + fmt::Debug + 'static> Step<D, R> {
    /// Fail with [`StepError::AssertionFailed`] unless the result equals
    /// `expected`.
    #[track_caller]
    pub fn assert_eq(self, expected: R) -> Step<D, ()> {
        let location = crate::error::SourceLocation::caller();
        Step::new(move |driver| {
            let actual = self.run(driver)?;
            if actual == expected {
                Ok(())
            } else {
                Err(StepError::AssertionFailed {
                    message: format!("expected {expected:?}, got {actual:?}"),
                    location: location.clone(),
                })
            }
        })
    }
}
