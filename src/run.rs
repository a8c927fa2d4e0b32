//! Running steps and handing failures to a test framework.
//!
//! [`run`] evaluates a step and turns a [`StepError`] into a [`Failure`]: the
//! rendered diagnostic plus the file and line it is attributed to. [`Run`]
//! adds an identity and wall-clock timing, producing a serializable
//! [`RunReport`], and can forward failures to a [`FailureSink`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StepError;
use crate::step::Step;

/// Get the current Unix timestamp in milliseconds.
pub fn now_millis() -> u64 {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Unique identifier for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A failed step, ready for a test framework's failure reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Rendered multi-line diagnostic.
    pub message: String,
    /// Source file of the call that built the failing step.
    pub file: String,
    /// Line of that call.
    pub line: u32,
    /// Column of that call.
    pub column: u32,
    /// The typed cause.
    pub error: StepError,
}

impl From<StepError> for Failure {
    fn from(error: StepError) -> Self {
        let location = error.location();
        Self {
            message: error.to_string(),
            file: location.file.to_string(),
            line: location.line,
            column: location.column,
            error,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.message)
    }
}

impl std::error::Error for Failure {}

/// Evaluate `step` against `driver`.
pub fn run<D: 'static, R: 'static>(step: &Step<D, R>, driver: &D) -> Result<R, Failure> {
    step.run(driver).map_err(Failure::from)
}

/// Receives failures on behalf of a host test framework.
pub trait FailureSink {
    /// Record a failure attributed to `failure.file:failure.line`.
    fn record_failure(&self, failure: &Failure);
}

/// A sink that panics, which is how `cargo test` learns a test failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicSink;

impl FailureSink for PanicSink {
    fn record_failure(&self, failure: &Failure) {
        panic!("{failure}");
    }
}

/// Final state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every step succeeded.
    Passed,
    /// A step failed.
    Failed,
}

/// What happened during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identity.
    pub id: RunId,
    /// Name given to the run.
    pub name: String,
    /// When the run started (Unix timestamp ms).
    pub started_at: u64,
    /// When the run finished (Unix timestamp ms).
    pub finished_at: u64,
    /// Final state.
    pub outcome: RunOutcome,
    /// The failure, if the run failed.
    pub failure: Option<Failure>,
}

impl RunReport {
    /// Returns `true` if every step succeeded.
    pub fn is_passed(&self) -> bool {
        self.outcome == RunOutcome::Passed
    }

    /// Wall-clock duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.finished_at.saturating_sub(self.started_at)
    }
}

/// A named scenario, ready to be run against a driver.
#[derive(Debug)]
pub struct Run<D> {
    id: RunId,
    name: String,
    step: Step<D, ()>,
}

impl<D: 'static> Run<D> {
    /// Wrap a scenario under a name.
    pub fn new(name: impl Into<String>, step: Step<D, ()>) -> Self {
        Self {
            id: RunId::new(),
            name: name.into(),
            step,
        }
    }

    /// Run identity.
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Run name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the scenario once and report what happened.
    pub fn start(&self, driver: &D) -> RunReport {
        let started_at = now_millis();

        #[cfg(feature = "tracing")]
        tracing::info!(run = %self.id, name = %self.name, "run.start");

        let failure = run(&self.step, driver).err();
        let outcome = if failure.is_some() {
            RunOutcome::Failed
        } else {
            RunOutcome::Passed
        };

        #[cfg(feature = "tracing")]
        match &failure {
            Some(failure) => tracing::error!(
                run = %self.id,
                file = %failure.file,
                line = failure.line,
                "run.failed"
            ),
            None => tracing::info!(run = %self.id, "run.passed"),
        }

        RunReport {
            id: self.id,
            name: self.name.clone(),
            started_at,
            finished_at: now_millis(),
            outcome,
            failure,
        }
    }

    /// Run the scenario and forward any failure to `sink`.
    ///
    /// Returns whether the scenario passed.
    pub fn start_reporting(&self, driver: &D, sink: &dyn FailureSink) -> bool {
        let report = self.start(driver);
        if let Some(failure) = &report.failure {
            sink.record_failure(failure);
        }
        report.is_passed()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::SourceLocation;
    use crate::query::QueryKind;
    use crate::driver::ElementCategory;

    #[derive(Default)]
    struct Collecting(RefCell<Vec<Failure>>);

    impl FailureSink for Collecting {
        fn record_failure(&self, failure: &Failure) {
            self.0.borrow_mut().push(failure.clone());
        }
    }

    #[test]
    fn now_millis_is_after_2020() {
        let millis = now_millis();
        assert!(millis > 1_577_836_800_000);
        assert!(millis < u64::MAX);
    }

    #[test]
    fn run_id_display() {
        let id = RunId::new();
        assert!(!id.to_string().is_empty());
        assert_ne!(id, RunId::new());
    }

    #[test]
    fn failure_carries_location_and_message() {
        let error = StepError::NoElementsMatchingQuery {
            query: QueryKind::All(ElementCategory::Switch),
            location: SourceLocation::caller(),
        };
        let failure = Failure::from(error.clone());
        assert!(failure.file.ends_with("run.rs"));
        assert_eq!(failure.line, error.location().line);
        assert_eq!(failure.message, error.to_string());
        assert!(failure.to_string().starts_with(&format!("{}:{}: ", failure.file, failure.line)));
    }

    #[test]
    fn passing_run_reports_nothing() {
        let sink = Collecting::default();
        let run = Run::new("noop", Step::<(), ()>::always(()));
        assert!(run.start_reporting(&(), &sink));
        assert!(sink.0.borrow().is_empty());
    }

    #[test]
    fn failing_run_reports_once() {
        let sink = Collecting::default();
        let run = Run::new("broken", Step::<(), ()>::fail(StepError::assertion("broken")));
        assert!(!run.start_reporting(&(), &sink));
        let failures = sink.0.borrow();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, "Assertion failed: broken");
    }

    #[test]
    fn report_serializes() {
        let run = Run::new("broken", Step::<(), ()>::fail(StepError::assertion("broken")));
        let report = run.start(&());
        assert_eq!(report.outcome, RunOutcome::Failed);
        assert!(report.finished_at >= report.started_at);

        let json = serde_json::to_string(&report).expect("serialize should succeed");
        let restored: RunReport = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(restored.id, run.id());
        assert_eq!(restored.failure, report.failure);
    }

    #[test]
    #[should_panic(expected = "Assertion failed: broken")]
    fn panic_sink_panics_with_message() {
        let run = Run::new("broken", Step::<(), ()>::fail(StepError::assertion("broken")));
        run.start_reporting(&(), &PanicSink);
    }
}
